//! Error types for sheetsift-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sheetsift-core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u32),

    /// A filter or projection named a column the table does not have
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A projection named the same column twice
    #[error("Column requested more than once: {0}")]
    DuplicateColumn(String),

    /// A row does not have one cell per column
    #[error("Row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// The header row index lies past the end of the sheet
    #[error("Header row {header_row} is out of range (sheet has {row_count} rows)")]
    HeaderRowOutOfRange { header_row: usize, row_count: usize },
}

impl Error {
    /// Create an unknown-column error
    pub fn unknown_column<S: Into<String>>(name: S) -> Self {
        Error::UnknownColumn(name.into())
    }
}
