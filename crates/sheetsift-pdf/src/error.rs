//! PDF error types

use thiserror::Error;

/// Result type for PDF operations
pub type PdfResult<T> = std::result::Result<T, PdfError>;

/// Reasons a table cannot be rendered as a report
#[derive(Debug, Error)]
pub enum PdfError {
    /// A report needs at least one column to size the page
    #[error("table has no columns")]
    EmptyTable,

    /// A row does not fit on a page even when it starts one
    #[error("row {row} needs {height:.1}pt but a page holds {available:.1}pt")]
    RowTooTall {
        /// The row that overflowed
        row: RowIndex,
        /// Height the row needs
        height: f64,
        /// Usable height of a page
        available: f64,
    },

    /// Building or serializing the PDF document failed
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Which row failed to fit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIndex {
    /// The column header row
    Header,
    /// A data row (0-based)
    Data(usize),
}

impl std::fmt::Display for RowIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowIndex::Header => write!(f, "header"),
            RowIndex::Data(i) => write!(f, "{}", i),
        }
    }
}
