//! Error types for the load, render and export steps

use sheetsift_pdf::PdfError;
use sheetsift_xls::XlsError;
use sheetsift_xlsx::XlsxError;
use thiserror::Error;

/// Result type alias using the umbrella [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Why a sheet could not be loaded into a table
#[derive(Debug, Error)]
pub enum LoadError {
    /// The content is neither an XLSX (ZIP) nor an XLS (CFB) file
    #[error("unsupported file format: expected an XLSX or XLS workbook")]
    UnsupportedFormat,

    /// No worksheet matches the selector
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    /// The header row lies past the last row of the sheet
    #[error("header row {header_row} is out of range (sheet has {row_count} rows)")]
    HeaderRowOutOfRange { header_row: usize, row_count: usize },

    /// Malformed XLSX content
    #[error("XLSX error: {0}")]
    Xlsx(XlsxError),

    /// Malformed XLS content
    #[error("XLS error: {0}")]
    Xls(XlsError),

    /// Building the table from the sheet failed
    #[error("table error: {0}")]
    Core(sheetsift_core::Error),

    /// The source file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<XlsxError> for LoadError {
    fn from(err: XlsxError) -> Self {
        match err {
            XlsxError::SheetNotFound(sheet) => LoadError::SheetNotFound(sheet),
            other => LoadError::Xlsx(other),
        }
    }
}

impl From<XlsError> for LoadError {
    fn from(err: XlsError) -> Self {
        match err {
            XlsError::SheetNotFound(sheet) => LoadError::SheetNotFound(sheet),
            other => LoadError::Xls(other),
        }
    }
}

impl From<sheetsift_core::Error> for LoadError {
    fn from(err: sheetsift_core::Error) -> Self {
        match err {
            sheetsift_core::Error::HeaderRowOutOfRange {
                header_row,
                row_count,
            } => LoadError::HeaderRowOutOfRange {
                header_row,
                row_count,
            },
            other => LoadError::Core(other),
        }
    }
}

/// Why a table could not be rendered
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing the XLSX workbook failed
    #[error("spreadsheet rendering failed: {0}")]
    Spreadsheet(#[from] XlsxError),

    /// Laying out the PDF report failed
    #[error("document rendering failed: {0}")]
    Document(#[from] PdfError),
}

/// Why an export artifact could not be produced
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export: the table has no rows or no columns
    #[error("nothing to export: the table is empty")]
    EmptyTable,

    /// Rendering failed
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Any failure along the load, filter, render and export pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Filtering or projecting named a column the table lacks
    #[error(transparent)]
    Table(#[from] sheetsift_core::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_not_found_is_lifted() {
        let err = LoadError::from(XlsxError::SheetNotFound("'Q3'".into()));
        assert!(matches!(err, LoadError::SheetNotFound(ref s) if s == "'Q3'"));

        let err = LoadError::from(XlsError::SheetNotFound("#4".into()));
        assert!(matches!(err, LoadError::SheetNotFound(ref s) if s == "#4"));
    }

    #[test]
    fn test_header_row_is_lifted() {
        let err = LoadError::from(sheetsift_core::Error::HeaderRowOutOfRange {
            header_row: 5,
            row_count: 2,
        });
        assert!(matches!(
            err,
            LoadError::HeaderRowOutOfRange {
                header_row: 5,
                row_count: 2
            }
        ));
    }

    #[test]
    fn test_other_parser_errors_are_wrapped() {
        let err = LoadError::from(XlsError::UnsupportedVersion("BIFF5".into()));
        assert!(matches!(err, LoadError::Xls(XlsError::UnsupportedVersion(_))));
        assert_eq!(err.to_string(), "XLS error: Unsupported XLS version: BIFF5");
    }
}
