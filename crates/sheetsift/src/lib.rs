//! # sheetsift
//!
//! Load one sheet of an XLSX or XLS workbook into a table, narrow it down
//! with value filters and a column projection, then export the result as a
//! one-sheet XLSX workbook or a paginated PDF report.
//!
//! ## Features
//!
//! - XLSX and legacy XLS (BIFF8) input, detected from the file content
//! - Optional merged-cell normalization before the header row is applied
//! - Filters by allowed values per column, projection by column name
//! - XLSX and PDF export with default file names and MIME types
//! - [`LoadCache`] to reuse parsed tables across repeated runs
//!
//! ## Example
//!
//! ```rust
//! use sheetsift::prelude::*;
//!
//! let table = Table::new(
//!     vec!["region".into(), "rep".into(), "sales".into()],
//!     vec![
//!         vec![CellValue::from("north"), CellValue::from("ana"), CellValue::from(10)],
//!         vec![CellValue::from("south"), CellValue::from("bo"), CellValue::from(7)],
//!     ],
//! )
//! .unwrap();
//!
//! let bytes = render_spreadsheet(&table).unwrap();
//! let reloaded = load(&bytes, 0usize, 0, false).unwrap();
//!
//! let north = apply_filters(&reloaded, &FilterSpec::new().allow("region", ["north"])).unwrap();
//! let view = project(&north, &["rep", "sales"]).unwrap();
//! assert_eq!(view.row_count(), 1);
//!
//! let report = export_document(&view, Some("north")).unwrap();
//! assert_eq!(report.file_name, "north.pdf");
//! ```

pub mod cache;
pub mod error;
pub mod export;
pub mod loader;
pub mod prelude;
pub mod render;

pub use cache::LoadCache;
pub use error::{Error, ExportError, LoadError, RenderError, Result};
pub use export::{
    export_document, export_spreadsheet, ExportArtifact, DEFAULT_STEM, PDF_MIME, XLSX_MIME,
};
pub use loader::{list_sheets, load, load_with, Format, LoadOptions, Source};
pub use render::{
    render_document_with, render_paginated_document, render_spreadsheet, SPREADSHEET_SHEET_NAME,
};

// Re-export core types
pub use sheetsift_core::{
    apply_filters, project, CellAddress, CellRange, CellValue, FilterSpec, RawSheet, Row,
    SheetSelector, SharedString, Table, MAX_COLS, MAX_ROWS,
};

// Re-export format types
pub use sheetsift_pdf::{PdfError, PdfWriter, ReportLayout, Rgb};
pub use sheetsift_xls::{XlsError, XlsReader};
pub use sheetsift_xlsx::{XlsxError, XlsxReader, XlsxWriter};
