//! # sheetsift-pdf
//!
//! Renders a [`Table`](sheetsift_core::Table) as a paginated PDF report:
//! a centered title, then the table with a bold header row, wrapped cell
//! text and a grid. The page widens with the column count so columns keep
//! a readable width; rows that do not fit continue on the next page.
//!
//! Pages are assembled as a [`lopdf`] document using the built-in
//! Helvetica fonts, so nothing is embedded and text is limited to the
//! WinAnsi character set.
//!
//! ## Example
//!
//! ```rust
//! use sheetsift_core::{CellValue, Table};
//! use sheetsift_pdf::{PdfWriter, ReportLayout};
//!
//! let table = Table::new(
//!     vec!["city".into(), "visits".into()],
//!     vec![vec![CellValue::from("Lyon"), CellValue::from(12)]],
//! )
//! .unwrap();
//!
//! let pdf = PdfWriter::to_bytes(&table, &ReportLayout::default()).unwrap();
//! assert!(pdf.starts_with(b"%PDF-1.4"));
//! ```

pub mod error;
pub mod font;
pub mod layout;
pub mod wrap;
pub mod writer;

pub use error::{PdfError, PdfResult, RowIndex};
pub use font::Font;
pub use layout::{ReportLayout, Rgb, INCH};
pub use writer::PdfWriter;
