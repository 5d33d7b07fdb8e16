//! # sheetsift-xlsx
//!
//! Reads one worksheet of an XLSX file into a [`RawSheet`](sheetsift_core::RawSheet)
//! (cell values plus merge ranges) and writes a [`Table`](sheetsift_core::Table)
//! back out as a single-sheet workbook.

pub mod error;
pub mod reader;
pub mod writer;

mod escape;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
