//! # sheetsift-xls
//!
//! XLS (BIFF8) reader for sheetsift.
//!
//! This crate handles the legacy Excel binary format (.xls). It reads the
//! cell values and merge ranges of one worksheet into a
//! [`RawSheet`](sheetsift_core::RawSheet); formatting, charts and macro
//! sheets are skipped.

pub mod biff;
pub mod error;
pub mod reader;

pub use error::{XlsError, XlsResult};
pub use reader::XlsReader;
