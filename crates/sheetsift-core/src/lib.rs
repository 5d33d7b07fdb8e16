//! # sheetsift-core
//!
//! Core data structures for the sheetsift pipeline.
//!
//! - [`CellValue`], [`CellAddress`] and [`CellRange`] - cell values and positions
//! - [`RawSheet`] - a worksheet grid as read from disk, with its merge ranges
//! - [`Table`] - named columns over equal-width rows, built from a raw sheet
//! - [`FilterSpec`], [`apply_filters`] and [`project`] - derived table views
//!
//! ## Example
//!
//! ```rust
//! use sheetsift_core::{apply_filters, project, CellValue, FilterSpec, RawSheet, Table};
//!
//! let raw = RawSheet::from_rows(
//!     "Sheet1",
//!     vec![
//!         vec![CellValue::from("region"), CellValue::from("sales")],
//!         vec![CellValue::from("north"), CellValue::from(10)],
//!         vec![CellValue::from("south"), CellValue::from(7)],
//!     ],
//! );
//! let table = Table::from_raw(&raw, 0, true).unwrap();
//!
//! let north = apply_filters(&table, &FilterSpec::new().allow("region", ["north"])).unwrap();
//! let sales = project(&north, &["sales"]).unwrap();
//! assert_eq!(sales.value(0, 0), Some(&CellValue::Number(10.0)));
//! ```

pub mod cell;
pub mod error;
pub mod filter;
pub mod projection;
pub mod raw;
pub mod sheet;
pub mod table;

pub use cell::{CellAddress, CellRange, CellValue, SharedString};
pub use error::{Error, Result};
pub use filter::{apply_filters, FilterSpec};
pub use projection::project;
pub use raw::RawSheet;
pub use sheet::SheetSelector;
pub use table::{Row, Table};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
