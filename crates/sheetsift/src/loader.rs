//! Loading one sheet of a workbook into a [`Table`]

use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use sheetsift_core::{RawSheet, SheetSelector, Table};
use sheetsift_xls::XlsReader;
use sheetsift_xlsx::XlsxReader;

use crate::error::LoadError;

/// ZIP local file header, the start of every XLSX file
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Compound File Binary header, the start of every XLS file
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Workbook container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Office Open XML workbook
    Xlsx,
    /// Legacy BIFF8 workbook
    Xls,
}

impl Format {
    /// Detect the format from the leading bytes of the content
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(ZIP_MAGIC) {
            Some(Format::Xlsx)
        } else if bytes.starts_with(CFB_MAGIC) {
            Some(Format::Xls)
        } else {
            None
        }
    }
}

/// Where the workbook comes from
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// Workbook content already in memory
    Bytes(&'a [u8]),
    /// A file on disk
    Path(&'a Path),
}

impl<'a> Source<'a> {
    /// The workbook content, reading the file if needed
    pub fn read(&self) -> Result<Cow<'a, [u8]>, LoadError> {
        match *self {
            Source::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            Source::Path(path) => Ok(Cow::Owned(std::fs::read(path)?)),
        }
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Source::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Source<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Source::Bytes(bytes)
    }
}

impl<'a> From<&'a Path> for Source<'a> {
    fn from(path: &'a Path) -> Self {
        Source::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for Source<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Source::Path(path)
    }
}

/// Options for [`load_with`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadOptions {
    /// Which worksheet to read
    pub sheet: SheetSelector,
    /// 0-based row holding the column names
    pub header_row: usize,
    /// Copy each merged range's anchor value into every cell it covers
    pub unmerge_cells: bool,
    /// Leave out data rows with no value at all
    pub skip_blank_rows: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sheet: SheetSelector::default(),
            header_row: 0,
            unmerge_cells: false,
            skip_blank_rows: true,
        }
    }
}

/// Load one sheet as a table
///
/// Row `header_row` supplies the column names and the rows after it the
/// data. With `unmerge_cells` merged ranges are filled with their anchor
/// value before the sheet is sliced.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
///
/// let table = sheetsift::load(Path::new("sales.xlsx"), "Q3", 0, true).unwrap();
/// println!("{} rows", table.row_count());
/// ```
pub fn load<'a, S>(
    source: impl Into<Source<'a>>,
    sheet: S,
    header_row: usize,
    unmerge_cells: bool,
) -> Result<Table, LoadError>
where
    S: Into<SheetSelector>,
{
    let options = LoadOptions {
        sheet: sheet.into(),
        header_row,
        unmerge_cells,
        ..LoadOptions::default()
    };
    load_with(source, &options)
}

/// Load one sheet as a table using explicit options
pub fn load_with<'a>(source: impl Into<Source<'a>>, options: &LoadOptions) -> Result<Table, LoadError> {
    let bytes = source.into().read()?;
    load_bytes(&bytes, options)
}

/// List the worksheet names of a workbook in order
pub fn list_sheets<'a>(source: impl Into<Source<'a>>) -> Result<Vec<String>, LoadError> {
    let bytes = source.into().read()?;
    match detect(&bytes)? {
        Format::Xlsx => Ok(XlsxReader::sheet_names(Cursor::new(&bytes[..]))?),
        Format::Xls => Ok(XlsReader::sheet_names(Cursor::new(&bytes[..]))?),
    }
}

pub(crate) fn load_bytes(bytes: &[u8], options: &LoadOptions) -> Result<Table, LoadError> {
    let format = detect(bytes)?;
    let mut raw = read_raw(bytes, format, &options.sheet)?;

    if options.unmerge_cells {
        raw.unmerge();
    }

    let table = Table::from_raw(&raw, options.header_row, options.skip_blank_rows)?;
    log::debug!(
        "loaded {:?} sheet {} as {} rows x {} columns",
        format,
        options.sheet,
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

fn detect(bytes: &[u8]) -> Result<Format, LoadError> {
    Format::detect(bytes).ok_or(LoadError::UnsupportedFormat)
}

fn read_raw(bytes: &[u8], format: Format, sheet: &SheetSelector) -> Result<RawSheet, LoadError> {
    let cursor = Cursor::new(bytes);
    match format {
        Format::Xlsx => Ok(XlsxReader::read_sheet(cursor, sheet)?),
        Format::Xls => Ok(XlsReader::read_sheet(cursor, sheet)?),
    }
}
