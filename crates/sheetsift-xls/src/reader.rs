//! XLS (BIFF8) reader.
//!
//! Opens a Compound File Binary (CFB/OLE2) container, reads the `Workbook`
//! stream, parses BIFF8 records, and fills a [`RawSheet`] with one
//! worksheet's values and merge ranges.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use sheetsift_core::{CellRange, CellValue, RawSheet, SheetSelector};

use crate::biff::parser::{read_bytes8, read_f64, read_rk, read_u16, read_u32, read_u8};
use crate::biff::records;
use crate::biff::strings::{parse_sst, read_short_string, read_unicode_string};
use crate::biff::{self, BiffRecord};
use crate::error::{XlsError, XlsResult};

/// XLS file reader.
pub struct XlsReader;

/// Metadata for a sheet parsed from the BOUNDSHEET record.
#[derive(Debug)]
struct SheetInfo {
    /// Absolute byte offset of the sheet's BOF in the Workbook stream.
    offset: u32,
    /// Sheet type: 0 = worksheet, 2 = chart, 6 = macro/VBA.
    sheet_type: u8,
    /// Sheet name.
    name: String,
}

/// What the workbook globals substream tells us
struct Globals {
    sst: Vec<String>,
    sheets: Vec<SheetInfo>,
    /// Index of the globals EOF record
    end: usize,
}

impl XlsReader {
    /// List worksheet names in workbook order (chart and macro sheets excluded).
    pub fn sheet_names<R: Read + Seek>(reader: R) -> XlsResult<Vec<String>> {
        let all_records = Self::read_workbook_stream(reader)?;
        let globals = Self::parse_globals(&all_records)?;
        Ok(globals
            .sheets
            .into_iter()
            .filter(|s| s.sheet_type == records::SHEET_TYPE_WORKSHEET)
            .map(|s| s.name)
            .collect())
    }

    /// Read one worksheet from a filesystem path.
    pub fn read_sheet_file<P: AsRef<Path>>(
        path: P,
        selector: &SheetSelector,
    ) -> XlsResult<RawSheet> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read_sheet(file, selector)
    }

    /// Read one worksheet from any `Read + Seek` source.
    pub fn read_sheet<R: Read + Seek>(reader: R, selector: &SheetSelector) -> XlsResult<RawSheet> {
        let all_records = Self::read_workbook_stream(reader)?;
        let globals = Self::parse_globals(&all_records)?;

        // Positions in BIFF order of the worksheets, charts and macros skipped
        let worksheets: Vec<usize> = globals
            .sheets
            .iter()
            .enumerate()
            .filter(|(_, s)| s.sheet_type == records::SHEET_TYPE_WORKSHEET)
            .map(|(i, _)| i)
            .collect();
        let names: Vec<&str> = worksheets
            .iter()
            .map(|&i| globals.sheets[i].name.as_str())
            .collect();
        let biff_idx = selector
            .resolve(&names)
            .map(|i| worksheets[i])
            .ok_or_else(|| XlsError::SheetNotFound(selector.to_string()))?;
        let info = &globals.sheets[biff_idx];

        let substream = Self::sheet_substream(&all_records, &globals, biff_idx)?;

        let mut sheet = RawSheet::new(info.name.as_str());
        Self::parse_sheet_records(&substream, &mut sheet, &globals.sst)?;

        log::debug!(
            "xls: read sheet '{}' ({} rows, {} merges)",
            sheet.name(),
            sheet.row_count(),
            sheet.merges().len()
        );
        Ok(sheet)
    }

    /// Open the CFB container and split its workbook stream into records.
    fn read_workbook_stream<R: Read + Seek>(reader: R) -> XlsResult<Vec<BiffRecord>> {
        let mut cfb = cfb::CompoundFile::open(reader)?;

        // "Book" is the BIFF5 name; its BOF will fail the version check
        let stream_path = if cfb.exists("/Workbook") {
            "/Workbook"
        } else if cfb.exists("/Book") {
            "/Book"
        } else {
            return Err(XlsError::InvalidFormat(
                "no Workbook or Book stream found in CFB".into(),
            ));
        };

        let mut stream_data = Vec::new();
        {
            let mut stream = cfb.open_stream(stream_path)?;
            stream.read_to_end(&mut stream_data)?;
        }

        let mut cursor = Cursor::new(&stream_data);
        biff::read_all_records(&mut cursor)
    }

    /// Parse the workbook globals: shared strings and the sheet list.
    fn parse_globals(all_records: &[BiffRecord]) -> XlsResult<Globals> {
        let mut sst: Vec<String> = Vec::new();
        let mut sheets: Vec<SheetInfo> = Vec::new();
        let mut in_globals = false;

        for (idx, rec) in all_records.iter().enumerate() {
            match rec.record_type {
                records::BOF if !in_globals => {
                    let (version, dt) = biff::parse_bof(&rec.data)?;
                    if dt != records::BOF_WORKBOOK_GLOBALS {
                        return Err(XlsError::InvalidFormat(format!(
                            "stream starts with substream type 0x{dt:04X}, not workbook globals"
                        )));
                    }
                    if version != records::BIFF8_VERSION {
                        return Err(XlsError::UnsupportedVersion(format!(
                            "expected BIFF8 (0x0600), got 0x{version:04X}"
                        )));
                    }
                    in_globals = true;
                }
                records::EOF if in_globals => {
                    return Ok(Globals {
                        sst,
                        sheets,
                        end: idx,
                    });
                }
                records::SST if in_globals => {
                    sst = parse_sst(&rec.data, &rec.continues)?;
                }
                records::BOUNDSHEET if in_globals => {
                    sheets.push(Self::parse_boundsheet(&rec.data)?);
                }
                _ => {}
            }
        }

        Err(XlsError::InvalidFormat(if in_globals {
            "workbook globals have no EOF record".into()
        } else {
            "no workbook globals BOF found".into()
        }))
    }

    /// Parse a BOUNDSHEET record body.
    fn parse_boundsheet(data: &[u8]) -> XlsResult<SheetInfo> {
        let mut offset = 0;
        let abs_offset = read_u32(data, &mut offset)?;
        let _visibility = read_u8(data, &mut offset)?;
        let sheet_type = read_u8(data, &mut offset)?;
        let name = read_short_string(data, &mut offset)?;

        Ok(SheetInfo {
            offset: abs_offset,
            sheet_type,
            name,
        })
    }

    /// Records of one sheet's BOF..EOF substream, BOF and EOF excluded.
    ///
    /// Located by the BOUNDSHEET stream offset; when that does not land on
    /// a BOF the substreams are matched to sheets by order instead.
    fn sheet_substream<'a>(
        all_records: &'a [BiffRecord],
        globals: &Globals,
        biff_idx: usize,
    ) -> XlsResult<Vec<&'a BiffRecord>> {
        let info = &globals.sheets[biff_idx];
        let start = all_records.iter().position(|r| {
            r.record_type == records::BOF && r.stream_offset == u64::from(info.offset)
        });

        let groups = match start {
            Some(start) => Self::split_sheet_records(&all_records[start..]),
            None => {
                log::warn!(
                    "xls: sheet '{}' offset {} does not point at a BOF; matching by order",
                    info.name,
                    info.offset
                );
                Self::split_sheet_records(&all_records[globals.end + 1..])
                    .into_iter()
                    .skip(biff_idx)
                    .collect()
            }
        };

        groups.into_iter().next().ok_or_else(|| {
            XlsError::InvalidFormat(format!("no substream for sheet '{}'", info.name))
        })
    }

    /// Split records into per-sheet groups (each BOF..EOF pair is one sheet).
    fn split_sheet_records(records: &[BiffRecord]) -> Vec<Vec<&BiffRecord>> {
        let mut groups: Vec<Vec<&BiffRecord>> = Vec::new();
        let mut current: Option<Vec<&BiffRecord>> = None;
        let mut depth = 0usize;

        for rec in records {
            match rec.record_type {
                records::BOF => {
                    if depth == 0 {
                        current = Some(Vec::new());
                    }
                    depth += 1;
                }
                records::EOF if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(group) = current.take() {
                            groups.push(group);
                        }
                    }
                }
                // Embedded substreams (charts on a worksheet) hold no cells of ours
                _ if depth == 1 => {
                    if let Some(ref mut group) = current {
                        group.push(rec);
                    }
                }
                _ => {}
            }
        }

        groups
    }

    /// Parse cell records from a sheet's record group.
    fn parse_sheet_records(
        records: &[&BiffRecord],
        sheet: &mut RawSheet,
        sst: &[String],
    ) -> XlsResult<()> {
        // A STRING record carries the text result of the FORMULA before it
        let mut pending_formula_cell: Option<(u32, u16)> = None;

        for rec in records {
            let data = rec.data.as_slice();
            match rec.record_type {
                records::LABELSST => {
                    let mut off = 0;
                    let (row, col) = Self::read_cell_header(data, &mut off)?;
                    let sst_idx = read_u32(data, &mut off)? as usize;
                    let text = sst.get(sst_idx).ok_or_else(|| {
                        XlsError::Parse(format!("SST index {} out of bounds", sst_idx))
                    })?;
                    sheet.set_value(row, col, CellValue::string(text));
                    pending_formula_cell = None;
                }
                records::LABEL | records::RSTRING => {
                    let mut off = 0;
                    let (row, col) = Self::read_cell_header(data, &mut off)?;
                    let text = read_unicode_string(data, &mut off)?;
                    sheet.set_value(row, col, CellValue::from(text));
                    pending_formula_cell = None;
                }
                records::NUMBER => {
                    let mut off = 0;
                    let (row, col) = Self::read_cell_header(data, &mut off)?;
                    sheet.set_value(row, col, CellValue::Number(read_f64(data, &mut off)?));
                    pending_formula_cell = None;
                }
                records::RK => {
                    let mut off = 0;
                    let (row, col) = Self::read_cell_header(data, &mut off)?;
                    sheet.set_value(row, col, CellValue::Number(read_rk(data, &mut off)?));
                    pending_formula_cell = None;
                }
                records::MULRK => {
                    Self::parse_mulrk(data, sheet)?;
                    pending_formula_cell = None;
                }
                records::BOOLERR => {
                    Self::parse_boolerr(data, sheet)?;
                    pending_formula_cell = None;
                }
                records::FORMULA => {
                    pending_formula_cell = Self::parse_formula(data, sheet)?;
                }
                records::STRING => {
                    if let Some((row, col)) = pending_formula_cell.take() {
                        let mut off = 0;
                        let text = read_unicode_string(data, &mut off)?;
                        sheet.set_value(row, col, CellValue::from(text));
                    }
                }
                records::MERGECELLS => {
                    Self::parse_mergecells(data, sheet)?;
                }
                _ => {
                    // Formatting, blanks, and sheet layout records carry no values
                }
            }
        }

        Ok(())
    }

    // ── Cell record parsers ──────────────────────────────────────────────

    /// Common cell prefix: row(2) + col(2) + xf(2)
    fn read_cell_header(data: &[u8], off: &mut usize) -> XlsResult<(u32, u16)> {
        let row = u32::from(read_u16(data, off)?);
        let col = read_u16(data, off)?;
        let _xf = read_u16(data, off)?;
        Ok((row, col))
    }

    /// MULRK: row(2) + first_col(2) + [xf(2) + rk(4)]* + last_col(2)
    fn parse_mulrk(data: &[u8], sheet: &mut RawSheet) -> XlsResult<()> {
        if data.len() < 6 {
            return Err(XlsError::Parse("MULRK record too short".into()));
        }
        let mut off = 0;
        let row = u32::from(read_u16(data, &mut off)?);
        let first_col = read_u16(data, &mut off)?;

        let last_col = u16::from_le_bytes([data[data.len() - 2], data[data.len() - 1]]);
        let rk_data_end = data.len() - 2;

        let mut col = first_col;
        while off + 6 <= rk_data_end && col <= last_col {
            let _xf = read_u16(data, &mut off)?;
            let value = read_rk(data, &mut off)?;
            sheet.set_value(row, col, CellValue::Number(value));
            col = col.saturating_add(1);
        }
        Ok(())
    }

    /// BOOLERR: row(2) + col(2) + xf(2) + value(1) + is_error(1)
    fn parse_boolerr(data: &[u8], sheet: &mut RawSheet) -> XlsResult<()> {
        let mut off = 0;
        let (row, col) = Self::read_cell_header(data, &mut off)?;
        let val = read_u8(data, &mut off)?;
        let is_error = read_u8(data, &mut off)?;

        let value = if is_error != 0 {
            error_value(val)
        } else {
            CellValue::Bool(val != 0)
        };
        sheet.set_value(row, col, value);
        Ok(())
    }

    /// FORMULA: row(2) + col(2) + xf(2) + result(8) + options(2) + reserved(4) + formula_data(...)
    ///
    /// Only the cached result is kept. Returns the cell position when the
    /// result is a string, which arrives in the STRING record that follows.
    fn parse_formula(data: &[u8], sheet: &mut RawSheet) -> XlsResult<Option<(u32, u16)>> {
        let mut off = 0;
        let (row, col) = Self::read_cell_header(data, &mut off)?;
        let result = read_bytes8(data, &mut off)?;

        // Bytes 6-7 == 0xFFFF mark a non-numeric result
        if result[6] != 0xFF || result[7] != 0xFF {
            sheet.set_value(row, col, CellValue::Number(f64::from_le_bytes(result)));
            return Ok(None);
        }

        match result[0] {
            0x00 => return Ok(Some((row, col))),
            0x01 => sheet.set_value(row, col, CellValue::Bool(result[2] != 0)),
            0x02 => sheet.set_value(row, col, error_value(result[2])),
            0x03 => sheet.set_value(row, col, CellValue::string("")),
            other => log::warn!(
                "xls: unknown formula result type 0x{other:02X} at row {} col {}",
                row,
                col
            ),
        }
        Ok(None)
    }

    // ── Structural record parsers ────────────────────────────────────────

    /// MERGECELLS: count(2) + [first_row(2) + last_row(2) + first_col(2) + last_col(2)]*
    fn parse_mergecells(data: &[u8], sheet: &mut RawSheet) -> XlsResult<()> {
        let mut off = 0;
        let count = read_u16(data, &mut off)? as usize;

        for _ in 0..count {
            if off + 8 > data.len() {
                log::warn!("xls: MERGECELLS record shorter than its count of {}", count);
                break;
            }
            let first_row = u32::from(read_u16(data, &mut off)?);
            let last_row = u32::from(read_u16(data, &mut off)?);
            let first_col = read_u16(data, &mut off)?;
            let last_col = read_u16(data, &mut off)?;

            sheet.add_merge(CellRange::from_indices(first_row, first_col, last_row, last_col));
        }

        Ok(())
    }
}

/// `#N/A` loads as a missing value, other errors as their text
fn error_value(code: u8) -> CellValue {
    if code == records::ERROR_NOT_AVAILABLE {
        CellValue::Empty
    } else {
        CellValue::string(records::error_text(code))
    }
}
