//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::decode_excel_escapes;
use sheetsift_core::{CellAddress, CellRange, CellValue, RawSheet, SheetSelector, SharedString};

/// Error literal that loads as a missing value rather than as text
const NOT_AVAILABLE: &str = "#N/A";

/// Relationship type of worksheet parts; chartsheets and dialog sheets differ
const WORKSHEET_REL: &str = "/worksheet";

/// A sheet entry from `xl/workbook.xml`
#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    r_id: String,
}

/// A workbook relationship from `xl/_rels/workbook.xml.rels`
#[derive(Debug, Clone)]
struct Relationship {
    rel_type: String,
    path: String,
}

/// A worksheet and the part holding its cells
#[derive(Debug, Clone)]
struct Worksheet {
    name: String,
    path: String,
}

/// XLSX file reader
///
/// Reads cell values and merge ranges only. Styles, comments, defined names
/// and drawings are skipped; a formula cell contributes its cached result.
pub struct XlsxReader;

impl XlsxReader {
    /// List worksheet names in workbook order
    pub fn sheet_names<R: Read + Seek>(reader: R) -> XlsxResult<Vec<String>> {
        let mut archive = Self::open_archive(reader)?;
        let sheets = Self::read_worksheets(&mut archive)?;
        Ok(sheets.into_iter().map(|s| s.name).collect())
    }

    /// Read one worksheet from a file path
    pub fn read_sheet_file<P: AsRef<Path>>(
        path: P,
        selector: &SheetSelector,
    ) -> XlsxResult<RawSheet> {
        let file = File::open(path)?;
        Self::read_sheet(BufReader::new(file), selector)
    }

    /// Read one worksheet from a reader
    pub fn read_sheet<R: Read + Seek>(
        reader: R,
        selector: &SheetSelector,
    ) -> XlsxResult<RawSheet> {
        let mut archive = Self::open_archive(reader)?;

        let sheets = Self::read_worksheets(&mut archive)?;
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        let index = selector
            .resolve(&names)
            .ok_or_else(|| XlsxError::SheetNotFound(selector.to_string()))?;
        let entry = &sheets[index];

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let sheet = Self::read_worksheet(&mut archive, &entry.path, &entry.name, &shared_strings)?;

        log::debug!(
            "xlsx: read sheet '{}' from {} ({} rows, {} merges)",
            sheet.name(),
            entry.path,
            sheet.row_count(),
            sheet.merges().len()
        );
        Ok(sheet)
    }

    fn open_archive<R: Read + Seek>(reader: R) -> XlsxResult<zip::ZipArchive<R>> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        Ok(archive)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<SharedString>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        // Whitespace inside <t> is significant
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                    strings.push(SharedString::new(""));
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(SharedString::new(decode_excel_escapes(&current)));
                        current.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Event::Text(e) if in_t => current.push_str(&e.unescape()?),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Worksheets in workbook order, with chartsheets and other sheet kinds left out
    fn read_worksheets<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<Worksheet>> {
        let entries = Self::read_workbook_xml(archive)?;
        let rels = Self::read_workbook_rels(archive)?;

        let mut sheets = Vec::with_capacity(entries.len());
        for entry in entries {
            let rel = rels.get(&entry.r_id).ok_or_else(|| {
                XlsxError::MissingPart(format!("sheet relationship {}", entry.r_id))
            })?;
            if !rel.rel_type.ends_with(WORKSHEET_REL) {
                log::debug!("xlsx: skipping '{}' ({})", entry.name, rel.rel_type);
                continue;
            }
            sheets.push(Worksheet {
                name: entry.name,
                path: rel.path.clone(),
            });
        }
        Ok(sheets)
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<SheetEntry>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"name" => name = Some(attr.unescape_value()?.into_owned()),
                            // r:id, whatever the relationships prefix is
                            b"id" if attr.key.prefix().is_some() => {
                                r_id = Some(attr.unescape_value()?.into_owned());
                            }
                            _ => {}
                        }
                    }

                    match (name, r_id) {
                        (Some(name), Some(r_id)) => sheets.push(SheetEntry { name, r_id }),
                        _ => log::warn!("xlsx: skipping <sheet> without name or r:id"),
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get part types and paths by relationship id
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, Relationship>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e)
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        let value = attr.unescape_value()?.into_owned();
                        match attr.key.as_ref() {
                            b"Id" => id = Some(value),
                            b"Target" => target = Some(value),
                            b"Type" => rel_type = Some(value),
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        let path = resolve_part_path(&target);
                        rels.insert(id, Relationship { rel_type, path });
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read cell values and merge ranges from a worksheet part
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        name: &str,
        shared_strings: &[SharedString],
    ) -> XlsxResult<RawSheet> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut sheet = RawSheet::new(name);
        let mut buf = Vec::new();

        // Position of the next cell when <row r> or <c r> is omitted
        let mut current_row: u32 = 0;
        let mut next_col: u16 = 0;
        let mut seen_row = false;

        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"row" => {
                        current_row = match attr_value(&e, b"r")? {
                            Some(r) => parse_row_number(&r)?,
                            None if seen_row => current_row + 1,
                            None => 0,
                        };
                        seen_row = true;
                        next_col = 0;
                        sheet.ensure_row(current_row);
                    }
                    b"c" => {
                        let pending = PendingCell::from_element(&e, current_row, next_col)?;
                        next_col = pending.address.col.saturating_add(1);
                        cell = Some(pending);
                    }
                    b"v" if cell.is_some() => in_value = true,
                    b"is" if cell.is_some() => in_inline_str = true,
                    b"rPh" if in_inline_str => in_phonetic = true,
                    b"t" if in_inline_str && !in_phonetic => in_inline_text = true,
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    // A row with no cells still counts as a (blank) row
                    b"row" => {
                        current_row = match attr_value(&e, b"r")? {
                            Some(r) => parse_row_number(&r)?,
                            None if seen_row => current_row + 1,
                            None => 0,
                        };
                        seen_row = true;
                        next_col = 0;
                        sheet.ensure_row(current_row);
                    }
                    // A valueless cell (usually styling only)
                    b"c" => {
                        let pending = PendingCell::from_element(&e, current_row, next_col)?;
                        next_col = pending.address.col.saturating_add(1);
                    }
                    b"mergeCell" => {
                        if let Some(reference) = attr_value(&e, b"ref")? {
                            let range = CellRange::parse(&reference).map_err(|err| {
                                XlsxError::Parse(format!(
                                    "Invalid merge range '{}': {}",
                                    reference, err
                                ))
                            })?;
                            sheet.add_merge(range);
                        }
                    }
                    _ => {}
                },
                Event::Text(e) => {
                    if let Some(pending) = cell.as_mut() {
                        if in_value {
                            pending.value.push_str(&e.unescape()?);
                        } else if in_inline_text {
                            pending.inline.get_or_insert_with(String::new).push_str(&e.unescape()?);
                        }
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            let address = pending.address;
                            let value = pending.into_value(shared_strings)?;
                            sheet.set_value(address.row, address.col, value);
                        }
                        in_value = false;
                        in_inline_str = false;
                        in_inline_text = false;
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"rPh" => in_phonetic = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }
}

/// A `<c>` element whose children are still being read
#[derive(Debug)]
struct PendingCell {
    address: CellAddress,
    cell_type: Option<String>,
    value: String,
    inline: Option<String>,
}

impl PendingCell {
    fn from_element(e: &BytesStart<'_>, row: u32, next_col: u16) -> XlsxResult<Self> {
        let mut address = CellAddress::new(row, next_col);
        let mut cell_type = None;

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    let reference = attr.unescape_value()?;
                    address = CellAddress::parse(&reference).map_err(|err| {
                        XlsxError::Parse(format!(
                            "Invalid cell reference '{}': {}",
                            reference, err
                        ))
                    })?;
                }
                b"t" => cell_type = Some(attr.unescape_value()?.into_owned()),
                _ => {}
            }
        }

        Ok(Self {
            address,
            cell_type,
            value: String::new(),
            inline: None,
        })
    }

    /// Resolve the collected text into a typed value
    fn into_value(self, shared_strings: &[SharedString]) -> XlsxResult<CellValue> {
        if let Some(inline) = self.inline {
            return Ok(CellValue::String(decode_excel_escapes(&inline).into()));
        }

        let value = self.value;
        if value.is_empty() {
            // Strings may legitimately be empty; every other type needs text
            return Ok(match self.cell_type.as_deref() {
                Some("str") | Some("inlineStr") => CellValue::string(""),
                _ => CellValue::Empty,
            });
        }

        let cell_value = match self.cell_type.as_deref() {
            // Shared string
            Some("s") => {
                let idx: usize = value.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::String(s.clone())
            }

            // Boolean
            Some("b") => {
                let v = value.trim();
                CellValue::Bool(v == "1" || v.eq_ignore_ascii_case("true"))
            }

            // Error
            Some("e") if value.trim() == NOT_AVAILABLE => CellValue::Empty,
            Some("e") => CellValue::string(value.trim()),

            // Formula string result or inline string carried in <v>
            Some("str") | Some("inlineStr") => {
                CellValue::String(decode_excel_escapes(&value).into())
            }

            // Number (default type or explicit "n")
            None | Some("n") => match value.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::String(value.into()),
            },

            // ISO 8601 dates and unknown types stay as text
            Some(_) => CellValue::String(value.into()),
        };

        Ok(cell_value)
    }
}

/// Look up one attribute by its full key
fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> XlsxResult<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Convert a 1-based `<row r>` to a 0-based index
fn parse_row_number(s: &str) -> XlsxResult<u32> {
    match s.trim().parse::<u32>() {
        Ok(r) if r >= 1 && r <= sheetsift_core::MAX_ROWS => Ok(r - 1),
        _ => Err(XlsxError::Parse(format!("Invalid row number: {}", s))),
    }
}

/// Relationship targets are relative to `xl/` unless absolute
fn resolve_part_path(target: &str) -> String {
    let target = target.replace('\\', "/");
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}
