//! In-memory BIFF8 workbook builder for reader tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

const BOF: u16 = 0x0809;
const EOF: u16 = 0x000A;
const BOUNDSHEET: u16 = 0x0085;
const SST: u16 = 0x00FC;
const LABELSST: u16 = 0x00FD;
const LABEL: u16 = 0x0204;
const NUMBER: u16 = 0x0203;
const RK: u16 = 0x027E;
const BOOLERR: u16 = 0x0205;
const FORMULA: u16 = 0x0006;
const STRING: u16 = 0x0207;
const MERGECELLS: u16 = 0x00E5;

pub fn record(record_type: u16, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 4);
    out.extend_from_slice(&record_type.to_le_bytes());
    out.extend_from_slice(&(body.len() as u16).to_le_bytes());
    out.extend_from_slice(body);
    out
}

fn bof(substream: u16, version: u16) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&version.to_le_bytes());
    body.extend_from_slice(&substream.to_le_bytes());
    body.extend_from_slice(&[0u8; 12]);
    record(BOF, &body)
}

fn unicode_string(s: &str) -> Vec<u8> {
    let units: Vec<u16> = s.encode_utf16().collect();
    let mut out = Vec::new();
    out.extend_from_slice(&(units.len() as u16).to_le_bytes());
    if units.iter().all(|&u| u < 0x100) {
        out.push(0x00);
        out.extend(units.iter().map(|&u| u as u8));
    } else {
        out.push(0x01);
        for u in units {
            out.extend_from_slice(&u.to_le_bytes());
        }
    }
    out
}

fn cell_header(row: u16, col: u16) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&row.to_le_bytes());
    body.extend_from_slice(&col.to_le_bytes());
    body.extend_from_slice(&0u16.to_le_bytes()); // xf
    body
}

/// One sheet's cell and merge records
#[derive(Default)]
pub struct SheetBuilder {
    name: String,
    sheet_type: u8,
    records: Vec<u8>,
}

impl SheetBuilder {
    pub fn worksheet(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sheet_type: 0,
            records: Vec::new(),
        }
    }

    pub fn chart(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sheet_type: 2,
            records: Vec::new(),
        }
    }

    pub fn shared(mut self, row: u16, col: u16, sst_index: u32) -> Self {
        let mut body = cell_header(row, col);
        body.extend_from_slice(&sst_index.to_le_bytes());
        self.records.extend(record(LABELSST, &body));
        self
    }

    pub fn label(mut self, row: u16, col: u16, text: &str) -> Self {
        let mut body = cell_header(row, col);
        body.extend(unicode_string(text));
        self.records.extend(record(LABEL, &body));
        self
    }

    pub fn number(mut self, row: u16, col: u16, value: f64) -> Self {
        let mut body = cell_header(row, col);
        body.extend_from_slice(&value.to_le_bytes());
        self.records.extend(record(NUMBER, &body));
        self
    }

    pub fn rk_int(mut self, row: u16, col: u16, value: i32) -> Self {
        let mut body = cell_header(row, col);
        body.extend_from_slice(&(((value << 2) as u32) | 0x02).to_le_bytes());
        self.records.extend(record(RK, &body));
        self
    }

    pub fn boolean(mut self, row: u16, col: u16, value: bool) -> Self {
        let mut body = cell_header(row, col);
        body.extend_from_slice(&[u8::from(value), 0]);
        self.records.extend(record(BOOLERR, &body));
        self
    }

    pub fn error(mut self, row: u16, col: u16, code: u8) -> Self {
        let mut body = cell_header(row, col);
        body.extend_from_slice(&[code, 1]);
        self.records.extend(record(BOOLERR, &body));
        self
    }

    pub fn formula_number(mut self, row: u16, col: u16, cached: f64) -> Self {
        let mut body = cell_header(row, col);
        body.extend_from_slice(&cached.to_le_bytes());
        body.extend_from_slice(&[0u8; 6]); // options + reserved
        body.extend_from_slice(&[0u8; 2]); // empty token array
        self.records.extend(record(FORMULA, &body));
        self
    }

    pub fn formula_string(mut self, row: u16, col: u16, cached: &str) -> Self {
        let mut body = cell_header(row, col);
        body.extend_from_slice(&[0x00, 0, 0, 0, 0, 0, 0xFF, 0xFF]);
        body.extend_from_slice(&[0u8; 6]);
        body.extend_from_slice(&[0u8; 2]);
        self.records.extend(record(FORMULA, &body));
        self.records.extend(record(STRING, &unicode_string(cached)));
        self
    }

    /// `(first_row, last_row, first_col, last_col)`, 0-based inclusive
    pub fn merge(mut self, first_row: u16, last_row: u16, first_col: u16, last_col: u16) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&1u16.to_le_bytes());
        for v in [first_row, last_row, first_col, last_col] {
            body.extend_from_slice(&v.to_le_bytes());
        }
        self.records.extend(record(MERGECELLS, &body));
        self
    }

    fn substream(&self) -> Vec<u8> {
        let substream_type = if self.sheet_type == 0 { 0x0010 } else { 0x0020 };
        let mut out = bof(substream_type, 0x0600);
        out.extend_from_slice(&self.records);
        out.extend(record(EOF, &[]));
        out
    }
}

/// A whole workbook stream
#[derive(Default)]
pub struct WorkbookBuilder {
    shared_strings: Vec<String>,
    sheets: Vec<SheetBuilder>,
    version: Option<u16>,
}

impl WorkbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared_strings(mut self, strings: &[&str]) -> Self {
        self.shared_strings = strings.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn sheet(mut self, sheet: SheetBuilder) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = Some(version);
        self
    }

    fn globals(&self, offsets: &[u32]) -> Vec<u8> {
        let mut out = bof(0x0005, self.version.unwrap_or(0x0600));

        if !self.shared_strings.is_empty() {
            let mut body = Vec::new();
            let count = self.shared_strings.len() as u32;
            body.extend_from_slice(&count.to_le_bytes());
            body.extend_from_slice(&count.to_le_bytes());
            for s in &self.shared_strings {
                body.extend(unicode_string(s));
            }
            out.extend(record(SST, &body));
        }

        for (sheet, &offset) in self.sheets.iter().zip(offsets) {
            let mut body = Vec::new();
            body.extend_from_slice(&offset.to_le_bytes());
            body.push(0); // visible
            body.push(sheet.sheet_type);
            body.push(sheet.name.len() as u8);
            body.push(0); // compressed
            body.extend_from_slice(sheet.name.as_bytes());
            out.extend(record(BOUNDSHEET, &body));
        }

        out.extend(record(EOF, &[]));
        out
    }

    /// The raw BIFF8 `Workbook` stream
    pub fn stream(&self) -> Vec<u8> {
        // BOUNDSHEET sizes do not depend on the offsets they carry
        let globals_len = self.globals(&vec![0; self.sheets.len()]).len();

        let substreams: Vec<Vec<u8>> = self.sheets.iter().map(SheetBuilder::substream).collect();
        let mut offsets = Vec::new();
        let mut pos = globals_len;
        for s in &substreams {
            offsets.push(pos as u32);
            pos += s.len();
        }

        let mut out = self.globals(&offsets);
        for s in substreams {
            out.extend(s);
        }
        out
    }

    /// The stream wrapped in a compound file, as an `.xls` file holds it
    pub fn build(&self) -> Vec<u8> {
        wrap_in_cfb("/Workbook", &self.stream())
    }
}

pub fn wrap_in_cfb(stream_name: &str, stream: &[u8]) -> Vec<u8> {
    let mut comp = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    {
        let mut s = comp.create_stream(stream_name).unwrap();
        s.write_all(stream).unwrap();
    }
    comp.flush().unwrap();
    comp.into_inner().into_inner()
}
