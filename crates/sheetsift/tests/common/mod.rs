//! Workbook fixtures built in memory.

#![allow(dead_code)]

use std::io::{Cursor, Write};

const CONTENT_TYPES: &str = r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

/// An XLSX workbook with one worksheet per `(name, sheetData inner XML, mergeCells inner XML)`
pub fn xlsx(sheets: &[(&str, &str, &str)]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();

        let mut workbook = String::from(
            r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
        );
        let mut rels = String::from(
            r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (i, (name, _, _)) in sheets.iter().enumerate() {
            workbook.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                name,
                i + 1,
                i + 1
            ));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }
        workbook.push_str("</sheets></workbook>");
        rels.push_str("</Relationships>");

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(workbook.as_bytes()).unwrap();
        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();

        for (i, (_, rows, merges)) in sheets.iter().enumerate() {
            let mut sheet = format!(
                r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData>"#,
                rows
            );
            if !merges.is_empty() {
                sheet.push_str(&format!("<mergeCells>{}</mergeCells>", merges));
            }
            sheet.push_str("</worksheet>");
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(sheet.as_bytes()).unwrap();
        }

        zip.finish().unwrap();
    }
    buf
}

/// Inline string cell
pub fn s(cell: &str, text: &str) -> String {
    format!(r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#, cell, text)
}

/// Numeric cell
pub fn n(cell: &str, value: f64) -> String {
    format!(r#"<c r="{}"><v>{}</v></c>"#, cell, value)
}

/// A `<row>` element from its cells
pub fn row(number: u32, cells: &[String]) -> String {
    format!(r#"<row r="{}">{}</row>"#, number, cells.concat())
}

const BOF: u16 = 0x0809;
const EOF: u16 = 0x000A;
const BOUNDSHEET: u16 = 0x0085;
const LABEL: u16 = 0x0204;
const NUMBER: u16 = 0x0203;
const MERGECELLS: u16 = 0x00E5;

fn record(record_type: u16, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 4);
    out.extend_from_slice(&record_type.to_le_bytes());
    out.extend_from_slice(&(body.len() as u16).to_le_bytes());
    out.extend_from_slice(body);
    out
}

fn bof(substream: u16) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0x0600u16.to_le_bytes());
    body.extend_from_slice(&substream.to_le_bytes());
    body.extend_from_slice(&[0u8; 12]);
    record(BOF, &body)
}

/// A cell of an XLS fixture
pub enum XlsCell<'a> {
    Text(&'a str),
    Number(f64),
}

/// A one-worksheet XLS file: cells by `(row, col)` plus merges as
/// `(first_row, last_row, first_col, last_col)`
pub fn xls(sheet_name: &str, cells: &[(u16, u16, XlsCell)], merges: &[(u16, u16, u16, u16)]) -> Vec<u8> {
    let mut sheet = bof(0x0010);
    for (r, c, cell) in cells {
        let mut body = Vec::new();
        body.extend_from_slice(&r.to_le_bytes());
        body.extend_from_slice(&c.to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes());
        match cell {
            XlsCell::Text(text) => {
                body.extend_from_slice(&(text.len() as u16).to_le_bytes());
                body.push(0);
                body.extend_from_slice(text.as_bytes());
                sheet.extend(record(LABEL, &body));
            }
            XlsCell::Number(v) => {
                body.extend_from_slice(&v.to_le_bytes());
                sheet.extend(record(NUMBER, &body));
            }
        }
    }
    if !merges.is_empty() {
        let mut body = Vec::new();
        body.extend_from_slice(&(merges.len() as u16).to_le_bytes());
        for &(r1, r2, c1, c2) in merges {
            for v in [r1, r2, c1, c2] {
                body.extend_from_slice(&v.to_le_bytes());
            }
        }
        sheet.extend(record(MERGECELLS, &body));
    }
    sheet.extend(record(EOF, &[]));

    let boundsheet = |offset: u32| {
        let mut body = Vec::new();
        body.extend_from_slice(&offset.to_le_bytes());
        body.push(0);
        body.push(0);
        body.push(sheet_name.len() as u8);
        body.push(0);
        body.extend_from_slice(sheet_name.as_bytes());
        record(BOUNDSHEET, &body)
    };
    let globals_len = bof(0x0005).len() + boundsheet(0).len() + record(EOF, &[]).len();

    let mut stream = bof(0x0005);
    stream.extend(boundsheet(globals_len as u32));
    stream.extend(record(EOF, &[]));
    stream.extend(sheet);

    let mut comp = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    {
        let mut s = comp.create_stream("/Workbook").unwrap();
        s.write_all(&stream).unwrap();
    }
    comp.flush().unwrap();
    comp.into_inner().into_inner()
}
