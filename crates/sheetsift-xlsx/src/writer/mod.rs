//! XLSX writer
//!
//! Writes a [`Table`] as a workbook with a single worksheet: the column
//! names in row 1 (bold), then one row per table row. Strings are stored
//! inline, so no shared string part is produced.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::{encode_excel_escapes, escape_xml};
use sheetsift_core::{CellAddress, CellValue, Table, MAX_COLS, MAX_ROWS};

/// Longest sheet name Excel accepts
const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters Excel rejects in sheet names
const INVALID_SHEET_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Cell format index of the bold header style in `styles.xml`
const HEADER_XF: u32 = 1;

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a table to a file path
    pub fn write_table_file<P: AsRef<Path>>(
        table: &Table,
        sheet_name: &str,
        path: P,
    ) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write_table(table, sheet_name, file)
    }

    /// Write a table to a writer
    pub fn write_table<W: Write + Seek>(
        table: &Table,
        sheet_name: &str,
        writer: W,
    ) -> XlsxResult<()> {
        validate_sheet_name(sheet_name)?;
        if table.row_count() + 1 > MAX_ROWS as usize {
            return Err(XlsxError::InvalidFormat(format!(
                "{} rows plus a header exceed the sheet limit of {}",
                table.row_count(),
                MAX_ROWS
            )));
        }
        if table.column_count() > usize::from(MAX_COLS) {
            return Err(XlsxError::InvalidFormat(format!(
                "{} columns exceed the sheet limit of {}",
                table.column_count(),
                MAX_COLS
            )));
        }

        let mut zip = zip::ZipWriter::new(writer);

        Self::write_content_types(&mut zip)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, sheet_name)?;
        Self::write_workbook_rels(&mut zip)?;
        Self::write_styles_xml(&mut zip)?;
        Self::write_worksheet(&mut zip, table)?;

        zip.finish()?;

        log::debug!(
            "xlsx: wrote sheet '{}' ({} rows x {} columns)",
            sheet_name,
            table.row_count(),
            table.column_count()
        );
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        sheet_name: &str,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/workbook.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="{}" sheetId="1" r:id="rId1"/>
    </sheets>
</workbook>"#,
            escape_xml(sheet_name)
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Default style plus a bold one for the header row
    fn write_styles_xml<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/styles.xml", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <fonts count="2">
        <font><sz val="11"/><name val="Calibri"/><family val="2"/></font>
        <font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font>
    </fonts>
    <fills count="2">
        <fill><patternFill patternType="none"/></fill>
        <fill><patternFill patternType="gray125"/></fill>
    </fills>
    <borders count="1">
        <border><left/><right/><top/><bottom/><diagonal/></border>
    </borders>
    <cellStyleXfs count="1">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    </cellStyleXfs>
    <cellXfs count="2">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
        <xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>
    </cellXfs>
    <cellStyles count="1">
        <cellStyle name="Normal" xfId="0" builtinId="0"/>
    </cellStyles>
</styleSheet>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        table: &Table,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/worksheets/sheet1.xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <sheetData>"#,
        );

        if table.column_count() > 0 {
            content.push_str("\n        <row r=\"1\">");
            for (col, name) in table.columns().iter().enumerate() {
                let cell_ref = CellAddress::new(0, col as u16).to_a1_string();
                push_inline_string(&mut content, &cell_ref, Some(HEADER_XF), name);
            }
            content.push_str("\n        </row>");
        }

        for (i, row) in table.rows().iter().enumerate() {
            let row_number = i as u32 + 1;
            // Blank rows stay in place as empty row elements
            if row.iter().all(CellValue::is_empty) {
                content.push_str(&format!("\n        <row r=\"{}\"/>", row_number + 1));
                continue;
            }
            content.push_str(&format!("\n        <row r=\"{}\">", row_number + 1));
            for (col, value) in row.iter().enumerate() {
                let cell_ref = CellAddress::new(row_number, col as u16).to_a1_string();
                push_cell(&mut content, &cell_ref, value);
            }
            content.push_str("\n        </row>");
        }

        content.push_str("\n    </sheetData>\n</worksheet>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn push_cell(content: &mut String, cell_ref: &str, value: &CellValue) {
    match value {
        CellValue::Number(n) if n.is_finite() => {
            content.push_str(&format!("\n            <c r=\"{}\"><v>{}</v></c>", cell_ref, n));
        }
        // XLSX has no representation for NaN or infinity
        CellValue::Number(n) => push_inline_string(content, cell_ref, None, &n.to_string()),
        CellValue::String(s) => push_inline_string(content, cell_ref, None, s.as_str()),
        CellValue::Bool(b) => {
            content.push_str(&format!(
                "\n            <c r=\"{}\" t=\"b\"><v>{}</v></c>",
                cell_ref,
                if *b { 1 } else { 0 }
            ));
        }
        CellValue::Empty => {}
    }
}

fn push_inline_string(content: &mut String, cell_ref: &str, style: Option<u32>, text: &str) {
    let style_attr = match style {
        Some(xf) => format!(" s=\"{}\"", xf),
        None => String::new(),
    };
    content.push_str(&format!(
        "\n            <c r=\"{}\"{} t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
        cell_ref,
        style_attr,
        escape_xml(&encode_excel_escapes(text))
    ));
}

fn validate_sheet_name(name: &str) -> XlsxResult<()> {
    let len = name.chars().count();
    if len == 0 || len > MAX_SHEET_NAME_LEN {
        return Err(XlsxError::InvalidFormat(format!(
            "sheet name '{}' must be 1 to {} characters",
            name, MAX_SHEET_NAME_LEN
        )));
    }
    if name.contains(INVALID_SHEET_NAME_CHARS) || name.starts_with('\'') || name.ends_with('\'') {
        return Err(XlsxError::InvalidFormat(format!(
            "sheet name '{}' contains characters Excel does not allow",
            name
        )));
    }
    Ok(())
}
