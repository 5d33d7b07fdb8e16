//! Rendering a table as an XLSX workbook or a PDF report

use std::io::Cursor;

use sheetsift_core::Table;
use sheetsift_pdf::{PdfWriter, ReportLayout};
use sheetsift_xlsx::XlsxWriter;

use crate::error::RenderError;

/// Name of the single sheet in a rendered workbook
pub const SPREADSHEET_SHEET_NAME: &str = "Filtered_Data";

/// Render a table as a one-sheet XLSX workbook
///
/// The sheet holds the header row then the data rows, with no index column.
pub fn render_spreadsheet(table: &Table) -> Result<Vec<u8>, RenderError> {
    let mut cursor = Cursor::new(Vec::new());
    XlsxWriter::write_table(table, SPREADSHEET_SHEET_NAME, &mut cursor)?;
    Ok(cursor.into_inner())
}

/// Render a table as a paginated PDF report with the default layout
pub fn render_paginated_document(table: &Table) -> Result<Vec<u8>, RenderError> {
    render_document_with(table, &ReportLayout::default())
}

/// Render a table as a paginated PDF report with a custom layout
pub fn render_document_with(table: &Table, layout: &ReportLayout) -> Result<Vec<u8>, RenderError> {
    Ok(PdfWriter::to_bytes(table, layout)?)
}
