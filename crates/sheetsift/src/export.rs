//! Named download artifacts for a filtered table

use std::path::{Path, PathBuf};

use sheetsift_core::Table;

use crate::error::ExportError;
use crate::render::{render_paginated_document, render_spreadsheet};

/// MIME type of an XLSX workbook
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// MIME type of a PDF document
pub const PDF_MIME: &str = "application/pdf";

/// File stem used when none is given
pub const DEFAULT_STEM: &str = "filtered_data";

/// A rendered file ready to be saved or offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// File name including the extension
    pub file_name: String,
    /// MIME type of `bytes`
    pub mime: &'static str,
    /// File content
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its file name
    pub fn save_in<P: AsRef<Path>>(&self, dir: P) -> std::io::Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Export a table as an XLSX workbook named `<stem>.xlsx`
pub fn export_spreadsheet(table: &Table, stem: Option<&str>) -> Result<ExportArtifact, ExportError> {
    if table.row_count() == 0 || table.column_count() == 0 {
        return Err(ExportError::EmptyTable);
    }
    Ok(ExportArtifact {
        file_name: file_name(stem, "xlsx"),
        mime: XLSX_MIME,
        bytes: render_spreadsheet(table)?,
    })
}

/// Export a table as a PDF report named `<stem>.pdf`
///
/// Returns `None` when the table is empty or the report cannot be laid
/// out; the cause is logged.
pub fn export_document(table: &Table, stem: Option<&str>) -> Option<ExportArtifact> {
    if table.row_count() == 0 || table.column_count() == 0 {
        log::warn!("document export skipped: the table is empty");
        return None;
    }
    match render_paginated_document(table) {
        Ok(bytes) => Some(ExportArtifact {
            file_name: file_name(stem, "pdf"),
            mime: PDF_MIME,
            bytes,
        }),
        Err(e) => {
            log::warn!("document export failed: {}", e);
            None
        }
    }
}

fn file_name(stem: Option<&str>, extension: &str) -> String {
    let stem = stem.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_STEM);
    format!("{}.{}", stem, extension)
}
