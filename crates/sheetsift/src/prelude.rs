//! Prelude module - common imports for sheetsift users
//!
//! ```rust
//! use sheetsift::prelude::*;
//! ```

pub use crate::{
    // Filtering
    apply_filters,
    // Export
    export_document,
    export_spreadsheet,
    // Loading
    list_sheets,
    load,
    load_with,
    project,
    // Rendering
    render_paginated_document,
    render_spreadsheet,

    // Cell and table types
    CellValue,
    // Error types
    Error,
    ExportArtifact,
    ExportError,
    FilterSpec,
    LoadCache,
    LoadError,
    LoadOptions,
    RenderError,
    ReportLayout,
    SheetSelector,
    Table,
};
