//! Table report writer

use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};
use sheetsift_core::Table;

use crate::error::{PdfError, PdfResult, RowIndex};
use crate::font::{encode_win_ansi, Font};
use crate::layout::{ReportLayout, Rgb};
use crate::wrap::wrap_text;

/// PDF table report writer
pub struct PdfWriter;

impl PdfWriter {
    /// Render a table into a byte buffer
    pub fn to_bytes(table: &Table, layout: &ReportLayout) -> PdfResult<Vec<u8>> {
        let mut out = Vec::new();
        Self::write_table(table, layout, &mut out)?;
        Ok(out)
    }

    /// Render a table as a paginated report
    ///
    /// The header row comes first, then one row per table row. Rows flow
    /// onto new pages as needed but are never split across pages.
    pub fn write_table<W: Write>(table: &Table, layout: &ReportLayout, writer: W) -> PdfResult<()> {
        let pages = layout_pages(table, layout)?;
        let mut document = build_document(&pages, layout, layout.page_width(table.column_count()))?;
        save(&mut document, writer)
    }
}

/// Header or body styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Header,
    Body,
}

/// A row's cell text broken into lines, with the height it needs
#[derive(Debug)]
struct PreparedRow {
    cells: Vec<Vec<String>>,
    height: f64,
}

impl PreparedRow {
    fn new<'a>(
        texts: impl Iterator<Item = &'a str>,
        font: Font,
        layout: &ReportLayout,
        text_width: f64,
    ) -> Self {
        let cells: Vec<Vec<String>> = texts
            .map(|t| wrap_text(t, font, layout.font_size, text_width))
            .collect();
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1);
        Self {
            height: layout.cell_height(lines),
            cells,
        }
    }
}

/// Content operations of every page, top page first
#[derive(Debug)]
struct LaidOutPages {
    pages: Vec<Vec<Operation>>,
    substituted: usize,
}

/// Wrap every row, check it fits, and lay the rows out page by page
fn layout_pages(table: &Table, layout: &ReportLayout) -> PdfResult<LaidOutPages> {
    let columns = table.column_count();
    if columns == 0 {
        return Err(PdfError::EmptyTable);
    }

    let page_width = layout.page_width(columns);
    let column_width = layout.column_width(columns);
    let text_width = layout.text_width(column_width);
    let available = layout.usable_height();

    log::debug!(
        "pdf: {} columns x {} rows, page {:.1}x{:.1}pt, column width {:.1}pt",
        columns,
        table.row_count(),
        page_width,
        layout.page_height,
        column_width
    );

    let header = PreparedRow::new(
        table.columns().iter().map(String::as_str),
        layout.header_font,
        layout,
        text_width,
    );
    // The title and the header row open the first page together
    let opening = layout.title_height() + header.height;
    if opening > available {
        return Err(PdfError::RowTooTall {
            row: RowIndex::Header,
            height: opening,
            available,
        });
    }
    // A repeated header shares every later page with the row below it
    let row_room = if layout.repeat_header {
        available - header.height
    } else {
        available
    };

    let mut rows = Vec::with_capacity(table.row_count());
    for (i, row) in table.rows().iter().enumerate() {
        let texts: Vec<String> = row.iter().map(ToString::to_string).collect();
        let prepared = PreparedRow::new(
            texts.iter().map(String::as_str),
            layout.cell_font,
            layout,
            text_width,
        );
        if prepared.height > row_room {
            return Err(PdfError::RowTooTall {
                row: RowIndex::Data(i),
                height: prepared.height,
                available: row_room,
            });
        }
        rows.push(prepared);
    }

    let mut pages = Paginator::new(layout, page_width, column_width);
    pages.draw_title();
    pages.place(&header, RowKind::Header);
    for row in &rows {
        if pages.needs_break(row.height) {
            pages.break_page();
            if layout.repeat_header {
                pages.place(&header, RowKind::Header);
            }
        }
        pages.place(row, RowKind::Body);
    }
    let laid_out = pages.finish();

    if laid_out.substituted > 0 {
        log::warn!(
            "pdf: {} characters outside WinAnsi were replaced with '?'",
            laid_out.substituted
        );
    }
    log::debug!("pdf: {} pages", laid_out.pages.len());
    Ok(laid_out)
}

/// Builds page content top to bottom
struct Paginator<'a> {
    layout: &'a ReportLayout,
    page_width: f64,
    column_width: f64,
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    /// Top of the free space on the current page
    y: f64,
    substituted: usize,
}

impl<'a> Paginator<'a> {
    fn new(layout: &'a ReportLayout, page_width: f64, column_width: f64) -> Self {
        Self {
            layout,
            page_width,
            column_width,
            pages: Vec::new(),
            current: Vec::new(),
            y: layout.page_height - layout.margin_top,
            substituted: 0,
        }
    }

    fn draw_title(&mut self) {
        let layout = self.layout;
        if layout.title.is_empty() {
            return;
        }
        let width = layout.title_font.text_width(&layout.title, layout.title_size);
        let x = (self.page_width - width) / 2.0;
        let baseline = self.y - layout.title_size;
        self.text(layout.title_font, layout.title_size, x, baseline, &layout.title);
        self.y -= layout.title_height();
    }

    fn needs_break(&self, height: f64) -> bool {
        self.y - height < self.layout.margin_bottom - 1e-9
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = self.layout.page_height - self.layout.margin_top;
    }

    fn place(&mut self, row: &PreparedRow, kind: RowKind) {
        let layout = self.layout;
        if self.needs_break(row.height) {
            self.break_page();
        }

        let (font, background) = match kind {
            RowKind::Header => (layout.header_font, layout.header_background),
            RowKind::Body => (layout.cell_font, layout.body_background),
        };
        let top = self.y;
        let bottom = top - row.height;

        for (i, lines) in row.cells.iter().enumerate() {
            let x = layout.margin_left + i as f64 * self.column_width;
            let cell = [real(x), real(bottom), real(self.column_width), real(row.height)];

            self.set_fill(background);
            self.op("re", cell.to_vec());
            self.op("f", vec![]);

            for (j, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let baseline = top - layout.cell_padding - layout.font_size - j as f64 * layout.leading;
                self.text(font, layout.font_size, x + layout.cell_padding, baseline, line);
            }

            let Rgb(r, g, b) = layout.grid_color;
            self.op("RG", vec![real(r), real(g), real(b)]);
            self.op("w", vec![real(layout.grid_width)]);
            self.op("re", cell.to_vec());
            self.op("S", vec![]);
        }

        self.y = bottom;
    }

    fn set_fill(&mut self, Rgb(r, g, b): Rgb) {
        self.op("rg", vec![real(r), real(g), real(b)]);
    }

    fn text(&mut self, font: Font, size: f64, x: f64, baseline: f64, text: &str) {
        let (bytes, substituted) = encode_win_ansi(text);
        self.substituted += substituted;
        self.set_fill(self.layout.text_color);
        self.op("BT", vec![]);
        self.op("Tf", vec![Object::Name(font.resource_name().into()), real(size)]);
        self.op("Td", vec![real(x), real(baseline)]);
        self.op("Tj", vec![Object::String(bytes, StringFormat::Literal)]);
        self.op("ET", vec![]);
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.current.push(Operation::new(operator, operands));
    }

    fn finish(mut self) -> LaidOutPages {
        self.pages.push(self.current);
        LaidOutPages {
            pages: self.pages,
            substituted: self.substituted,
        }
    }
}

/// Assemble the page tree, fonts and document info around the page content
fn build_document(laid_out: &LaidOutPages, layout: &ReportLayout, page_width: f64) -> PdfResult<Document> {
    let mut doc = Document::with_version("1.4");

    let pages_id = doc.new_object_id();
    let regular = doc.add_object(font_dict(Font::Helvetica));
    let bold = doc.add_object(font_dict(Font::HelveticaBold));
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Helvetica.resource_name() => regular,
            Font::HelveticaBold.resource_name() => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(laid_out.pages.len());
    for operations in &laid_out.pages {
        let content = Content {
            operations: operations.clone(),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![real(0.0), real(0.0), real(page_width), real(layout.page_height)],
            "Resources" => resources,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });

    let (title, _) = encode_win_ansi(&layout.title);
    let created = chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(title, StringFormat::Literal),
        "Producer" => Object::string_literal("sheetsift"),
        "CreationDate" => Object::string_literal(created),
    });

    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    Ok(doc)
}

fn save<W: Write>(document: &mut Document, mut writer: W) -> PdfResult<()> {
    document.save_to(&mut writer).map_err(lopdf::Error::from)?;
    Ok(())
}

fn font_dict(font: Font) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}
