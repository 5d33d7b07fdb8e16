//! Report page geometry and styling
//!
//! All lengths are PDF points (72 per inch).

use crate::font::Font;

/// Points per inch
pub const INCH: f64 = 72.0;

/// An RGB fill or stroke color, components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f64, pub f64, pub f64);

impl Rgb {
    /// Black
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    /// Mid grey (#808080)
    pub const GREY: Rgb = Rgb(0.502, 0.502, 0.502);
    /// Beige (#F5F5DC)
    pub const BEIGE: Rgb = Rgb(0.961, 0.961, 0.863);
}

/// Layout of a paginated table report
///
/// The page grows wider with the column count so every column gets a
/// readable width; the height is fixed. The defaults describe a US letter
/// landscape page that widens by 1.5in per column past seven columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    /// Narrowest page width
    pub min_page_width: f64,
    /// Page width wanted per column
    pub width_per_column: f64,
    /// Added to `columns * width_per_column` when sizing the page
    pub width_allowance: f64,
    /// Page height
    pub page_height: f64,
    /// Left margin
    pub margin_left: f64,
    /// Right margin
    pub margin_right: f64,
    /// Top margin
    pub margin_top: f64,
    /// Bottom margin
    pub margin_bottom: f64,

    /// Title printed above the table on the first page
    pub title: String,
    /// Title font
    pub title_font: Font,
    /// Title font size
    pub title_size: f64,
    /// Title line height
    pub title_leading: f64,
    /// Gap between title and table
    pub title_space_after: f64,

    /// Body cell font
    pub cell_font: Font,
    /// Header cell font
    pub header_font: Font,
    /// Cell font size
    pub font_size: f64,
    /// Cell line height
    pub leading: f64,
    /// Padding on each side of a cell's text
    pub cell_padding: f64,

    /// Header row background
    pub header_background: Rgb,
    /// Body row background
    pub body_background: Rgb,
    /// Text color
    pub text_color: Rgb,
    /// Grid line color
    pub grid_color: Rgb,
    /// Grid line width
    pub grid_width: f64,

    /// Draw the header row again at the top of every following page
    pub repeat_header: bool,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            min_page_width: 11.0 * INCH,
            width_per_column: 1.5 * INCH,
            width_allowance: 1.0 * INCH,
            page_height: 8.5 * INCH,
            margin_left: 0.5 * INCH,
            margin_right: 0.5 * INCH,
            margin_top: 0.5 * INCH,
            margin_bottom: 0.5 * INCH,

            title: "Filtered Data Report".to_string(),
            title_font: Font::HelveticaBold,
            title_size: 18.0,
            title_leading: 22.0,
            title_space_after: 6.0,

            cell_font: Font::Helvetica,
            header_font: Font::HelveticaBold,
            font_size: 9.0,
            leading: 11.0,
            cell_padding: 5.0,

            header_background: Rgb::GREY,
            body_background: Rgb::BEIGE,
            text_color: Rgb::BLACK,
            grid_color: Rgb::BLACK,
            grid_width: 1.0,

            repeat_header: false,
        }
    }
}

impl ReportLayout {
    /// Page width for a table with `columns` columns
    pub fn page_width(&self, columns: usize) -> f64 {
        let wanted = columns as f64 * self.width_per_column + self.width_allowance;
        self.min_page_width.max(wanted)
    }

    /// Width between the left and right margins
    pub fn content_width(&self, columns: usize) -> f64 {
        self.page_width(columns) - self.margin_left - self.margin_right
    }

    /// Equal share of the content width for each column
    pub fn column_width(&self, columns: usize) -> f64 {
        if columns == 0 {
            return 0.0;
        }
        self.content_width(columns) / columns as f64
    }

    /// Height between the top and bottom margins
    pub fn usable_height(&self) -> f64 {
        self.page_height - self.margin_top - self.margin_bottom
    }

    /// Vertical space the title takes on the first page, gap included
    pub fn title_height(&self) -> f64 {
        if self.title.is_empty() {
            0.0
        } else {
            self.title_leading + self.title_space_after
        }
    }

    /// Room for text inside a cell of the given width
    pub fn text_width(&self, column_width: f64) -> f64 {
        column_width - 2.0 * self.cell_padding
    }

    /// Height of a cell holding `lines` lines of text
    pub fn cell_height(&self, lines: usize) -> f64 {
        lines.max(1) as f64 * self.leading + 2.0 * self.cell_padding
    }
}
