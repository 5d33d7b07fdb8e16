//! sift - filter one sheet of a workbook and export the result

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use sheetsift::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sift")]
#[command(
    author,
    version,
    about = "Filter spreadsheet sheets and export them as XLSX or PDF"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Which sheet to read and how to turn it into a table
#[derive(Args)]
struct SheetArgs {
    /// Input workbook (xlsx or xls)
    input: PathBuf,

    /// Sheet to read: a 0-based index or a sheet name
    #[arg(short, long, default_value = "0")]
    sheet: String,

    /// 0-based row holding the column names
    #[arg(long, default_value_t = 0)]
    header_row: usize,

    /// Fill merged ranges with their top-left value before reading
    #[arg(short, long)]
    unmerge: bool,

    /// Keep data rows that have no values
    #[arg(long)]
    keep_blank_rows: bool,
}

impl SheetArgs {
    fn options(&self) -> LoadOptions {
        LoadOptions {
            sheet: SheetSelector::parse(&self.sheet),
            header_row: self.header_row,
            unmerge_cells: self.unmerge,
            skip_blank_rows: !self.keep_blank_rows,
        }
    }

    fn load(&self) -> Result<Table> {
        load_with(self.input.as_path(), &self.options())
            .with_context(|| format!("Failed to load '{}'", self.input.display()))
    }
}

/// Row filters and column projection
#[derive(Args)]
struct ViewArgs {
    /// Keep rows whose COL value is one of the listed values (repeatable;
    /// `COL=` keeps nothing)
    #[arg(short, long = "filter", value_name = "COL=V1,V2")]
    filters: Vec<String>,

    /// Columns to keep, in order (default: all)
    #[arg(short, long, value_delimiter = ',', value_name = "A,B")]
    columns: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets of a workbook
    Sheets {
        /// Input workbook (xlsx or xls)
        input: PathBuf,
    },

    /// List the column names of a sheet
    Columns {
        #[command(flatten)]
        sheet: SheetArgs,
    },

    /// List the distinct values of a column
    Values {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Column name
        column: String,
    },

    /// Print the filtered table
    Preview {
        #[command(flatten)]
        sheet: SheetArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Print at most this many rows
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print JSON instead of tab-separated text
        #[arg(long)]
        json: bool,
    },

    /// Write the filtered table as XLSX and/or PDF
    Export {
        #[command(flatten)]
        sheet: SheetArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Output file name without extension (default: filtered_data)
        #[arg(short, long)]
        name: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Write an XLSX workbook
        #[arg(long)]
        xlsx: bool,

        /// Write a PDF report
        #[arg(long)]
        pdf: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sheets { input } => list_workbook_sheets(&input),
        Commands::Columns { sheet } => list_columns(&sheet),
        Commands::Values { sheet, column } => list_values(&sheet, &column),
        Commands::Preview {
            sheet,
            view,
            limit,
            json,
        } => preview(&sheet, &view, limit, json),
        Commands::Export {
            sheet,
            view,
            name,
            out_dir,
            xlsx,
            pdf,
        } => export(&sheet, &view, name.as_deref(), &out_dir, xlsx, pdf),
    }
}

fn list_workbook_sheets(input: &Path) -> Result<()> {
    let names =
        list_sheets(input).with_context(|| format!("Failed to open '{}'", input.display()))?;

    for (i, name) in names.iter().enumerate() {
        println!("  [{}] {}", i, name);
    }
    Ok(())
}

fn list_columns(sheet: &SheetArgs) -> Result<()> {
    let table = sheet.load()?;
    for name in table.columns() {
        println!("{}", name);
    }
    Ok(())
}

fn list_values(sheet: &SheetArgs, column: &str) -> Result<()> {
    let table = sheet.load()?;
    let values = table
        .distinct_values(column)
        .with_context(|| format!("No column '{}'", column))?;
    for value in values {
        println!("{}", value);
    }
    Ok(())
}

fn preview(sheet: &SheetArgs, view: &ViewArgs, limit: Option<usize>, json: bool) -> Result<()> {
    let table = build_view(&sheet.load()?, view)?;

    eprintln!(
        "Showing {} rows and {} columns.",
        table.row_count(),
        table.column_count()
    );

    let shown = limit.unwrap_or(table.row_count()).min(table.row_count());
    let table = if shown < table.row_count() {
        Table::new(table.columns().to_vec(), table.rows()[..shown].iter().cloned())?
    } else {
        table
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &table).context("Failed to write JSON")?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", table.columns().join("\t"))?;
        for row in table.rows() {
            let cells: Vec<String> = row.iter().map(|v| tsv_field(&v.to_string())).collect();
            writeln!(out, "{}", cells.join("\t"))?;
        }
    }
    Ok(())
}

fn export(
    sheet: &SheetArgs,
    view: &ViewArgs,
    name: Option<&str>,
    out_dir: &Path,
    xlsx: bool,
    pdf: bool,
) -> Result<()> {
    // Neither flag means both formats
    let (xlsx, pdf) = if xlsx || pdf { (xlsx, pdf) } else { (true, true) };

    let table = build_view(&sheet.load()?, view)?;
    if table.row_count() == 0 {
        bail!("No rows match the filters; nothing to export");
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create '{}'", out_dir.display()))?;

    if xlsx {
        let artifact = export_spreadsheet(&table, name).context("Failed to export XLSX")?;
        save(&artifact, out_dir)?;
    }

    if pdf {
        match export_document(&table, name) {
            Some(artifact) => save(&artifact, out_dir)?,
            None => eprintln!("Warning: PDF report could not be generated"),
        }
    }

    Ok(())
}

fn save(artifact: &ExportArtifact, out_dir: &Path) -> Result<()> {
    let path = artifact
        .save_in(out_dir)
        .with_context(|| format!("Failed to write '{}'", artifact.file_name))?;
    eprintln!(
        "Wrote {} ({} bytes) to '{}'",
        artifact.mime,
        artifact.bytes.len(),
        path.display()
    );
    Ok(())
}

/// Apply the `--filter` and `--columns` options to a loaded table
fn build_view(table: &Table, view: &ViewArgs) -> Result<Table> {
    let mut spec = FilterSpec::new();
    for filter in &view.filters {
        let (column, allowed) = parse_filter(table, filter)?;
        spec.set(column, allowed);
    }

    let filtered = apply_filters(table, &spec)?;
    if view.columns.is_empty() {
        return Ok(filtered);
    }
    Ok(project(&filtered, &view.columns)?)
}

/// Parse `COL=V1,V2` into a column and the observed values the tokens name
///
/// Tokens are compared with the display text of the column's values, so
/// `3` selects the number 3 and `TRUE` a boolean.
fn parse_filter(table: &Table, filter: &str) -> Result<(String, Vec<CellValue>)> {
    let Some((column, tokens)) = filter.split_once('=') else {
        bail!("Invalid filter '{}': expected COL=V1,V2", filter);
    };

    let observed = table
        .distinct_values(column)
        .with_context(|| format!("Invalid filter '{}'", filter))?;
    if tokens.is_empty() {
        return Ok((column.to_string(), Vec::new()));
    }

    let mut allowed = Vec::new();
    for token in tokens.split(',') {
        let before = allowed.len();
        allowed.extend(observed.iter().filter(|v| v.to_string() == token).cloned());
        if allowed.len() == before {
            eprintln!("Warning: no '{}' value in column '{}'", token, column);
        }
    }
    Ok((column.to_string(), allowed))
}

/// Keep tab-separated output one line per row
fn tsv_field(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            vec!["city".into(), "visits".into()],
            vec![
                vec![CellValue::from("Lyon"), CellValue::from(3)],
                vec![CellValue::from("Nice"), CellValue::from(2.5)],
                vec![CellValue::from("Lyon"), CellValue::Empty],
            ],
        )
        .unwrap()
    }

    fn view(filters: &[&str], columns: &[&str]) -> ViewArgs {
        ViewArgs {
            filters: filters.iter().map(|s| s.to_string()).collect(),
            columns: columns.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_filter_tokens_match_display_text() {
        let (column, allowed) = parse_filter(&table(), "visits=3,2.5,7").unwrap();
        assert_eq!(column, "visits");
        assert_eq!(allowed, vec![CellValue::from(3), CellValue::from(2.5)]);
    }

    #[test]
    fn test_empty_filter_keeps_nothing() {
        let result = build_view(&table(), &view(&["city="], &[])).unwrap();
        assert_eq!(result.row_count(), 0);
    }

    #[test]
    fn test_bad_filters() {
        assert!(parse_filter(&table(), "city").is_err());
        assert!(parse_filter(&table(), "town=Lyon").is_err());
    }

    #[test]
    fn test_repeated_filter_replaces_earlier() {
        let result = build_view(&table(), &view(&["city=Nice", "city=Lyon"], &[])).unwrap();
        assert_eq!(result.row_count(), 2);
    }

    #[test]
    fn test_filter_and_project() {
        let result = build_view(&table(), &view(&["city=Lyon"], &["visits"])).unwrap();
        assert_eq!(result.columns(), ["visits"]);
        assert_eq!(result.row_count(), 2);
    }

    #[test]
    fn test_sheet_argument() {
        let args = SheetArgs {
            input: PathBuf::from("book.xlsx"),
            sheet: "Q3".into(),
            header_row: 2,
            unmerge: true,
            keep_blank_rows: false,
        };
        let options = args.options();
        assert_eq!(options.sheet, SheetSelector::from("Q3"));
        assert_eq!(options.header_row, 2);
        assert!(options.unmerge_cells);
        assert!(options.skip_blank_rows);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
