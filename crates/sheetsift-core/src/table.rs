//! Rectangular table with named columns
//!
//! A [`Table`] is built once from a [`RawSheet`] by choosing a header row,
//! and is never mutated afterwards. Filtering and projection produce new
//! tables; filtered tables share row storage with their source.

use std::sync::Arc;

use ahash::AHashSet;

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::raw::RawSheet;

/// One table row; shared between a table and the tables filtered from it
pub type Row = Arc<[CellValue]>;

/// Ordered, uniquely named columns over rows of equal width
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, checking the shape invariants
    ///
    /// Fails with [`Error::DuplicateColumn`] when two columns share a name and
    /// with [`Error::RaggedRow`] when a row's width differs from the column count.
    pub fn new<I, R>(columns: Vec<String>, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<Row>,
    {
        let mut seen = AHashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(Error::DuplicateColumn(name.clone()));
            }
        }

        let rows: Vec<Row> = rows.into_iter().map(Into::into).collect();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::RaggedRow {
                    row: i,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }

        Ok(Self { columns, rows })
    }

    /// Slice a raw sheet into header and data rows
    ///
    /// Row `header_row` names the columns; rows before it are dropped and
    /// rows after it become data. The table is as wide as the widest of
    /// those rows. Blank header cells are named `Unnamed: <position>` and
    /// repeated names get `.1`, `.2`, ... suffixes. With `skip_blank_rows`
    /// data rows holding no value at all are left out.
    pub fn from_raw(raw: &RawSheet, header_row: usize, skip_blank_rows: bool) -> Result<Self> {
        let all_rows = raw.rows();
        if all_rows.is_empty() {
            return Ok(Self::default());
        }
        if header_row >= all_rows.len() {
            return Err(Error::HeaderRowOutOfRange {
                header_row,
                row_count: all_rows.len(),
            });
        }

        let header = &all_rows[header_row];
        let body = &all_rows[header_row + 1..];
        let width = body
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);

        let columns = column_names(header, width);

        let rows = body
            .iter()
            .filter(|cells| !skip_blank_rows || cells.iter().any(|v| !v.is_empty()))
            .map(|cells| {
                cells
                    .iter()
                    .cloned()
                    .chain(std::iter::repeat(CellValue::Empty))
                    .take(width)
                    .collect::<Row>()
            })
            .collect::<Vec<_>>();

        log::debug!(
            "sheet '{}': header row {} gives {} columns, {} data rows",
            raw.name(),
            header_row,
            columns.len(),
            rows.len()
        );

        Ok(Self { columns, rows })
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when there is nothing to show: no rows or no columns
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Position of a column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position of a column, or [`Error::UnknownColumn`]
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::unknown_column(name))
    }

    /// Value at a row and column position
    pub fn value(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// All values of one column, top to bottom
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Distinct values of a column in first-seen order
    ///
    /// These are the choices offered when picking a column's allowed values.
    pub fn distinct_values(&self, name: &str) -> Result<Vec<CellValue>> {
        let mut seen = AHashSet::new();
        Ok(self
            .column_values(name)?
            .filter(|v| seen.insert(*v))
            .cloned()
            .collect())
    }

    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }
}

/// Header cell values turned into unique, non-empty column names
fn column_names(header: &[CellValue], width: usize) -> Vec<String> {
    let mut used = AHashSet::with_capacity(width);
    let mut names = Vec::with_capacity(width);

    for i in 0..width {
        let base = match header.get(i) {
            None | Some(CellValue::Empty) => format!("Unnamed: {}", i),
            Some(CellValue::String(s)) if s.as_str().is_empty() => format!("Unnamed: {}", i),
            Some(value) => value.display_text(),
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while used.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        used.insert(name.clone());
        names.push(name);
    }

    names
}

#[cfg(feature = "serde")]
impl serde::Serialize for Table {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let rows: Vec<&[CellValue]> = self.rows.iter().map(|r| &r[..]).collect();
        let mut state = serializer.serialize_struct("Table", 2)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(rows: Vec<Vec<CellValue>>) -> RawSheet {
        RawSheet::from_rows("Sheet1", rows)
    }

    #[test]
    fn test_header_row_zero() {
        let sheet = raw(vec![
            vec!["Name".into(), "Qty".into()],
            vec!["apple".into(), 3.into()],
            vec!["pear".into(), 5.into()],
        ]);
        let table = Table::from_raw(&sheet, 0, true).unwrap();
        assert_eq!(table.columns(), ["Name", "Qty"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value(1, 1), Some(&CellValue::Number(5.0)));
    }

    #[test]
    fn test_later_header_row_drops_preamble() {
        let sheet = raw(vec![
            vec!["Quarterly export".into()],
            vec![],
            vec!["id".into(), "city".into()],
            vec![1.into(), "Oslo".into()],
        ]);
        let table = Table::from_raw(&sheet, 2, true).unwrap();
        assert_eq!(table.columns(), ["id", "city"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_unnamed_and_duplicate_headers() {
        let sheet = raw(vec![
            vec!["a".into(), CellValue::Empty, "a".into(), 2021.into(), "a".into()],
            vec![1.into(), 2.into(), 3.into(), 4.into(), 5.into(), 6.into()],
        ]);
        let table = Table::from_raw(&sheet, 0, true).unwrap();
        assert_eq!(
            table.columns(),
            ["a", "Unnamed: 1", "a.1", "2021", "a.2", "Unnamed: 5"]
        );
    }

    #[test]
    fn test_short_rows_are_padded() {
        let sheet = raw(vec![
            vec!["x".into(), "y".into(), "z".into()],
            vec![1.into()],
        ]);
        let table = Table::from_raw(&sheet, 0, true).unwrap();
        assert_eq!(&table.rows()[0][..], &[CellValue::Number(1.0), CellValue::Empty, CellValue::Empty]);
    }

    #[test]
    fn test_blank_rows() {
        let sheet = raw(vec![
            vec!["x".into()],
            vec![CellValue::Empty],
            vec![],
            vec![7.into()],
        ]);
        assert_eq!(Table::from_raw(&sheet, 0, true).unwrap().row_count(), 1);
        assert_eq!(Table::from_raw(&sheet, 0, false).unwrap().row_count(), 3);
    }

    #[test]
    fn test_header_row_out_of_range() {
        let sheet = raw(vec![vec!["x".into()]]);
        assert_eq!(
            Table::from_raw(&sheet, 4, true),
            Err(Error::HeaderRowOutOfRange {
                header_row: 4,
                row_count: 1
            })
        );
        assert_eq!(Table::from_raw(&RawSheet::new("e"), 0, true).unwrap(), Table::default());
    }

    #[test]
    fn test_new_checks_shape() {
        let err = Table::new(vec!["a".into(), "a".into()], Vec::<Vec<CellValue>>::new());
        assert_eq!(err, Err(Error::DuplicateColumn("a".into())));

        let err = Table::new(vec!["a".into()], vec![vec![CellValue::Empty, CellValue::Empty]]);
        assert_eq!(
            err,
            Err(Error::RaggedRow {
                row: 0,
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn test_distinct_values_keep_first_seen_order() {
        let table = Table::new(
            vec!["k".into()],
            ["B", "A", "B", "C", "A"]
                .iter()
                .map(|s| vec![CellValue::from(*s)]),
        )
        .unwrap();
        assert_eq!(
            table.distinct_values("k").unwrap(),
            vec![CellValue::from("B"), CellValue::from("A"), CellValue::from("C")]
        );
        assert_eq!(
            table.distinct_values("nope").unwrap_err(),
            Error::UnknownColumn("nope".into())
        );
    }
}
