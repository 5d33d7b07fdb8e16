//! Column selection and reordering

use ahash::AHashSet;

use crate::error::{Error, Result};
use crate::table::{Row, Table};

/// Keep the named columns, in the order given
///
/// Row count is preserved. Naming a column the table lacks fails with
/// [`Error::UnknownColumn`]; naming one twice fails with
/// [`Error::DuplicateColumn`]. An empty list yields a table with no columns.
pub fn project<S: AsRef<str>>(table: &Table, columns: &[S]) -> Result<Table> {
    let mut seen = AHashSet::with_capacity(columns.len());
    let mut indices = Vec::with_capacity(columns.len());
    for name in columns {
        let name = name.as_ref();
        if !seen.insert(name) {
            return Err(Error::DuplicateColumn(name.to_string()));
        }
        indices.push(table.require_column(name)?);
    }

    let rows = table
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect::<Row>())
        .collect();
    let names = indices
        .iter()
        .map(|&i| table.columns()[i].clone())
        .collect();

    Ok(Table::from_parts(names, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;
    use pretty_assertions::assert_eq;

    fn sample() -> Table {
        Table::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![CellValue::from(1), CellValue::from("x"), CellValue::Empty],
                vec![CellValue::from(2), CellValue::from("y"), CellValue::from(true)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_reorders_and_restricts() {
        let out = project(&sample(), &["c", "a"]).unwrap();
        assert_eq!(out.columns(), ["c", "a"]);
        assert_eq!(out.row_count(), 2);
        assert_eq!(&out.rows()[1][..], &[CellValue::Bool(true), CellValue::Number(2.0)]);
    }

    #[test]
    fn test_unknown_column() {
        assert_eq!(
            project(&sample(), &["a", "zzz"]),
            Err(Error::UnknownColumn("zzz".into()))
        );
    }

    #[test]
    fn test_duplicate_column() {
        assert_eq!(
            project(&sample(), &["b", "b"]),
            Err(Error::DuplicateColumn("b".into()))
        );
    }

    #[test]
    fn test_empty_projection() {
        let out = project::<&str>(&sample(), &[]).unwrap();
        assert_eq!(out.column_count(), 0);
        assert_eq!(out.row_count(), 2);
        assert!(out.is_empty());
    }
}
