//! Row filtering by allowed values

use ahash::AHashSet;

use crate::cell::CellValue;
use crate::error::Result;
use crate::table::Table;

/// Allowed values per column
///
/// A column that is not mentioned is not filtered. A column mapped to an
/// empty set matches no row at all: deselecting every value shows nothing
/// rather than falling back to showing everything. Restrictions keep the
/// order they were first added in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    allowed: Vec<(String, AHashSet<CellValue>)>,
}

impl FilterSpec {
    /// Create a spec that filters nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict a column to the given values, replacing any earlier restriction
    pub fn allow<S, I, V>(mut self, column: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.set(column, values);
        self
    }

    /// In-place form of [`FilterSpec::allow`]
    pub fn set<S, I, V>(&mut self, column: S, values: I)
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let column = column.into();
        let values: AHashSet<CellValue> = values.into_iter().map(Into::into).collect();
        match self.allowed.iter_mut().find(|(name, _)| *name == column) {
            Some((_, allowed)) => *allowed = values,
            None => self.allowed.push((column, values)),
        }
    }
}

/// Keep the rows whose value in every restricted column is allowed
///
/// Restrictions combine with AND. `Empty` cells match only when `Empty` is
/// in the allowed set. Fails with
/// [`Error::UnknownColumn`](crate::Error::UnknownColumn) when the spec names
/// a column the table lacks; an empty allowed set is not an error.
pub fn apply_filters(table: &Table, spec: &FilterSpec) -> Result<Table> {
    // Checked in insertion order, so the first unknown column is the one reported
    let mut checks = Vec::with_capacity(spec.allowed.len());
    for (column, allowed) in &spec.allowed {
        checks.push((table.require_column(column)?, allowed));
    }

    let rows = if checks.iter().any(|(_, allowed)| allowed.is_empty()) {
        Vec::new()
    } else {
        table
            .rows()
            .iter()
            .filter(|row| checks.iter().all(|(idx, allowed)| allowed.contains(&row[*idx])))
            .cloned()
            .collect()
    };

    log::debug!(
        "filtered {} of {} rows on {} columns",
        rows.len(),
        table.row_count(),
        checks.len()
    );

    Ok(Table::from_parts(table.columns().to_vec(), rows))
}
