//! Raw sheet grid as read from a spreadsheet file
//!
//! A [`RawSheet`] is what the format readers produce: every cell value in
//! its original position plus the sheet's merge ranges. No header has been
//! chosen yet.

use crate::cell::{CellAddress, CellRange, CellValue};

/// Dense grid of cell values plus merge ranges for one worksheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    name: String,
    rows: Vec<Vec<CellValue>>,
    merges: Vec<CellRange>,
}

impl RawSheet {
    /// Create an empty sheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            merges: Vec::new(),
        }
    }

    /// Build a sheet from row vectors (test and fixture helper)
    pub fn from_rows<S, I, R, V>(name: S, rows: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self {
            name: name.into(),
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
            merges: Vec::new(),
        }
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rows in sheet order; rows may have different lengths
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Merge ranges recorded for this sheet
    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }

    /// Number of rows, up to the last row holding a cell or added by `ensure_row`
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row length
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Value at a position, `Empty` when outside the populated grid
    pub fn value_at(&self, row: u32, col: u16) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row as usize)
            .and_then(|r| r.get(usize::from(col)))
            .unwrap_or(&EMPTY)
    }

    /// Store a value, growing the grid as needed
    ///
    /// Storing `Empty` outside the populated grid is a no-op so that blank
    /// styled cells do not stretch the sheet.
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let (r, c) = (row as usize, usize::from(col));
        if value.is_empty() && self.rows.get(r).map_or(true, |cells| c >= cells.len()) {
            return;
        }
        if self.rows.len() <= r {
            self.rows.resize_with(r + 1, Vec::new);
        }
        let cells = &mut self.rows[r];
        if cells.len() <= c {
            cells.resize(c + 1, CellValue::Empty);
        }
        cells[c] = value;
    }

    /// Grow the grid to reach `row` without storing any value
    pub fn ensure_row(&mut self, row: u32) {
        let r = row as usize;
        if self.rows.len() <= r {
            self.rows.resize_with(r + 1, Vec::new);
        }
    }

    /// Record a merge range
    pub fn add_merge(&mut self, range: CellRange) {
        self.merges.push(range);
    }

    /// Replicate each merge range's anchor value into every cell it covers
    ///
    /// Ranges never overlap, so the order they are processed in does not
    /// matter. Cells outside every range keep their value. The merge list
    /// is consumed: a normalized sheet has no merges left.
    pub fn unmerge(&mut self) {
        let merges = std::mem::take(&mut self.merges);
        for range in &merges {
            let anchor = self.value_at(range.start.row, range.start.col).clone();
            self.fill_range(range, &anchor);
        }
        log::debug!(
            "sheet '{}': normalized {} merged ranges",
            self.name,
            merges.len()
        );
    }

    fn fill_range(&mut self, range: &CellRange, value: &CellValue) {
        // Filling with Empty must still overwrite populated cells.
        for CellAddress { row, col } in range.cells() {
            if value.is_empty() {
                if let Some(cell) = self
                    .rows
                    .get_mut(row as usize)
                    .and_then(|r| r.get_mut(usize::from(col)))
                {
                    *cell = CellValue::Empty;
                }
            } else {
                self.set_value(row, col, value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_set_value_grows_grid() {
        let mut sheet = RawSheet::new("S");
        sheet.set_value(2, 3, CellValue::from(1.5));
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.col_count(), 4);
        assert_eq!(sheet.value_at(2, 3), &CellValue::Number(1.5));
        assert_eq!(sheet.value_at(0, 0), &CellValue::Empty);
        assert_eq!(sheet.value_at(40, 40), &CellValue::Empty);
    }

    #[test]
    fn test_blank_outside_grid_is_ignored() {
        let mut sheet = RawSheet::new("S");
        sheet.set_value(5, 5, CellValue::Empty);
        assert_eq!(sheet.row_count(), 0);
    }

    #[test]
    fn test_ensure_row_adds_blank_rows() {
        let mut sheet = RawSheet::new("S");
        sheet.set_value(0, 1, CellValue::from("a"));
        sheet.ensure_row(3);
        assert_eq!(sheet.row_count(), 4);
        assert!(sheet.rows()[3].is_empty());

        // Never shrinks
        sheet.ensure_row(1);
        assert_eq!(sheet.row_count(), 4);
        assert_eq!(sheet.value_at(0, 1), &CellValue::from("a"));
    }

    #[test]
    fn test_unmerge_replicates_anchor() {
        let mut sheet = RawSheet::from_rows(
            "S",
            vec![
                vec![CellValue::from("Region"), CellValue::Empty, CellValue::from("Qty")],
                vec![CellValue::from("North"), CellValue::from("x"), CellValue::from(1)],
                vec![CellValue::Empty, CellValue::from("y"), CellValue::from(2)],
            ],
        );
        sheet.add_merge(CellRange::parse("A1:B1").unwrap());
        sheet.add_merge(CellRange::parse("A2:A4").unwrap());
        sheet.unmerge();

        assert_eq!(sheet.value_at(0, 1), &CellValue::from("Region"));
        assert_eq!(sheet.value_at(1, 0), &CellValue::from("North"));
        assert_eq!(sheet.value_at(2, 0), &CellValue::from("North"));
        // The range reaches past the populated grid.
        assert_eq!(sheet.value_at(3, 0), &CellValue::from("North"));
        assert_eq!(sheet.value_at(2, 1), &CellValue::from("y"));
        assert!(sheet.merges().is_empty());
    }

    #[test]
    fn test_unmerge_with_empty_anchor_clears_range() {
        let mut sheet = RawSheet::from_rows("S", vec![vec![CellValue::Empty, CellValue::from("stale")]]);
        sheet.add_merge(CellRange::parse("A1:B1").unwrap());
        sheet.unmerge();
        assert_eq!(sheet.value_at(0, 1), &CellValue::Empty);
    }

    fn grid_strategy() -> impl Strategy<Value = Vec<Vec<i32>>> {
        (1usize..8, 1usize..8).prop_flat_map(|(rows, cols)| {
            prop::collection::vec(prop::collection::vec(0i32..100, cols), rows)
        })
    }

    proptest! {
        #[test]
        fn prop_unmerge_fills_ranges_and_keeps_the_rest(
            grid in grid_strategy(),
            seeds in prop::collection::vec((0u32..8, 0u16..8, 1u32..4, 1u16..4), 0..6),
        ) {
            let mut sheet = RawSheet::from_rows("S", grid.clone());

            // Keep only non-overlapping ranges, the way a real file stores them.
            let mut ranges: Vec<CellRange> = Vec::new();
            for (r, c, h, w) in seeds {
                let range = CellRange::from_indices(r, c, r + h - 1, c + w - 1);
                if ranges.iter().all(|x| !x.overlaps(&range)) {
                    ranges.push(range);
                }
            }
            for range in &ranges {
                sheet.add_merge(*range);
            }
            let before = sheet.clone();
            sheet.unmerge();

            for range in &ranges {
                let anchor = before.value_at(range.start.row, range.start.col);
                for addr in range.cells() {
                    prop_assert_eq!(sheet.value_at(addr.row, addr.col), anchor);
                }
            }
            for (r, row) in grid.iter().enumerate() {
                for c in 0..row.len() {
                    let addr = CellAddress::new(r as u32, c as u16);
                    if ranges.iter().all(|range| !range.contains(&addr)) {
                        prop_assert_eq!(
                            sheet.value_at(addr.row, addr.col),
                            before.value_at(addr.row, addr.col)
                        );
                    }
                }
            }
        }
    }
}
