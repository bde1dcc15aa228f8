use chrono::{DateTime, Utc};

use super::columns::ColumnId;
use super::value::Value;

/// One observed (or synthesized) bucket of a series.
///
/// Cells are indexed by [`ColumnId`]; a cell past the end of `cells` is
/// absent, which is how rows predating a column read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Start of the bucket.
    pub ts: DateTime<Utc>,
    /// Cells in schema order.
    pub cells: Vec<Option<Value>>,
}

impl Row {
    /// Row with no cells.
    #[must_use]
    pub const fn new(ts: DateTime<Utc>) -> Self {
        Self { ts, cells: Vec::new() }
    }

    /// Abbreviated weekday of the bucket start in UTC, e.g. `Mon`.
    #[must_use]
    pub fn weekday(&self) -> String {
        self.ts.format("%a").to_string()
    }

    /// Cell for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ColumnId) -> Option<&Value> {
        self.cells.get(id.index()).and_then(Option::as_ref)
    }

    /// Set the cell for `id`, growing the row as needed.
    pub fn set(&mut self, id: ColumnId, value: Value) {
        let i = id.index();
        if self.cells.len() <= i {
            self.cells.resize(i + 1, None);
        }
        self.cells[i] = Some(value);
    }

    /// Pad with absent cells up to `width`.
    pub fn pad_to(&mut self, width: usize) {
        if self.cells.len() < width {
            self.cells.resize(width, None);
        }
    }

    /// Translate cells into another registry's id space.
    ///
    /// `remap[i]` is the target id for this row's column `i`.
    #[must_use]
    pub fn remapped(self, remap: &[ColumnId], width: usize) -> Self {
        let mut out = Self {
            ts: self.ts,
            cells: vec![None; width],
        };
        for (i, cell) in self.cells.into_iter().enumerate() {
            if let (Some(v), Some(target)) = (cell, remap.get(i)) {
                out.cells[target.index()] = Some(v);
            }
        }
        out
    }
}
