//! Typed row frame: an append-only column registry plus rows that reference
//! cells by column index.

mod columns;
mod row;
mod value;

pub use columns::{ColumnId, ColumnRegistry};
pub use row::Row;
pub use value::{MISSING, Value, decimal_from_json};

use chrono::{DateTime, TimeDelta, Utc};
use ytrack_types::SeriesKey;

/// A single unit of observation inside a snapshot.
pub type TimeBucket = Row;

/// Header of the resolved bucket start, always the first column on disk.
pub const TIME_COLUMN: &str = "datetime(UTC)";
/// Header of the abbreviated weekday, always the second column on disk.
pub const DAY_COLUMN: &str = "day";
/// Relative time since publishing on explore charts.
///
/// Descriptive rather than a metric, so gap placeholders leave it empty.
pub const TIME_DELTA_COLUMN: &str = "time delta";
/// Views column of the latest-activity card.
pub const VIEWS_COLUMN: &str = "views";

const DESCRIPTOR_COLUMNS: &[&str] = &[TIME_DELTA_COLUMN];

/// An identity-keyed, ordered sequence of rows with a growing schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    /// Logical identity of the series.
    pub key: SeriesKey,
    /// Spacing between consecutive buckets.
    pub granularity: TimeDelta,
    /// Dynamic columns in schema order.
    pub columns: ColumnRegistry,
    /// Rows sorted ascending by timestamp.
    pub rows: Vec<Row>,
}

impl Series {
    /// Empty series.
    #[must_use]
    pub fn new(key: SeriesKey, granularity: TimeDelta) -> Self {
        Self {
            key,
            granularity,
            columns: ColumnRegistry::new(),
            rows: Vec::new(),
        }
    }

    /// Timestamp of the first row.
    #[must_use]
    pub fn first_ts(&self) -> Option<DateTime<Utc>> {
        self.rows.first().map(|r| r.ts)
    }

    /// Timestamp of the last row.
    #[must_use]
    pub fn last_ts(&self) -> Option<DateTime<Utc>> {
        self.rows.last().map(|r| r.ts)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the series has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell of `row` under column `name`.
    #[must_use]
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let id = self.columns.get(name)?;
        self.rows.get(row)?.get(id)
    }

    /// Column `name` across all rows.
    pub fn column<'a>(&'a self, name: &str) -> impl Iterator<Item = Option<&'a Value>> + 'a {
        let id = self.columns.get(name);
        self.rows
            .iter()
            .map(move |r| id.and_then(|id| r.get(id)))
    }

    /// Give every row an explicit cell slot for every column.
    pub fn pad_rows(&mut self) {
        let width = self.columns.len();
        for r in &mut self.rows {
            r.pad_to(width);
        }
    }

    /// A synthesized row for a bucket that was never observed.
    ///
    /// Metric columns carry [`Value::Missing`]; descriptor columns stay empty.
    #[must_use]
    pub fn placeholder_row(&self, ts: DateTime<Utc>) -> Row {
        let cells = self
            .columns
            .names()
            .map(|n| {
                if DESCRIPTOR_COLUMNS.contains(&n) {
                    None
                } else {
                    Some(Value::Missing)
                }
            })
            .collect();
        Row { ts, cells }
    }
}
