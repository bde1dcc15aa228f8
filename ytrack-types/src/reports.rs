//! Report envelopes produced by the reconciler and the tracker.

use serde::{Deserialize, Serialize};

use crate::error::YtrackError;
use crate::series::SeriesKey;

/// What a single reconciliation did to a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// No prior series existed; this merge created it.
    pub created: bool,
    /// Incoming rows that made it into the series.
    pub appended: usize,
    /// Synthesized rows marking buckets that were never observed.
    pub placeholders: usize,
    /// Incoming rows dropped because they duplicated persisted buckets.
    pub skipped: usize,
    /// Columns the series did not have before this merge, in schema order.
    pub new_columns: Vec<String>,
    /// The persisted rows were replaced by a complete newer window.
    pub replaced: bool,
}

impl MergeReport {
    /// True if no rows were added or replaced.
    ///
    /// A no-op merge leaves the persisted table untouched, even if the
    /// incoming rows mentioned columns the table does not have yet.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.appended == 0 && self.placeholders == 0 && !self.replaced
    }
}

/// Outcome of one parse → attribute → reconcile → persist pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesReport {
    /// Series that was processed.
    pub key: SeriesKey,
    /// What the reconciler did.
    pub merge: MergeReport,
    /// Columns attributed from the snapshot's category breakdown, in order.
    pub attributed_columns: Vec<String>,
    /// Categories that could not be attributed; the rest of the snapshot was kept.
    pub category_failures: Vec<YtrackError>,
    /// Whether the table on disk was rewritten.
    pub stored: bool,
}

impl SeriesReport {
    /// True if any category of the snapshot failed to attribute.
    #[must_use]
    pub fn had_warnings(&self) -> bool {
        !self.category_failures.is_empty()
    }
}

/// Summary of a scheduled run across several series.
///
/// Failures are isolated per identity: one failing series never prevents
/// the others from being committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Series that completed (possibly as a no-op).
    pub completed: Vec<SeriesReport>,
    /// Series that were skipped this cycle, with the reason.
    pub failed: Vec<(SeriesKey, YtrackError)>,
}

impl CycleReport {
    /// True when every series completed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total rows appended across all completed series.
    #[must_use]
    pub fn rows_appended(&self) -> usize {
        self.completed.iter().map(|r| r.merge.appended).sum()
    }

    /// Report for a given key, if it completed.
    #[must_use]
    pub fn report_for(&self, key: &SeriesKey) -> Option<&SeriesReport> {
        self.completed.iter().find(|r| &r.key == key)
    }

    /// Merge another cycle's results into this one.
    pub fn extend(&mut self, other: Self) {
        self.completed.extend(other.completed);
        self.failed.extend(other.failed);
    }
}
