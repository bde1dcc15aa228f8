use ytrack_types::{SeriesKey, YtrackError};

use crate::snapshot::RawSnapshot;

/// What to fetch: the window of one scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotRequest {
    /// Series the snapshot will be merged into.
    pub key: SeriesKey,
}

impl SnapshotRequest {
    /// Request for `key`.
    #[must_use]
    pub const fn new(key: SeriesKey) -> Self {
        Self { key }
    }
}

/// Produces raw analytics snapshots, live or replayed.
///
/// `fetch` is a pure retry boundary: it must be safe to call again after a
/// failure, and the tracker never retries on its own.
pub trait SnapshotSource: Send + Sync {
    /// A stable identifier used in logs and errors (e.g. "studio", "dumps").
    fn name(&self) -> &'static str;

    /// Fetch one snapshot. Blocks until the page yields one or gives up.
    ///
    /// # Errors
    /// Returns `Source` or `SourceTimeout` when no snapshot could be produced.
    fn fetch(&self, req: &SnapshotRequest) -> Result<RawSnapshot, YtrackError>;
}
