pub mod dump;
pub mod schedule;

use crate::Tracker;
use ytrack_core::{
    ParseOptions, RawSnapshot, SnapshotRequest, attribute, merge_series, parse_snapshot,
};
use ytrack_types::{CycleReport, SeriesKey, SeriesReport, YtrackError};

impl Tracker {
    /// Fetch one snapshot for `key` and merge it into the persisted series.
    ///
    /// # Errors
    /// Returns the source error if no snapshot could be fetched, otherwise
    /// the same errors as [`ingest`](Self::ingest).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "ytrack::tracker",
            skip(self),
            fields(key = %key, source = self.source.name()),
        )
    )]
    pub fn run_series(&self, key: &SeriesKey) -> Result<SeriesReport, YtrackError> {
        let raw = self.source.fetch(&SnapshotRequest::new(key.clone()))?;
        self.ingest(key, raw)
    }

    /// Parse, attribute, reconcile and persist one raw snapshot for `key`.
    ///
    /// Categories that fail to attribute are reported and skipped; the rest
    /// of the snapshot is kept. A merge that adds nothing leaves the
    /// persisted table untouched.
    ///
    /// # Errors
    /// - `MalformedSnapshot` / `UnsupportedGranularity` if the snapshot
    ///   cannot be parsed.
    /// - `IdentityMismatch` if the snapshot names another entity than `key`.
    /// - `UnsortedInput` / `CorruptSeries` / `Io` from reconciliation and
    ///   persistence. The persisted table stays at its last good version.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "ytrack::tracker", skip(self, raw), fields(key = %key))
    )]
    pub fn ingest(&self, key: &SeriesKey, raw: RawSnapshot) -> Result<SeriesReport, YtrackError> {
        let opts = ParseOptions::from(&self.cfg);
        let mut snapshot = parse_snapshot(raw, key, &opts)?;
        if let Some(entity) = snapshot
            .entity_id
            .as_deref()
            .filter(|id| *id != key.scope.id())
        {
            return Err(YtrackError::identity_mismatch(key.scope.id(), entity));
        }

        let outcome = attribute(&mut snapshot);
        let mut category_failures = std::mem::take(&mut snapshot.warnings);
        #[cfg(feature = "tracing")]
        for w in &category_failures {
            tracing::warn!(key = %key, error = %w, "skipped series of snapshot");
        }
        category_failures.extend(outcome.failures);

        let incoming = snapshot.into_series(key.clone());
        let prior = self.store.load(key)?;
        #[cfg(feature = "tracing")]
        if prior.is_none() {
            tracing::info!(key = %key, "making new series");
        }

        let (merged, merge) = merge_series(prior, incoming)?;
        let stored = if merge.is_noop() {
            #[cfg(feature = "tracing")]
            tracing::info!(key = %key, skipped = merge.skipped, "no new rows to add");
            false
        } else {
            self.store.store(&merged)?;
            #[cfg(feature = "tracing")]
            tracing::info!(
                key = %key,
                appended = merge.appended,
                placeholders = merge.placeholders,
                "written {} rows",
                merge.appended + merge.placeholders
            );
            true
        };

        Ok(SeriesReport {
            key: key.clone(),
            merge,
            attributed_columns: outcome.attributed,
            category_failures,
            stored,
        })
    }

    /// Run [`run_series`](Self::run_series) for each key in order.
    ///
    /// A failing series is recorded and skipped; it never prevents the
    /// remaining series from being committed.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "ytrack::tracker", skip(self, keys), fields(n = keys.len()))
    )]
    pub fn run_cycle(&self, keys: &[SeriesKey]) -> CycleReport {
        let mut report = CycleReport::default();
        for key in keys {
            match self.run_series(key) {
                Ok(r) => report.completed.push(r),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(key = %key, error = %e, "series skipped this cycle");
                    report.failed.push((key.clone(), e));
                }
            }
        }
        report
    }
}
