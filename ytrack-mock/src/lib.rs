//! Deterministic collaborators for ytrack tests and demos.
//!
//! - [`MockSource`]: serves scripted raw snapshots per series.
//! - [`MemoryStore`]: keeps series in memory and can be told to fail writes.
//! - [`CardBuilder`] / [`ExploreBuilder`]: render dashboard payloads.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ytrack_core::{
    RawSnapshot, Series, SeriesKey, SeriesStore, SnapshotRequest, SnapshotSource, YtrackError,
};

mod fixtures;

pub use fixtures::card::CardBuilder;
pub use fixtures::explore::ExploreBuilder;

const NAME: &str = "ytrack-mock";

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What the mock source does on the next fetch of a series.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Serve this snapshot.
    Return(RawSnapshot),
    /// Fail with this error.
    Fail(YtrackError),
}

/// Snapshot source with scripted per-series behaviors.
///
/// Each fetch pops the next scripted behavior for the series; the last one is
/// sticky so repeated cycles keep seeing it. Scope ids `FAIL` and `TIMEOUT`
/// always fail, with a source error and a timeout respectively. Unscripted
/// series fail with `NotFound`.
#[derive(Debug, Default)]
pub struct MockSource {
    script: Mutex<HashMap<SeriesKey, VecDeque<MockBehavior>>>,
    fetched: Mutex<Vec<SeriesKey>>,
}

impl MockSource {
    /// Source with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot for `key`.
    #[must_use]
    pub fn with_snapshot(self, key: SeriesKey, raw: impl Into<RawSnapshot>) -> Self {
        self.push(key, MockBehavior::Return(raw.into()));
        self
    }

    /// Queue a failure for `key`.
    #[must_use]
    pub fn with_failure(self, key: SeriesKey, err: YtrackError) -> Self {
        self.push(key, MockBehavior::Fail(err));
        self
    }

    /// Queue a behavior for `key` on a shared source.
    pub fn push(&self, key: SeriesKey, behavior: MockBehavior) {
        lock(&self.script).entry(key).or_default().push_back(behavior);
    }

    /// Every series fetched so far, in order.
    #[must_use]
    pub fn fetched(&self) -> Vec<SeriesKey> {
        lock(&self.fetched).clone()
    }
}

impl SnapshotSource for MockSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fetch(&self, req: &SnapshotRequest) -> Result<RawSnapshot, YtrackError> {
        lock(&self.fetched).push(req.key.clone());
        match req.key.scope.id() {
            "FAIL" => return Err(YtrackError::source(NAME, "forced failure")),
            "TIMEOUT" => {
                return Err(YtrackError::SourceTimeout {
                    source_name: NAME.to_string(),
                    waited_ms: 10_000,
                });
            }
            _ => {}
        }
        let mut script = lock(&self.script);
        let queue = script
            .get_mut(&req.key)
            .ok_or_else(|| YtrackError::not_found(format!("snapshot for {}", req.key)))?;
        let behavior = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        match behavior {
            Some(MockBehavior::Return(raw)) => Ok(raw),
            Some(MockBehavior::Fail(e)) => Err(e),
            None => Err(YtrackError::not_found(format!("snapshot for {}", req.key))),
        }
    }
}

/// In-memory [`SeriesStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    series: Mutex<HashMap<SeriesKey, Series>>,
    failing: Mutex<HashSet<SeriesKey>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a persisted series.
    #[must_use]
    pub fn with_series(self, series: Series) -> Self {
        lock(&self.series).insert(series.key.clone(), series);
        self
    }

    /// Make every store of `key` fail with an I/O error.
    pub fn fail_writes_for(&self, key: SeriesKey) {
        lock(&self.failing).insert(key);
    }

    /// Current series for `key`.
    #[must_use]
    pub fn get(&self, key: &SeriesKey) -> Option<Series> {
        lock(&self.series).get(key).cloned()
    }

    /// Number of successful stores.
    #[must_use]
    pub fn writes(&self) -> usize {
        *lock(&self.writes)
    }
}

impl SeriesStore for MemoryStore {
    fn load(&self, key: &SeriesKey) -> Result<Option<Series>, YtrackError> {
        Ok(self.get(key))
    }

    fn store(&self, series: &Series) -> Result<(), YtrackError> {
        if lock(&self.failing).contains(&series.key) {
            return Err(YtrackError::io(series.key.file_name(), "simulated write failure"));
        }
        lock(&self.series).insert(series.key.clone(), series.clone());
        *lock(&self.writes) += 1;
        Ok(())
    }
}
