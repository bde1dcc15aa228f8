//! Replaying captured snapshot dumps.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use ytrack_core::{RawSnapshot, SnapshotRequest, SnapshotSource};
use ytrack_types::{CycleReport, SeriesKey, YtrackError};

use crate::Tracker;

const NAME: &str = "dumps";

/// Snapshot source over a directory of captured text dumps.
///
/// Files whose name contains `stem` are served one per fetch, in file name
/// order. Once every file has been served, fetches fail with `NotFound`.
#[derive(Debug)]
pub struct DumpDirectory {
    files: Mutex<std::vec::IntoIter<PathBuf>>,
}

impl DumpDirectory {
    /// Collect the dumps in `dir` whose file name contains `stem`.
    ///
    /// # Errors
    /// Returns `Io` if the directory cannot be listed.
    pub fn open(dir: &Path, stem: &str) -> Result<Self, YtrackError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| YtrackError::io(dir, e))? {
            let path = entry.map_err(|e| YtrackError::io(dir, e))?.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains(stem));
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(Self {
            files: Mutex::new(files.into_iter()),
        })
    }

    /// Dumps not served yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl SnapshotSource for DumpDirectory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fetch(&self, req: &SnapshotRequest) -> Result<RawSnapshot, YtrackError> {
        let next = self
            .files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next()
            .ok_or_else(|| YtrackError::not_found(format!("dump for {}", req.key)))?;
        let text = fs::read_to_string(&next).map_err(|e| YtrackError::io(&next, e))?;
        Ok(RawSnapshot::Text(text))
    }
}

impl Tracker {
    /// Merge every dump in `dir` whose name contains `stem` into `key`, in
    /// file name order, as if each had been scraped in turn.
    ///
    /// Uses this tracker's store and configuration; its own source is not
    /// consulted. A dump that fails is recorded and the next one is still
    /// replayed.
    ///
    /// # Errors
    /// Returns `Io` if the directory cannot be listed.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "ytrack::tracker", skip(self, dir), fields(key = %key))
    )]
    pub fn ingest_dumps(
        &self,
        key: &SeriesKey,
        dir: &Path,
        stem: &str,
    ) -> Result<CycleReport, YtrackError> {
        let dumps = DumpDirectory::open(dir, stem)?;
        let req = SnapshotRequest::new(key.clone());
        let mut report = CycleReport::default();
        while dumps.remaining() > 0 {
            match dumps.fetch(&req).and_then(|raw| self.ingest(key, raw)) {
                Ok(r) => report.completed.push(r),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(key = %key, error = %e, "skipped dump");
                    report.failed.push((key.clone(), e));
                }
            }
        }
        Ok(report)
    }
}
