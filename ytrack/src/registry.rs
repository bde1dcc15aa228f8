//! The video registry: one row per uploaded video of the tracked channel.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ytrack_core::write_atomic;
use ytrack_types::{VideoEntry, VideoFlags, YtrackError};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
const HEADER: [&str; 5] = ["date", "id", "title", "recent", "precise"];

#[derive(Debug, Serialize, Deserialize)]
struct RegistryRow {
    date: String,
    id: String,
    title: String,
    recent: u8,
    precise: u8,
}

impl From<&VideoEntry> for RegistryRow {
    fn from(v: &VideoEntry) -> Self {
        Self {
            date: v.uploaded.format(DATE_FORMAT).to_string(),
            id: v.id.clone(),
            title: v.title.clone(),
            recent: u8::from(v.is_recent()),
            precise: u8::from(v.is_precise()),
        }
    }
}

impl RegistryRow {
    fn into_entry(self, path: &Path) -> Result<VideoEntry, YtrackError> {
        let naive = NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT).map_err(|e| {
            let msg = format!("bad upload date '{}' for {}: {e}", self.date, self.id);
            YtrackError::corrupt(path, msg)
        })?;
        let mut flags = VideoFlags::empty();
        flags.set(VideoFlags::RECENT, self.recent != 0);
        flags.set(VideoFlags::PRECISE_UPLOAD, self.precise != 0);
        Ok(VideoEntry::new(self.id, Utc.from_utc_datetime(&naive), self.title).with_flags(flags))
    }
}

/// Video registry table, kept sorted by upload date.
///
/// A missing file reads as an empty registry. Every change rewrites the
/// whole table atomically.
#[derive(Debug, Clone)]
pub struct VideoRegistry {
    path: PathBuf,
}

impl VideoRegistry {
    /// Registry stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the table.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, oldest upload first.
    ///
    /// # Errors
    /// Returns `CorruptSeries` if a row cannot be read, or `Io` on
    /// filesystem failure.
    pub fn load(&self) -> Result<Vec<VideoEntry>, YtrackError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| YtrackError::io(&self.path, e))?;
        let mut entries = Vec::new();
        for row in reader.deserialize::<RegistryRow>() {
            let row = row.map_err(|e| YtrackError::corrupt(&self.path, e.to_string()))?;
            entries.push(row.into_entry(&self.path)?);
        }
        entries.sort_by(|a, b| a.uploaded.cmp(&b.uploaded));
        Ok(entries)
    }

    /// Entries, optionally only those still flagged recent.
    ///
    /// # Errors
    /// Same as [`load`](Self::load).
    pub fn list(&self, recent_only: bool) -> Result<Vec<VideoEntry>, YtrackError> {
        let mut entries = self.load()?;
        if recent_only {
            entries.retain(VideoEntry::is_recent);
        }
        Ok(entries)
    }

    /// Whether `id` is registered.
    ///
    /// # Errors
    /// Same as [`load`](Self::load).
    pub fn contains(&self, id: &str) -> Result<bool, YtrackError> {
        Ok(self.load()?.iter().any(|v| v.id == id))
    }

    /// Insert `entry`, replacing any entry with the same id.
    ///
    /// # Errors
    /// Returns `Io` if the table could not be rewritten; the previous table
    /// is left intact.
    pub fn upsert(&self, entry: VideoEntry) -> Result<(), YtrackError> {
        let mut entries = self.load()?;
        entries.retain(|v| v.id != entry.id);
        entries.push(entry);
        entries.sort_by(|a, b| a.uploaded.cmp(&b.uploaded));
        self.write(&entries)
    }

    /// Clear the recent flag of `id`.
    ///
    /// # Errors
    /// Returns `NotFound` if `id` is not registered, or `Io` if the table
    /// could not be rewritten.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn mark_not_recent(&self, id: &str) -> Result<(), YtrackError> {
        let mut entries = self.load()?;
        let entry = entries
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| YtrackError::not_found(format!("video {id} in registry")))?;
        entry.flags.remove(VideoFlags::RECENT);
        #[cfg(feature = "tracing")]
        tracing::info!(video = id, "no longer recent");
        self.write(&entries)
    }

    fn write(&self, entries: &[VideoEntry]) -> Result<(), YtrackError> {
        write_atomic(&self.path, |file: &mut File| {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            writer
                .write_record(HEADER)
                .map_err(|e| YtrackError::io(&self.path, e))?;
            for entry in entries {
                writer
                    .serialize(RegistryRow::from(entry))
                    .map_err(|e| YtrackError::io(&self.path, e))?;
            }
            writer.flush().map_err(|e| YtrackError::io(&self.path, e))
        })
    }
}
