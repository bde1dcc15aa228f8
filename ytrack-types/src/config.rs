//! Configuration types shared by the tracker and the store.

use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::YtrackError;

/// Where a bucket's absolute timestamp comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TimestampSource {
    /// Resolve the human-readable hovercard label ("Yesterday, 1:00 – 2:00 PM")
    /// against the snapshot's last-updated instant.
    #[default]
    Label,
    /// Use the millisecond epoch `x` field of each chart point.
    Epoch,
}

/// Accepted spacing between buckets of an explore chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranularityBounds {
    /// Anything finer is minute data and not a since-published series.
    pub min: Duration,
    /// Anything coarser means the dashboard already switched to daily data.
    pub max: Duration,
}

impl Default for GranularityBounds {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(2 * 60),
            max: Duration::from_secs(2 * 60 * 60),
        }
    }
}

impl GranularityBounds {
    /// True if `seconds` lies within `[min, max]`.
    #[must_use]
    pub fn contains(&self, seconds: i64) -> bool {
        u64::try_from(seconds)
            .is_ok_and(|s| s >= self.min.as_secs() && s <= self.max.as_secs())
    }
}

/// Global configuration for the `Tracker` orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Directory holding one CSV table per series plus the video registry.
    pub data_dir: PathBuf,
    /// Channel whose hourly series anchors every scheduled cycle.
    pub channel_id: String,
    /// Time zone the dashboard renders its labels in.
    pub timezone: Tz,
    /// How bucket timestamps are resolved.
    pub timestamp_source: TimestampSource,
    /// The last N uploads are always tracked hourly (if old enough).
    pub hourly_video_count: usize,
    /// Videos younger than this are left to the since-published series,
    /// which is more precise while the dashboard still offers it.
    pub min_video_age_days: u32,
    /// Accepted explore chart spacing.
    pub granularity_bounds: GranularityBounds,
    /// File name of the video registry inside `data_dir`.
    pub registry_file: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            channel_id: String::new(),
            timezone: Tz::UTC,
            timestamp_source: TimestampSource::default(),
            hourly_video_count: 2,
            min_video_age_days: 30,
            granularity_bounds: GranularityBounds::default(),
            registry_file: "video_log.csv".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Parse a JSON document; missing fields fall back to defaults.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the document is not valid JSON for this shape
    /// or fails [`validate`](Self::validate).
    pub fn from_json_str(s: &str) -> Result<Self, YtrackError> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| YtrackError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field invariants.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the channel id is blank, the registry file
    /// name is blank, or the granularity bounds are inverted.
    pub fn validate(&self) -> Result<(), YtrackError> {
        if self.channel_id.trim().is_empty() {
            return Err(YtrackError::InvalidConfig("channel_id is required".into()));
        }
        if self.registry_file.trim().is_empty() {
            return Err(YtrackError::InvalidConfig(
                "registry_file must not be empty".into(),
            ));
        }
        if self.granularity_bounds.min > self.granularity_bounds.max {
            return Err(YtrackError::InvalidConfig(format!(
                "granularity bounds inverted: min={:?} max={:?}",
                self.granularity_bounds.min, self.granularity_bounds.max
            )));
        }
        Ok(())
    }

    /// Full path of the video registry table.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(&self.registry_file)
    }
}
