use std::path::PathBuf;
use std::sync::Arc;

use chrono_tz::Tz;
use ytrack_core::{CsvStore, SeriesStore, SnapshotSource};
use ytrack_types::{GranularityBounds, TimestampSource, TrackerConfig, YtrackError};

use crate::registry::VideoRegistry;

/// Runs parse → attribute → reconcile → store for series fed by one source.
pub struct Tracker {
    pub(crate) source: Arc<dyn SnapshotSource>,
    pub(crate) store: Arc<dyn SeriesStore>,
    pub(crate) cfg: TrackerConfig,
}

/// Builder for constructing a [`Tracker`].
pub struct TrackerBuilder {
    source: Option<Arc<dyn SnapshotSource>>,
    store: Option<Arc<dyn SeriesStore>>,
    cfg: TrackerConfig,
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerBuilder {
    /// Builder with default configuration, no source and no store.
    ///
    /// A source is required. Without an explicit store, series are kept as
    /// CSV tables under the configured data directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            store: None,
            cfg: TrackerConfig::default(),
        }
    }

    /// Set the snapshot source.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn SnapshotSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the series store, replacing the default CSV store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn SeriesStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: TrackerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Directory holding series tables and the video registry.
    #[must_use]
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cfg.data_dir = dir.into();
        self
    }

    /// Channel whose hourly series anchors each cycle.
    #[must_use]
    pub fn channel_id(mut self, id: impl Into<String>) -> Self {
        self.cfg.channel_id = id.into();
        self
    }

    /// Zone the dashboard renders labels in.
    #[must_use]
    pub const fn timezone(mut self, tz: Tz) -> Self {
        self.cfg.timezone = tz;
        self
    }

    /// Where card bucket timestamps come from.
    #[must_use]
    pub const fn timestamp_source(mut self, source: TimestampSource) -> Self {
        self.cfg.timestamp_source = source;
        self
    }

    /// Number of latest uploads always tracked hourly.
    #[must_use]
    pub const fn hourly_video_count(mut self, n: usize) -> Self {
        self.cfg.hourly_video_count = n;
        self
    }

    /// Minimum age before a video is tracked hourly.
    #[must_use]
    pub const fn min_video_age_days(mut self, days: u32) -> Self {
        self.cfg.min_video_age_days = days;
        self
    }

    /// Accepted explore chart spacing.
    #[must_use]
    pub const fn granularity_bounds(mut self, bounds: GranularityBounds) -> Self {
        self.cfg.granularity_bounds = bounds;
        self
    }

    /// File name of the video registry inside the data directory.
    #[must_use]
    pub fn registry_file(mut self, name: impl Into<String>) -> Self {
        self.cfg.registry_file = name.into();
        self
    }

    /// Build the tracker.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if no source was set or the configuration
    /// fails validation.
    pub fn build(self) -> Result<Tracker, YtrackError> {
        self.cfg.validate()?;
        let source = self
            .source
            .ok_or_else(|| YtrackError::InvalidConfig("no snapshot source registered".into()))?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(CsvStore::new(self.cfg.data_dir.clone())));
        Ok(Tracker {
            source,
            store,
            cfg: self.cfg,
        })
    }
}

impl Tracker {
    /// Start building a new tracker.
    #[must_use]
    pub fn builder() -> TrackerBuilder {
        TrackerBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.cfg
    }

    /// The video registry under the configured data directory.
    #[must_use]
    pub fn registry(&self) -> VideoRegistry {
        VideoRegistry::new(self.cfg.registry_path())
    }
}
