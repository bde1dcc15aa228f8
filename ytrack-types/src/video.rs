//! Video registry entries.

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Per-video tracking flags stored in the registry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct VideoFlags: u8 {
        /// The video is still within the window where hourly data is offered.
        const RECENT = 1 << 0;
        /// The upload time is exact to the minute rather than inferred from
        /// the first chart bucket.
        const PRECISE_UPLOAD = 1 << 1;
    }
}

impl Default for VideoFlags {
    fn default() -> Self {
        Self::RECENT
    }
}

/// One row of the video registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    /// Video id.
    pub id: String,
    /// Upload instant.
    pub uploaded: DateTime<Utc>,
    /// Title at the time the video was registered.
    pub title: String,
    /// Tracking flags.
    pub flags: VideoFlags,
}

impl VideoEntry {
    /// New entry flagged as recent.
    pub fn new(id: impl Into<String>, uploaded: DateTime<Utc>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uploaded,
            title: title.into(),
            flags: VideoFlags::default(),
        }
    }

    /// Builder-style flag override.
    #[must_use]
    pub const fn with_flags(mut self, flags: VideoFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Still eligible for since-published hourly data.
    #[must_use]
    pub const fn is_recent(&self) -> bool {
        self.flags.contains(VideoFlags::RECENT)
    }

    /// Upload time known to the minute.
    #[must_use]
    pub const fn is_precise(&self) -> bool {
        self.flags.contains(VideoFlags::PRECISE_UPLOAD)
    }
}
