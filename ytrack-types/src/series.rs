//! Series identity: which scope a table tracks and over what window.

use core::fmt;
use serde::{Deserialize, Serialize};

/// What a series observes: the whole channel or one video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scope {
    /// A channel, identified by its channel id (`UC...`).
    Channel(String),
    /// A single video, identified by its video id.
    Video(String),
}

impl Scope {
    /// The bare identifier without the scope tag.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Channel(id) | Self::Video(id) => id,
        }
    }

    /// Path segment used by the analytics dashboard for this scope.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Channel(_) => "channel",
            Self::Video(_) => "video",
        }
    }

    /// True for [`Scope::Channel`].
    #[must_use]
    pub const fn is_channel(&self) -> bool {
        matches!(self, Self::Channel(_))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.mode(), self.id())
    }
}

/// The rolling window a series is scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum WindowKind {
    /// The "last 48 hours" latest-activity card; one bucket per hour.
    Hourly,
    /// The explore chart since the video was published.
    SincePublished,
    /// The explore chart restricted to the first day after publishing.
    First24h,
}

impl WindowKind {
    /// Name used as the file prefix and in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hourly => "Hourly",
            Self::SincePublished => "since_published",
            Self::First24h => "first_24h",
        }
    }

    /// Whether a fresh scrape covers the entire window.
    ///
    /// Explore windows are served whole on every scrape, so a newer snapshot
    /// replaces the persisted rows instead of being appended to them.
    #[must_use]
    pub const fn replaces_history(self) -> bool {
        matches!(self, Self::SincePublished | Self::First24h)
    }

    /// Derived columns written between `day` and the dynamic columns.
    #[must_use]
    pub const fn derived_columns(self) -> &'static [&'static str] {
        match self {
            Self::Hourly => &["start", "end"],
            Self::SincePublished | Self::First24h => &["time unit"],
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Logical identity of a persisted series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    /// Channel or video being observed.
    pub scope: Scope,
    /// Window the rows are scraped from.
    pub window: WindowKind,
}

impl SeriesKey {
    /// Hourly series for a channel.
    pub fn hourly_channel(id: impl Into<String>) -> Self {
        Self {
            scope: Scope::Channel(id.into()),
            window: WindowKind::Hourly,
        }
    }

    /// Hourly series for a video.
    pub fn hourly_video(id: impl Into<String>) -> Self {
        Self {
            scope: Scope::Video(id.into()),
            window: WindowKind::Hourly,
        }
    }

    /// Explore series for a video over the given window.
    pub fn explore_video(id: impl Into<String>, window: WindowKind) -> Self {
        Self {
            scope: Scope::Video(id.into()),
            window,
        }
    }

    /// File name of the persisted table, e.g. `Hourly_UCabc.csv`.
    ///
    /// Channel and video ids never collide (channel ids start with `UC` and
    /// are 24 characters long), so the scope tag is not part of the name.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}_{}.csv", self.window.name(), self.scope.id())
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.window, self.scope)
    }
}
