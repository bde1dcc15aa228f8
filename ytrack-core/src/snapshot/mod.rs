//! Snapshot parsing: raw dashboard objects into ordered time buckets.
//!
//! - `label`: the relative bucket-label grammar
//! - `raw`: live values vs captured text, dash normalization
//! - `card`: the latest-activity card behind hourly series
//! - `explore`: the explore deep-dive chart behind since-published series

pub mod card;
pub mod explore;
pub mod label;
mod raw;

pub use raw::RawSnapshot;

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use ytrack_types::{GranularityBounds, SeriesKey, TimestampSource, TrackerConfig, YtrackError};

use crate::frame::{ColumnRegistry, Series, TimeBucket};

/// Knobs the parsers need from the tracker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Zone the dashboard renders labels and "last updated" in.
    pub timezone: Tz,
    /// Where card bucket timestamps come from.
    pub timestamp_source: TimestampSource,
    /// Accepted spacing of explore buckets.
    pub granularity_bounds: GranularityBounds,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::from(&TrackerConfig::default())
    }
}

impl From<&TrackerConfig> for ParseOptions {
    fn from(cfg: &TrackerConfig) -> Self {
        Self {
            timezone: cfg.timezone,
            timestamp_source: cfg.timestamp_source,
            granularity_bounds: cfg.granularity_bounds,
        }
    }
}

/// What a category breakdown attributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    /// A video of the channel; the aggregate is an absolute count.
    Video,
    /// A traffic source of a video; the aggregate is a share of the total.
    TrafficSource,
}

/// One row of a card's breakdown table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// How the aggregate is read and the column named.
    pub kind: CategoryKind,
    /// Display title.
    pub title: String,
    /// Formatted aggregate, e.g. `1,234` or `70.6%`.
    pub value: String,
    /// Per-bucket weights, aligned with the snapshot's buckets.
    pub weights: Vec<Decimal>,
    /// Video id from the structured analytics link, if present.
    pub link_id: Option<String>,
    /// Thumbnail URL, the fallback source of the video id.
    pub thumbnail_url: Option<String>,
}

/// A parsed snapshot: ordered buckets plus the categories still to attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// When the dashboard last refreshed, if it says.
    pub last_updated: Option<DateTime<Utc>>,
    /// Id of the entity the snapshot describes, if it says.
    pub entity_id: Option<String>,
    /// Spacing between buckets.
    pub granularity: TimeDelta,
    /// Columns the buckets have cells for.
    pub columns: ColumnRegistry,
    /// Buckets sorted ascending by timestamp.
    pub buckets: Vec<TimeBucket>,
    /// Breakdowns awaiting attribution.
    pub categories: Vec<Category>,
    /// Formatted total of the card's metric.
    pub total_metric_value: Option<String>,
    /// Non-fatal problems met while parsing, e.g. an unknown traffic source.
    pub warnings: Vec<YtrackError>,
}

impl Snapshot {
    /// Rows ready to merge into the series `key`.
    ///
    /// The last bucket is still in progress and is discarded.
    #[must_use]
    pub fn into_series(self, key: SeriesKey) -> Series {
        let mut rows = self.buckets;
        rows.pop();
        let mut series = Series {
            key,
            granularity: self.granularity,
            columns: self.columns,
            rows,
        };
        series.pad_rows();
        series
    }

    /// Timestamps of the buckets.
    #[must_use]
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.buckets.iter().map(|b| b.ts).collect()
    }
}

/// Parse a raw snapshot for `key` with the parser its window calls for.
///
/// # Errors
/// Returns `MalformedSnapshot` or `UnsupportedGranularity` from the parser.
pub fn parse_snapshot(
    raw: RawSnapshot,
    key: &SeriesKey,
    opts: &ParseOptions,
) -> Result<Snapshot, YtrackError> {
    if key.window.replaces_history() {
        explore::parse_explore(raw, opts)
    } else {
        card::parse_card(raw, &key.scope, opts)
    }
}

/// Bucket start from epoch milliseconds. Floats are accepted only when
/// integral.
pub(crate) fn from_epoch_millis(ms: &serde_json::Number) -> Result<DateTime<Utc>, YtrackError> {
    ms.as_i64()
        .or_else(|| ms.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| YtrackError::malformed(format!("bad epoch timestamp {ms}")))
}
