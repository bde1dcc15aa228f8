//! ytrack keeps incremental time series of YouTube channel and video
//! analytics.
//!
//! Overview
//! - A [`SnapshotSource`] produces raw dashboard snapshots: the
//!   latest-activity card behind hourly series, or the explore chart behind
//!   since-published and first-24h series.
//! - [`Tracker`] runs parse → attribute → reconcile → persist for each
//!   series, one at a time, and isolates failures per series.
//! - Series are persisted through a [`SeriesStore`]; by default one CSV table
//!   per series under the configured data directory.
//! - [`VideoRegistry`] lists the channel's uploads and decides, together with
//!   [`select_hourly_videos`], which videos an hourly cycle covers.
//!
//! Key behaviors
//! - Hourly series only ever grow: rows already persisted are never
//!   rewritten, a gap since the last scrape is filled with placeholder rows,
//!   and columns are only ever added.
//! - Explore series are served whole on every scrape, so a longer window
//!   replaces the persisted one; a shorter one is ignored.
//! - The last bucket of every snapshot is still in progress and is dropped.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use ytrack::{Tracker, SeriesKey};
//!
//! let tracker = Tracker::builder()
//!     .with_source(Arc::new(my_source))
//!     .data_dir("data")
//!     .channel_id("UCxxxxxxxxxxxxxxxxxxxxxx")
//!     .timezone(chrono_tz::Europe::Berlin)
//!     .build()?;
//!
//! let registry = tracker.registry();
//! let report = tracker.run_hourly_cycle(&registry, chrono::Utc::now())?;
//! for (key, err) in &report.failed {
//!     eprintln!("{key}: {err}");
//! }
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
mod registry;
mod tracker;

pub use core::{Tracker, TrackerBuilder};
pub use registry::VideoRegistry;
pub use tracker::dump::DumpDirectory;
pub use tracker::schedule::select_hourly_videos;

pub use ytrack_core::{
    AttributionOutcome, ColumnRegistry, CsvStore, MISSING, ParseOptions, RawSnapshot, Row,
    Series, SeriesStore, Snapshot, SnapshotRequest, SnapshotSource, Value, attribute,
    merge_series, parse_snapshot, reconcile, replace,
};
pub use ytrack_types::{
    CycleReport, GranularityBounds, MergeReport, Scope, SeriesKey, SeriesReport,
    TimestampSource, TrackerConfig, VideoEntry, VideoFlags, WindowKind, YtrackError,
};

/// Install a `fmt` subscriber filtered by `filter` (e.g. `"ytrack=info"`).
///
/// Meant for driver binaries; the library never installs one itself. Does
/// nothing if a global subscriber is already set.
#[cfg(feature = "tracing")]
pub fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_target(false)
        .try_init();
}
