//! ytrack-specific data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod config;
mod error;
mod reports;
mod series;
mod video;

pub use config::{GranularityBounds, TimestampSource, TrackerConfig};
pub use error::YtrackError;
pub use reports::{CycleReport, MergeReport, SeriesReport};
pub use series::{Scope, SeriesKey, WindowKind};
pub use video::{VideoEntry, VideoFlags};
