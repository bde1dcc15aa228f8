//! ytrack-core
//!
//! Core algorithms for tracking channel and video analytics as time series.
//!
//! - `snapshot`: parse raw dashboard snapshots into ordered time buckets.
//! - `attribution`: distribute category aggregates across buckets.
//! - `frame`: the column registry and typed rows a series is made of.
//! - `timeseries`: cadence inference and the incremental reconciler.
//! - `store`: the `SeriesStore` trait and its CSV implementation.
//! - `source`: the `SnapshotSource` collaborator trait.
//!
//! Everything here is synchronous; one series is processed as
//! parse → attribute → reconcile → store.
#![warn(missing_docs)]

/// Category attribution.
pub mod attribution;
/// Typed rows over an append-only column registry.
pub mod frame;
/// Snapshot parsers.
pub mod snapshot;
/// Snapshot source trait.
pub mod source;
/// Series persistence.
pub mod store;
/// Time-series utilities.
pub mod timeseries;

pub use attribution::{AttributionOutcome, attribute, distribute};
pub use frame::{ColumnId, ColumnRegistry, MISSING, Row, Series, TimeBucket, Value};
pub use snapshot::{ParseOptions, RawSnapshot, Snapshot, parse_snapshot};
pub use source::{SnapshotRequest, SnapshotSource};
pub use store::{CsvStore, SeriesStore, write_atomic};
pub use timeseries::infer::{check_spacing, estimate_step_seconds};
pub use timeseries::reconcile::{merge_series, reconcile, replace};
pub use ytrack_types::*;
