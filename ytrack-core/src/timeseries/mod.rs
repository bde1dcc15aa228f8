//! Time-series utilities: cadence inference and the series reconciler.
//!
//! - `infer`: estimate bucket cadence and validate spacing/ordering
//! - `reconcile`: merge incoming rows into a persisted series

/// Cadence inference and ordering checks.
pub mod infer;
/// Incremental reconciliation and whole-window replacement.
pub mod reconcile;
