use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the ytrack workspace.
///
/// Payloads are plain strings so errors can be cloned into reports and
/// compared in tests. Variants group into three families:
/// - per-snapshot: [`MalformedSnapshot`](Self::MalformedSnapshot),
///   [`UnsupportedGranularity`](Self::UnsupportedGranularity)
/// - per-category: [`DivisionByZero`](Self::DivisionByZero),
///   [`UnresolvableCategory`](Self::UnresolvableCategory),
///   [`ColumnNameCollision`](Self::ColumnNameCollision)
/// - per-series: everything else (caller errors, persistence, transport).
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum YtrackError {
    /// The raw snapshot lacks required fields or carries an unparseable label.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Bucket spacing of a snapshot is outside the accepted bounds.
    #[error("unsupported granularity: {seconds}s between buckets")]
    UnsupportedGranularity {
        /// Observed step between consecutive buckets, in seconds.
        seconds: i64,
    },

    /// A category's weights sum to zero, so its aggregate cannot be distributed.
    #[error("division by zero attributing category {category}")]
    DivisionByZero {
        /// Column name (or best-effort label) of the failing category.
        category: String,
    },

    /// Neither the structured link nor the thumbnail URL yielded an identifier.
    #[error("unresolvable category: {0}")]
    UnresolvableCategory(String),

    /// Two columns resolved to the same name within one snapshot.
    #[error("column name collision: {column}")]
    ColumnNameCollision {
        /// The contested column name.
        column: String,
    },

    /// Incoming rows are not strictly ascending by timestamp.
    #[error("unsorted input: {0}")]
    UnsortedInput(String),

    /// Incoming rows belong to a different series than the persisted one.
    #[error("identity mismatch: expected {expected}, got {actual}")]
    IdentityMismatch {
        /// Identity of the persisted series.
        expected: String,
        /// Identity carried by the incoming rows.
        actual: String,
    },

    /// A persisted table exists but cannot be read back as a series.
    #[error("corrupt series {path}: {msg}")]
    CorruptSeries {
        /// Location of the table.
        path: String,
        /// What was wrong with it.
        msg: String,
    },

    /// Filesystem failure while loading or storing.
    #[error("io error at {path}: {msg}")]
    Io {
        /// Location being read or written.
        path: String,
        /// Underlying error message.
        msg: String,
    },

    /// The snapshot source failed to produce a snapshot.
    #[error("{source_name} failed: {msg}")]
    Source {
        /// Name of the snapshot source.
        source_name: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The snapshot source gave up waiting for the page.
    #[error("source timed out: {source_name} after {waited_ms}ms")]
    SourceTimeout {
        /// Name of the snapshot source.
        source_name: String,
        /// How long the source waited before giving up.
        waited_ms: u64,
    },

    /// Configuration rejected at build time.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A requested entity does not exist.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing entity, e.g. "video abc in registry".
        what: String,
    },
}

impl YtrackError {
    /// Helper: build a `MalformedSnapshot` error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedSnapshot(msg.into())
    }

    /// Helper: build an `Io` error from a path and any displayable cause.
    pub fn io(path: impl AsRef<std::path::Path>, err: impl core::fmt::Display) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            msg: err.to_string(),
        }
    }

    /// Helper: build a `CorruptSeries` error.
    pub fn corrupt(path: impl AsRef<std::path::Path>, msg: impl Into<String>) -> Self {
        Self::CorruptSeries {
            path: path.as_ref().display().to_string(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Source` error tagged with the source name.
    pub fn source(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build an `IdentityMismatch` from two displayable identities.
    pub fn identity_mismatch(
        expected: impl core::fmt::Display,
        actual: impl core::fmt::Display,
    ) -> Self {
        Self::IdentityMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Returns true when the failure only affects one attribution category.
    #[must_use]
    pub const fn is_per_category(&self) -> bool {
        matches!(
            self,
            Self::DivisionByZero { .. }
                | Self::UnresolvableCategory(_)
                | Self::ColumnNameCollision { .. }
        )
    }

    /// Returns true if this error indicates a caller bug rather than bad data.
    ///
    /// Caller errors must never be coerced away: the rows are rejected as-is.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::UnsortedInput(_) | Self::IdentityMismatch { .. } | Self::InvalidConfig(_)
        )
    }

    /// Returns true if this error should be surfaced to users as actionable.
    ///
    /// Transport timeouts are expected while the dashboard is flaky.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(self, Self::SourceTimeout { .. })
    }
}

impl From<serde_json::Error> for YtrackError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedSnapshot(e.to_string())
    }
}
