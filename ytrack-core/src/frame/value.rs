use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Marker written for buckets that were never observed.
pub const MISSING: &str = "missing";

/// A single cell of a series row.
///
/// Absent cells are `None` at the row level; `Missing` is an explicit marker
/// for synthesized gap rows and survives a round trip through storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Integral metric, e.g. views.
    Int(i64),
    /// Fractional metric, e.g. watch time in hours.
    Num(Decimal),
    /// Free text, e.g. a relative time label.
    Text(String),
    /// The bucket was not observed.
    Missing,
}

impl Value {
    /// Parse a stored cell. Empty cells are absent.
    #[must_use]
    pub fn parse_cell(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        if raw == MISSING {
            return Some(Self::Missing);
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Some(Self::Int(i));
        }
        if let Ok(d) = Decimal::from_str(raw) {
            return Some(Self::Num(d));
        }
        Some(Self::Text(raw.to_string()))
    }

    /// Convert a JSON number, keeping integers integral.
    #[must_use]
    pub fn from_json_number(n: &serde_json::Number) -> Option<Self> {
        if let Some(i) = n.as_i64() {
            return Some(Self::Int(i));
        }
        decimal_from_json(n).map(Self::Num)
    }

    /// True for [`Value::Missing`].
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Integer view of numeric cells.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Num(d) if d.fract().is_zero() => i64::try_from(*d).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Num(d) => write!(f, "{d}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => f.write_str(MISSING),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Num(d)
    }
}

/// Exact decimal for a JSON number.
///
/// Goes through the shortest round-trip text form so `0.1` stays `0.1`
/// instead of picking up binary floating point noise.
#[must_use]
pub fn decimal_from_json(n: &serde_json::Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    let s = n.to_string();
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
}
