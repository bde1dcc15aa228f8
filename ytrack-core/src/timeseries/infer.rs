use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use ytrack_types::YtrackError;

/// Representative spacing of a series, in seconds.
///
/// The most frequent gap between distinct timestamps wins. When several gaps
/// are equally frequent, the lower median of all gaps is used instead.
///
/// ```
/// use chrono::{DateTime, Utc};
/// use ytrack_core::estimate_step_seconds;
///
/// fn t(sec: i64) -> DateTime<Utc> { DateTime::from_timestamp(sec, 0).unwrap() }
///
/// // one missed hour does not change the cadence
/// let ts = vec![t(7200), t(0), t(3600), t(14400), t(18000)];
/// assert_eq!(estimate_step_seconds(&ts), Some(3600));
///
/// // gaps 1800,1800,3600,3600 tie; the lower median is 1800
/// let ts = vec![t(0), t(1800), t(3600), t(7200), t(10800)];
/// assert_eq!(estimate_step_seconds(&ts), Some(1800));
///
/// assert_eq!(estimate_step_seconds(&[t(5), t(5)]), None);
/// ```
#[must_use]
pub fn estimate_step_seconds(timestamps: &[DateTime<Utc>]) -> Option<i64> {
    let mut ts = timestamps.to_vec();
    ts.sort_unstable();
    ts.dedup();
    let mut gaps: Vec<i64> = ts.windows(2).map(|w| (w[1] - w[0]).num_seconds()).collect();
    if gaps.is_empty() {
        return None;
    }
    gaps.sort_unstable();

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for g in &gaps {
        *counts.entry(*g).or_default() += 1;
    }
    let top = counts.values().copied().max().unwrap_or_default();
    let mut modes = counts.iter().filter(|(_, n)| **n == top).map(|(g, _)| *g);
    match (modes.next(), modes.next()) {
        (Some(g), None) => Some(g),
        _ => Some(gaps[(gaps.len() - 1) / 2]),
    }
}

/// Require `timestamps` to be strictly increasing with a constant step.
///
/// Returns the step, or `None` for fewer than two timestamps.
///
/// # Errors
/// Returns `MalformedSnapshot` naming the first offending pair.
pub fn check_spacing(timestamps: &[DateTime<Utc>]) -> Result<Option<TimeDelta>, YtrackError> {
    let Some(step) = timestamps.windows(2).next().map(|w| w[1] - w[0]) else {
        return Ok(None);
    };
    for w in timestamps.windows(2) {
        let d = w[1] - w[0];
        if d <= TimeDelta::zero() {
            return Err(YtrackError::malformed(format!(
                "bucket {} does not follow {}",
                w[1], w[0]
            )));
        }
        if d != step {
            return Err(YtrackError::malformed(format!(
                "uneven bucket spacing: {}s then {}s at {}",
                step.num_seconds(),
                d.num_seconds(),
                w[1]
            )));
        }
    }
    Ok(Some(step))
}

/// Require strictly ascending timestamps.
///
/// # Errors
/// Returns `UnsortedInput` naming the first offending pair.
pub fn ensure_ascending(timestamps: &[DateTime<Utc>]) -> Result<(), YtrackError> {
    if let Some(w) = timestamps.windows(2).find(|w| w[1] <= w[0]) {
        return Err(YtrackError::UnsortedInput(format!(
            "{} is not after {}",
            w[1], w[0]
        )));
    }
    Ok(())
}
