//! Distribute a category's aggregate across buckets by per-bucket weights.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use url::Url;
use ytrack_types::YtrackError;

use crate::frame::Value;
use crate::snapshot::{Category, CategoryKind, Snapshot};

/// Result of attributing every category of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributionOutcome {
    /// Columns added to the buckets, in registration order.
    pub attributed: Vec<String>,
    /// Categories that failed; the others were still attributed.
    pub failures: Vec<YtrackError>,
}

/// Split `aggregate` over buckets in proportion to `weights`.
///
/// Bucket `i` receives `floor(w_i * aggregate / sum(w))`, so the parts sum to
/// within `weights.len()` of the aggregate.
///
/// # Errors
/// - `DivisionByZero` if the weights sum to zero.
/// - `MalformedSnapshot` if a part does not fit an `i64`.
pub fn distribute(
    category: &str,
    weights: &[Decimal],
    aggregate: Decimal,
) -> Result<Vec<i64>, YtrackError> {
    let sum: Decimal = weights.iter().copied().sum();
    if sum.is_zero() {
        return Err(YtrackError::DivisionByZero {
            category: category.to_string(),
        });
    }
    weights
        .iter()
        .map(|w| {
            w.checked_mul(aggregate)
                .and_then(|x| x.checked_div(sum))
                .and_then(|x| x.floor().to_i64())
                .ok_or_else(|| {
                    YtrackError::malformed(format!(
                        "{category}: share of {aggregate} for weight {w} is out of range"
                    ))
                })
        })
        .collect()
}

/// Parse a formatted count such as `1,234`.
///
/// # Errors
/// Returns `MalformedSnapshot` if the text is not a number.
pub fn parse_count(raw: &str) -> Result<Decimal, YtrackError> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    Decimal::from_str(&cleaned)
        .map_err(|e| YtrackError::malformed(format!("count {raw:?}: {e}")))
}

/// Absolute value of a percentage such as `70.6%` of a formatted total.
///
/// # Errors
/// Returns `MalformedSnapshot` if either side is not a number.
pub fn parse_share(raw: &str, total: &str) -> Result<Decimal, YtrackError> {
    let pct = parse_count(raw.trim().trim_end_matches('%'))?;
    let total = parse_count(total)?;
    pct.checked_mul(total)
        .map(|x| x / Decimal::ONE_HUNDRED)
        .ok_or_else(|| YtrackError::malformed(format!("{raw} of {total} is out of range")))
}

/// Video id embedded in a thumbnail URL, e.g. `https://i.ytimg.com/vi/<id>/mqdefault.jpg`.
#[must_use]
pub fn thumbnail_token(raw: &str) -> Option<String> {
    let absolute = if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.to_string()
    };
    let url = Url::parse(&absolute).ok()?;
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let token = segments
        .iter()
        .position(|s| matches!(*s, "vi" | "vi_webp"))
        .and_then(|i| segments.get(i + 1))
        .or_else(|| segments.get(1))?;
    Some((*token).to_string())
}

/// Column name a category attributes into.
///
/// # Errors
/// Returns `UnresolvableCategory` if no identifier can be derived.
pub fn resolve_column(category: &Category) -> Result<String, YtrackError> {
    match category.kind {
        CategoryKind::Video => category
            .link_id
            .clone()
            .or_else(|| category.thumbnail_url.as_deref().and_then(thumbnail_token))
            .ok_or_else(|| {
                YtrackError::UnresolvableCategory(format!(
                    "no video id for {:?}",
                    category.title
                ))
            }),
        CategoryKind::TrafficSource => {
            let title = category.title.trim();
            if title.is_empty() {
                Err(YtrackError::UnresolvableCategory(
                    "traffic source without a title".into(),
                ))
            } else {
                Ok(title.to_string())
            }
        }
    }
}

fn aggregate(category: &Category, total: Option<&str>, column: &str) -> Result<Decimal, YtrackError> {
    match category.kind {
        CategoryKind::Video => parse_count(&category.value),
        CategoryKind::TrafficSource => {
            let total = total.ok_or_else(|| {
                YtrackError::malformed(format!("{column}: share given but card has no total"))
            })?;
            parse_share(&category.value, total)
        }
    }
}

/// Attribute every category of `snapshot` into new bucket columns.
///
/// Must run before the in-progress bucket is dropped, since weights are
/// aligned with every bucket of the card. A failing category leaves no trace
/// in the buckets; when two categories resolve to the same column the first
/// keeps it and the second fails with `ColumnNameCollision`.
pub fn attribute(snapshot: &mut Snapshot) -> AttributionOutcome {
    let mut outcome = AttributionOutcome::default();
    let categories = std::mem::take(&mut snapshot.categories);
    for category in &categories {
        match attribute_one(snapshot, category) {
            Ok(column) => outcome.attributed.push(column),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(category = %category.title, error = %e, "skipping category");
                outcome.failures.push(e);
            }
        }
    }
    snapshot.categories = categories;
    outcome
}

fn attribute_one(snapshot: &mut Snapshot, category: &Category) -> Result<String, YtrackError> {
    let column = resolve_column(category)?;
    if category.weights.len() != snapshot.buckets.len() {
        return Err(YtrackError::malformed(format!(
            "{column}: {} weights for {} buckets",
            category.weights.len(),
            snapshot.buckets.len()
        )));
    }
    let total = aggregate(category, snapshot.total_metric_value.as_deref(), &column)?;
    let parts = distribute(&column, &category.weights, total)?;
    let id = snapshot.columns.try_register(column.as_str())?;
    for (bucket, part) in snapshot.buckets.iter_mut().zip(parts) {
        bucket.set(id, Value::Int(part));
    }
    Ok(column)
}
