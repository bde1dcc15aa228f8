//! The explore deep-dive chart: one series per traffic source for each
//! metric, with epoch-millisecond buckets.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Number;
use ytrack_types::YtrackError;

use super::{ParseOptions, RawSnapshot, Snapshot, from_epoch_millis};
use crate::frame::{ColumnRegistry, Row, TIME_DELTA_COLUMN, Value, decimal_from_json};
use crate::timeseries::infer::check_spacing;

/// Metrics in the order their columns are laid out.
pub const METRICS: &[&str] = &["views", "impressions", "watchtime", "likes", "dislikes"];

/// Series name of the totals line on every explore chart.
pub const TOTAL_SERIES: &str = "MAIN_METRIC_SERIES_NAME";

/// Traffic sources that also report impressions, by internal series name.
pub const IMPRESSION_SOURCES: &[(&str, &str)] = &[
    (TOTAL_SERIES, "Total"),
    ("YT_PLAYLIST_PAGE_main", "Playlist page"),
    ("PLAYLIST_main", "Playlists"),
    ("YT_RELATED_main", "Suggested videos"),
    ("YT_SEARCH_main", "YouTube search"),
    ("YT_CHANNEL_main", "Channel pages"),
    ("SUBSCRIBER_main", "Browse features"),
];

/// Traffic sources without impression data, by internal series name.
pub const OTHER_SOURCES: &[(&str, &str)] = &[
    ("END_SCREEN_main", "End screens"),
    ("NOTIFICATION_main", "Notifications"),
    ("EXT_URL_main", "External"),
    ("YT_OTHER_PAGE_main", "Other YouTube features"),
    ("UNKNOWN_MOBILE_OR_DIRECT_main", "Direct or unknown"),
    ("SHORTS_main", "Shorts feed"),
    ("ADVERTISING_main", "Advertising"),
    ("ANNOTATION_main", "Cards and annotations"),
    ("HASHTAGS_main", "Hashtag pages"),
];

const MS_PER_HOUR: i64 = 3_600_000;

/// Display name of a traffic source.
#[must_use]
pub fn traffic_source(series_name: &str) -> Option<&'static str> {
    IMPRESSION_SOURCES
        .iter()
        .chain(OTHER_SOURCES)
        .find(|(k, _)| *k == series_name)
        .map(|(_, v)| *v)
}

fn reports_impressions(source: &str) -> bool {
    IMPRESSION_SOURCES.iter().any(|(_, v)| *v == source)
}

#[derive(Debug, Deserialize)]
struct ExploreSeries {
    name: String,
    #[serde(default)]
    data: Vec<ExplorePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExplorePoint {
    x: Number,
    y: Number,
    hovercard_info: Option<ExploreHovercard>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExploreHovercard {
    relative_date_formatted: Option<String>,
}

/// Column prefix and cell conversion for one metric.
fn metric_column(metric: &str) -> (String, fn(&Number) -> Option<Value>) {
    if metric == "watchtime" {
        (format!("{metric}(Hours)"), watch_hours)
    } else {
        (metric.to_string(), Value::from_json_number)
    }
}

fn watch_hours(ms: &Number) -> Option<Value> {
    let ms = decimal_from_json(ms)?;
    let mut hours = ms.checked_div(Decimal::from(MS_PER_HOUR))?.round_dp(2);
    // fixed scale so whole hours read back as decimals, not integers
    hours.rescale(2);
    Some(Value::Num(hours))
}

/// Every source column a metric registers even when the chart omits it.
fn known_sources(metric: &str) -> Vec<&'static str> {
    match metric {
        "impressions" => IMPRESSION_SOURCES.iter().map(|(_, v)| *v).collect(),
        "likes" | "dislikes" => vec!["Total"],
        _ => IMPRESSION_SOURCES
            .iter()
            .chain(OTHER_SOURCES)
            .map(|(_, v)| *v)
            .collect(),
    }
}

/// Parse an explore chart: a mapping of metric key to its list of series.
///
/// Columns are `<metric>_<source>` in metric order, after `time delta`.
/// A series from an unknown traffic source is skipped with an
/// `UnresolvableCategory` warning; the rest of the chart is kept.
///
/// # Errors
/// - `MalformedSnapshot` if the document has the wrong shape, fewer than two
///   buckets, or unevenly spaced buckets.
/// - `UnsupportedGranularity` if the bucket step is outside the configured
///   bounds.
pub fn parse_explore(raw: RawSnapshot, opts: &ParseOptions) -> Result<Snapshot, YtrackError> {
    let mut doc: BTreeMap<String, Vec<ExploreSeries>> =
        serde_json::from_value(raw.into_value()?)?;

    let mut metrics: Vec<(String, Vec<ExploreSeries>)> = METRICS
        .iter()
        .filter_map(|m| doc.remove_entry(*m))
        .collect();
    metrics.extend(doc);

    let mut columns = ColumnRegistry::new();
    let delta = columns.intern(TIME_DELTA_COLUMN);
    let mut rows: BTreeMap<DateTime<Utc>, Row> = BTreeMap::new();
    let mut warnings = Vec::new();

    for (metric, series_list) in metrics {
        let (prefix, convert) = metric_column(&metric);
        for series in series_list {
            let Some(source) = traffic_source(&series.name) else {
                warnings.push(YtrackError::UnresolvableCategory(format!(
                    "{metric}: unknown traffic source {}",
                    series.name
                )));
                continue;
            };
            if metric == "impressions" && !reports_impressions(source) {
                continue;
            }
            let id = match columns.try_register(format!("{prefix}_{source}")) {
                Ok(id) => id,
                Err(e) => {
                    warnings.push(e);
                    continue;
                }
            };
            for p in series.data {
                let ts = from_epoch_millis(&p.x)?;
                let row = rows.entry(ts).or_insert_with(|| Row::new(ts));
                if row.get(delta).is_none() {
                    if let Some(text) = p.hovercard_info.and_then(|h| h.relative_date_formatted) {
                        row.set(delta, Value::Text(text));
                    }
                }
                if let Some(v) = convert(&p.y) {
                    row.set(id, v);
                }
            }
        }
        for source in known_sources(&metric) {
            columns.intern(format!("{prefix}_{source}"));
        }
    }

    if rows.len() < 2 {
        return Err(YtrackError::malformed(format!(
            "explore chart has {} bucket(s); at least 2 are needed",
            rows.len()
        )));
    }
    let timestamps: Vec<DateTime<Utc>> = rows.keys().copied().collect();
    let step = (timestamps[1] - timestamps[0]).num_seconds();
    if !opts.granularity_bounds.contains(step) {
        return Err(YtrackError::UnsupportedGranularity { seconds: step });
    }
    let granularity = check_spacing(&timestamps)?
        .ok_or_else(|| YtrackError::malformed("explore chart has no bucket spacing"))?;

    Ok(Snapshot {
        last_updated: None,
        entity_id: None,
        granularity,
        columns,
        buckets: rows.into_values().collect(),
        categories: Vec::new(),
        total_metric_value: None,
        warnings,
    })
}
