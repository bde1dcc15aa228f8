//! The latest-activity card: views per hour over the last 48 hours, broken
//! down by video (channel scope) or traffic source (video scope).

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::{Number, Value as Json};
use ytrack_types::{Scope, TimestampSource, YtrackError};

use super::label::{DayTable, parse_bucket_label};
use super::{Category, CategoryKind, ParseOptions, RawSnapshot, Snapshot, from_epoch_millis};
use crate::frame::{ColumnRegistry, Row, VIEWS_COLUMN, Value, decimal_from_json};
use crate::timeseries::infer::check_spacing;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardDoc {
    last_updated: Option<String>,
    #[serde(rename = "last48HoursData")]
    last_48_hours: Last48Hours,
    explore_config: Option<Json>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Last48Hours {
    total_metric_value: Option<Json>,
    main_chart: MainChart,
    #[serde(default)]
    table: Vec<TableRow>,
}

#[derive(Debug, Deserialize)]
struct MainChart {
    data: Vec<ChartPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartPoint {
    x: Option<Number>,
    y: Number,
    hovercard_info: Option<Hovercard>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Hovercard {
    domain_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableRow {
    #[serde(default)]
    title: String,
    value: Json,
    #[serde(default)]
    spark_chart_percentages: Vec<Number>,
    analytics_link: Option<Json>,
    thumbnail_data: Option<ThumbnailData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThumbnailData {
    thumbnail_url: Option<String>,
}

fn formatted(v: &Json) -> Option<String> {
    match v {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse the card's "last updated" stamp.
///
/// Accepts RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` read as local
/// time in `tz`.
///
/// # Errors
/// Returns `MalformedSnapshot` if the stamp is unreadable or names a local
/// time that does not exist.
pub fn parse_last_updated(raw: &str, tz: Tz) -> Result<DateTime<Utc>, YtrackError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let head = raw.split('.').next().unwrap_or(raw);
    let naive = NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| YtrackError::malformed(format!("lastUpdated {raw:?}: {e}")))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| YtrackError::malformed(format!("lastUpdated {raw:?} does not exist in {tz}")))
}

/// Resolve a bucket label in `tz`. A wall-clock hour that occurs twice (DST
/// fall-back) maps to its later instance once `prev` already holds the
/// earlier one.
fn label_timestamp(
    point: &ChartPoint,
    table: &DayTable,
    tz: Tz,
    prev: Option<DateTime<Utc>>,
) -> Result<DateTime<Utc>, YtrackError> {
    let text = point
        .hovercard_info
        .as_ref()
        .and_then(|h| h.domain_text.as_deref())
        .ok_or_else(|| YtrackError::malformed("chart point without domainText"))?;
    let label = parse_bucket_label(text)?;
    let local = table.resolve(label.day).and_time(label.start);
    let resolved = match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(early, late) => {
            if prev.is_some_and(|p| early.with_timezone(&Utc) <= p) {
                late
            } else {
                early
            }
        }
        LocalResult::None => {
            return Err(YtrackError::malformed(format!(
                "{text:?} does not exist in {tz}"
            )));
        }
    };
    Ok(resolved.with_timezone(&Utc))
}

fn epoch_timestamp(point: &ChartPoint) -> Result<DateTime<Utc>, YtrackError> {
    let x = point
        .x
        .as_ref()
        .ok_or_else(|| YtrackError::malformed("chart point without x"))?;
    from_epoch_millis(x)
}

fn category(row: TableRow, kind: CategoryKind) -> Result<Category, YtrackError> {
    let value = formatted(&row.value).ok_or_else(|| {
        YtrackError::malformed(format!("category {:?} has no value", row.title))
    })?;
    let weights = row
        .spark_chart_percentages
        .iter()
        .map(|n| {
            decimal_from_json(n)
                .ok_or_else(|| YtrackError::malformed(format!("weight {n} is not a decimal")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let link_id = row
        .analytics_link
        .as_ref()
        .and_then(|l| l.pointer("/routeLink/route/params/videoId"))
        .and_then(Json::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Ok(Category {
        kind,
        title: row.title,
        value,
        weights,
        link_id,
        thumbnail_url: row.thumbnail_data.and_then(|t| t.thumbnail_url),
    })
}

/// Parse a latest-activity card observed for `scope`.
///
/// Buckets carry a `views` cell. Categories are videos for a channel and
/// traffic sources for a video; they are returned unattributed.
///
/// # Errors
/// Returns `MalformedSnapshot` if required fields are absent, a bucket label
/// does not parse, or the buckets are not strictly increasing and equally
/// spaced after sorting.
pub fn parse_card(
    raw: RawSnapshot,
    scope: &Scope,
    opts: &ParseOptions,
) -> Result<Snapshot, YtrackError> {
    let doc: CardDoc = serde_json::from_value(raw.into_value()?)?;
    let points = doc.last_48_hours.main_chart.data;
    if points.is_empty() {
        return Err(YtrackError::malformed("card has no chart buckets"));
    }
    let tz = opts.timezone;
    let last_updated = doc
        .last_updated
        .as_deref()
        .map(|s| parse_last_updated(s, tz))
        .transpose()?;

    let mut stamped = Vec::with_capacity(points.len());
    match opts.timestamp_source {
        TimestampSource::Epoch => {
            for (i, p) in points.iter().enumerate() {
                stamped.push((epoch_timestamp(p)?, i));
            }
        }
        _ => {
            let anchor = last_updated.ok_or_else(|| {
                YtrackError::malformed("lastUpdated is required to resolve bucket labels")
            })?;
            let table = DayTable::new(anchor.with_timezone(&tz).date_naive());
            let mut prev = None;
            for (i, p) in points.iter().enumerate() {
                let ts = label_timestamp(p, &table, tz, prev)?;
                prev = Some(ts);
                stamped.push((ts, i));
            }
        }
    }
    stamped.sort_by_key(|(ts, _)| *ts);
    let order: Vec<usize> = stamped.iter().map(|(_, i)| *i).collect();
    let timestamps: Vec<DateTime<Utc>> = stamped.iter().map(|(ts, _)| *ts).collect();
    let granularity = check_spacing(&timestamps)?.unwrap_or_else(|| TimeDelta::hours(1));

    let mut columns = ColumnRegistry::new();
    let views = columns.intern(VIEWS_COLUMN);
    let buckets = stamped
        .iter()
        .map(|&(ts, i)| {
            let mut row = Row::new(ts);
            if let Some(v) = Value::from_json_number(&points[i].y) {
                row.set(views, v);
            }
            row
        })
        .collect();

    let kind = if scope.is_channel() {
        CategoryKind::Video
    } else {
        CategoryKind::TrafficSource
    };
    let mut categories = Vec::with_capacity(doc.last_48_hours.table.len());
    let mut warnings = Vec::new();
    for row in doc.last_48_hours.table {
        match category(row, kind) {
            Ok(mut c) => {
                if c.weights.len() == order.len() {
                    c.weights = order.iter().map(|&i| c.weights[i]).collect();
                }
                categories.push(c);
            }
            Err(e) => warnings.push(e),
        }
    }

    let entity_id = doc
        .explore_config
        .as_ref()
        .and_then(|c| c.pointer("/restrictAndTimePeriodConfig/entity/id"))
        .and_then(Json::as_str)
        .map(str::to_string);

    Ok(Snapshot {
        last_updated,
        entity_id,
        granularity,
        columns,
        buckets,
        categories,
        total_metric_value: doc
            .last_48_hours
            .total_metric_value
            .as_ref()
            .and_then(formatted),
        warnings,
    })
}
