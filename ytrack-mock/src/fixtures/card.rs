use chrono::{NaiveDateTime, TimeDelta};
use serde_json::{Value as Json, json};

/// Builds latest-activity cards the way the dashboard renders them.
///
/// Bucket labels are derived from each bucket's start relative to
/// `last_updated`: `Today`, `Yesterday`, or the full weekday name. Times are
/// 12-hour with the start's AM/PM omitted when the end shares it. The `x`
/// field is the start in epoch milliseconds, reading naive times as UTC.
#[derive(Debug, Clone)]
pub struct CardBuilder {
    last_updated: NaiveDateTime,
    dash: char,
    buckets: Vec<(NaiveDateTime, i64)>,
    table: Vec<Json>,
    total: Option<String>,
    entity_id: Option<String>,
}

impl CardBuilder {
    /// Card last refreshed at `last_updated` (dashboard-local time).
    #[must_use]
    pub fn new(last_updated: NaiveDateTime) -> Self {
        Self {
            last_updated,
            dash: '\u{2013}',
            buckets: Vec::new(),
            table: Vec::new(),
            total: None,
            entity_id: None,
        }
    }

    /// Separator between the two clock times of every label.
    #[must_use]
    pub const fn dash(mut self, dash: char) -> Self {
        self.dash = dash;
        self
    }

    /// Consecutive hourly buckets from `start`, one per view count.
    #[must_use]
    pub fn hourly(mut self, start: NaiveDateTime, views: &[i64]) -> Self {
        for (i, v) in views.iter().enumerate() {
            let offset = TimeDelta::hours(i64::try_from(i).unwrap_or(i64::MAX));
            self.buckets.push((start + offset, *v));
        }
        self
    }

    /// A video row with a structured analytics link.
    #[must_use]
    pub fn video(mut self, id: &str, value: &str, weights: &[f64]) -> Self {
        self.table.push(json!({
            "title": format!("Video {id}"),
            "value": value,
            "sparkChartPercentages": weights,
            "analyticsLink": { "routeLink": { "route": { "params": { "videoId": id } } } },
            "thumbnailData": { "thumbnailUrl": thumbnail(id) },
        }));
        self
    }

    /// A video row identified only through its thumbnail.
    #[must_use]
    pub fn thumbnail_video(mut self, id: &str, value: &str, weights: &[f64]) -> Self {
        self.table.push(json!({
            "title": format!("Video {id}"),
            "value": value,
            "sparkChartPercentages": weights,
            "thumbnailData": { "thumbnailUrl": thumbnail(id) },
        }));
        self
    }

    /// A traffic source row whose value is a share of the card total.
    #[must_use]
    pub fn traffic_source(mut self, title: &str, share: &str, weights: &[f64]) -> Self {
        self.table.push(json!({
            "title": title,
            "value": share,
            "sparkChartPercentages": weights,
        }));
        self
    }

    /// Formatted card total, e.g. `1,234`.
    #[must_use]
    pub fn total(mut self, total: &str) -> Self {
        self.total = Some(total.to_string());
        self
    }

    /// Entity id carried in the explore config.
    #[must_use]
    pub fn entity(mut self, id: &str) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    fn label(&self, start: NaiveDateTime) -> String {
        let end = start + TimeDelta::hours(1);
        let day = match (self.last_updated.date() - start.date()).num_days() {
            0 => "Today".to_string(),
            1 => "Yesterday".to_string(),
            _ => start.format("%A").to_string(),
        };
        let start_period = start.format("%p").to_string();
        let end_period = end.format("%p").to_string();
        let start_text = if start_period == end_period {
            start.format("%-I:%M").to_string()
        } else {
            start.format("%-I:%M %p").to_string()
        };
        format!(
            "{day}, {start_text}{}{} {end_period}",
            self.dash,
            end.format("%-I:%M")
        )
    }

    /// The card as a structured value.
    #[must_use]
    pub fn build(&self) -> Json {
        let data: Vec<Json> = self
            .buckets
            .iter()
            .map(|(start, views)| {
                json!({
                    "x": start.and_utc().timestamp_millis(),
                    "y": views,
                    "hovercardInfo": { "domainText": self.label(*start) },
                })
            })
            .collect();
        let mut card = json!({
            "lastUpdated": self.last_updated.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            "last48HoursData": {
                "mainChart": { "data": data },
                "table": self.table,
            },
        });
        if let Some(total) = &self.total {
            card["last48HoursData"]["totalMetricValue"] = json!(total);
        }
        if let Some(id) = &self.entity_id {
            card["exploreConfig"] =
                json!({ "restrictAndTimePeriodConfig": { "entity": { "id": id } } });
        }
        card
    }

    /// The card as a captured text dump, with page noise around it.
    #[must_use]
    pub fn build_text(&self) -> String {
        format!("<pre>{}\n\u{200b}", self.build())
    }
}

fn thumbnail(id: &str) -> String {
    format!("https://i.ytimg.com/vi/{id}/mqdefault.jpg")
}
