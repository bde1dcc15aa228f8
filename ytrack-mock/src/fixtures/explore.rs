use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Map, Value as Json, json};

/// Builds explore deep-dive charts: metric key to a list of named series.
#[derive(Debug, Clone)]
pub struct ExploreBuilder {
    start: DateTime<Utc>,
    step: TimeDelta,
    metrics: Map<String, Json>,
}

impl ExploreBuilder {
    /// Chart whose buckets start at `start` and are `step` apart.
    #[must_use]
    pub fn new(start: DateTime<Utc>, step: TimeDelta) -> Self {
        Self {
            start,
            step,
            metrics: Map::new(),
        }
    }

    /// Append a series named `name` (e.g. `MAIN_METRIC_SERIES_NAME`) to `metric`.
    #[must_use]
    pub fn series(mut self, metric: &str, name: &str, ys: &[i64]) -> Self {
        let data: Vec<Json> = ys
            .iter()
            .enumerate()
            .map(|(i, y)| {
                let n = i32::try_from(i).unwrap_or(i32::MAX);
                let ts = self.start + self.step * n;
                json!({
                    "x": ts.timestamp_millis(),
                    "y": y,
                    "hovercardInfo": {
                        "relativeDateFormatted": format!("First {} units", i + 1),
                        "entityTitle": name,
                    },
                })
            })
            .collect();
        let entry = self
            .metrics
            .entry(metric.to_string())
            .or_insert_with(|| Json::Array(Vec::new()));
        if let Json::Array(list) = entry {
            list.push(json!({ "name": name, "data": data }));
        }
        self
    }

    /// Totals series for `metric`.
    #[must_use]
    pub fn totals(self, metric: &str, ys: &[i64]) -> Self {
        self.series(metric, "MAIN_METRIC_SERIES_NAME", ys)
    }

    /// The chart as a structured value.
    #[must_use]
    pub fn build(&self) -> Json {
        Json::Object(self.metrics.clone())
    }
}
