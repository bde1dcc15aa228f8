// Shared fixtures so tests can `use helpers::*;`
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use ytrack::{SeriesKey, Tracker};
use ytrack_mock::{CardBuilder, MemoryStore, MockSource};

/// Channel every test tracker is configured for.
pub const CHANNEL: &str = "UCxxxxxxxxxxxxxxxxxxxxxx";

/// Dashboard-local time on 2024-01-`d` at `h`:00.
pub fn naive(d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

/// UTC instant on 2024-01-`d` at `h`:00.
pub fn at(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
}

pub fn channel_key() -> SeriesKey {
    SeriesKey::hourly_channel(CHANNEL)
}

/// Tracker over a mock source and a shared in-memory store.
pub fn tracker(source: MockSource, store: &Arc<MemoryStore>) -> Tracker {
    Tracker::builder()
        .with_source(Arc::new(source))
        .with_store(store.clone())
        .channel_id(CHANNEL)
        .build()
        .unwrap()
}

/// Channel card refreshed at 01:00 on Jan 3 with hourly buckets from
/// 20:00 on Jan 2; `vidA` earns 40 views spread over the first four.
pub fn first_channel_card() -> CardBuilder {
    CardBuilder::new(naive(3, 1))
        .hourly(naive(2, 20), &[5, 6, 7, 8, 9])
        .video("vidA", "40", &[1.0, 1.0, 1.0, 1.0, 0.0])
        .entity(CHANNEL)
}

/// Video card for `id` whose "YouTube search" share of a 40-view total is
/// spread over the first four buckets.
pub fn video_card(id: &str) -> CardBuilder {
    CardBuilder::new(naive(3, 1))
        .hourly(naive(2, 20), &[1, 2, 3, 4, 5])
        .traffic_source("YouTube search", "50.0%", &[1.0, 1.0, 1.0, 1.0, 0.0])
        .total("40")
        .entity(id)
}
