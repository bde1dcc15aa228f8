use std::sync::Arc;

use chrono::{TimeDelta, TimeZone, Utc};
use tempfile::TempDir;
use ytrack::{SeriesKey, Tracker, VideoEntry, VideoFlags, VideoRegistry, WindowKind};
use ytrack_mock::{ExploreBuilder, MemoryStore, MockSource};

use crate::helpers::*;

fn upload(id: &str, m: u32, d: u32) -> VideoEntry {
    VideoEntry::new(id, Utc.with_ymd_and_hms(2023, m, d, 17, 0, 0).unwrap(), id)
}

fn registry(dir: &TempDir, entries: Vec<VideoEntry>) -> VideoRegistry {
    let registry = VideoRegistry::new(dir.path().join("video_log.csv"));
    for e in entries {
        registry.upsert(e).unwrap();
    }
    registry
}

fn shared_tracker(source: &Arc<MockSource>, store: &Arc<MemoryStore>) -> Tracker {
    Tracker::builder()
        .with_source(source.clone())
        .with_store(store.clone())
        .channel_id(CHANNEL)
        .build()
        .unwrap()
}

fn explore(step: TimeDelta, views: &[i64]) -> serde_json::Value {
    ExploreBuilder::new(Utc.with_ymd_and_hms(2023, 12, 1, 17, 0, 0).unwrap(), step)
        .totals("views", views)
        .build()
}

#[test]
fn hourly_cycle_runs_the_channel_then_selected_videos() {
    let dir = TempDir::new().unwrap();
    let registry = registry(
        &dir,
        vec![
            upload("old1", 11, 1),
            upload("old2", 12, 1),
            upload("young", 12, 30),
        ],
    );
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(
        MockSource::new()
            .with_snapshot(channel_key(), first_channel_card().build())
            .with_snapshot(SeriesKey::hourly_video("old2"), video_card("old2").build())
            .with_snapshot(SeriesKey::hourly_video("vidA"), video_card("vidA").build()),
    );
    let tracker = shared_tracker(&source, &store);

    let report = tracker.run_hourly_cycle(&registry, at(3, 2)).unwrap();
    assert!(report.is_clean());
    assert_eq!(
        source.fetched(),
        vec![
            channel_key(),
            SeriesKey::hourly_video("old2"),
            SeriesKey::hourly_video("vidA"),
        ]
    );
    assert_eq!(report.completed.len(), 3);
}

#[test]
fn hourly_cycle_falls_back_to_the_registry_when_the_channel_fails() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir, vec![upload("old1", 11, 1)]);
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(
        MockSource::new()
            .with_snapshot(SeriesKey::hourly_video("old1"), video_card("old1").build()),
    );
    let tracker = shared_tracker(&source, &store);

    let report = tracker.run_hourly_cycle(&registry, at(3, 2)).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, channel_key());
    assert!(report.report_for(&SeriesKey::hourly_video("old1")).is_some());
}

#[test]
fn coarsened_explore_chart_retires_the_video() {
    let dir = TempDir::new().unwrap();
    let registry = registry(
        &dir,
        vec![
            upload("vid1", 10, 1),
            upload("vid2", 11, 1).with_flags(VideoFlags::empty()),
            upload("vid3", 12, 1),
        ],
    );
    let vid1 = SeriesKey::explore_video("vid1", WindowKind::SincePublished);
    let vid3 = SeriesKey::explore_video("vid3", WindowKind::SincePublished);
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(
        MockSource::new()
            .with_snapshot(vid1.clone(), explore(TimeDelta::days(1), &[1, 2, 3]))
            .with_snapshot(vid3.clone(), explore(TimeDelta::hours(1), &[1, 2, 3]))
            .with_snapshot(vid3.clone(), explore(TimeDelta::hours(1), &[1, 2, 3, 4, 5])),
    );
    let tracker = shared_tracker(&source, &store);

    let first = tracker
        .run_explore_cycle(&registry, WindowKind::SincePublished)
        .unwrap();
    assert_eq!(first.failed.len(), 1);
    assert_eq!(first.failed[0].0, vid1);
    assert!(matches!(
        first.failed[0].1,
        ytrack::YtrackError::UnsupportedGranularity { seconds: 86_400 }
    ));
    assert!(!source.fetched().iter().any(|k| k.scope.id() == "vid2"));
    let recent: Vec<String> = registry.list(true).unwrap().into_iter().map(|v| v.id).collect();
    assert_eq!(recent, vec!["vid3".to_string()]);

    let second = tracker
        .run_explore_cycle(&registry, WindowKind::SincePublished)
        .unwrap();
    assert!(second.is_clean());
    let merge = &second.report_for(&vid3).unwrap().merge;
    assert!(merge.replaced);
    assert_eq!(merge.appended, 2);
    assert_eq!(store.get(&vid3).unwrap().len(), 4);
}

#[test]
fn first_day_window_covers_every_registered_video() {
    let dir = TempDir::new().unwrap();
    let registry = registry(
        &dir,
        vec![
            upload("vid1", 10, 1).with_flags(VideoFlags::empty()),
            upload("vid2", 11, 1),
        ],
    );
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(MockSource::new());
    let tracker = shared_tracker(&source, &store);

    let report = tracker
        .run_explore_cycle(&registry, WindowKind::First24h)
        .unwrap();
    assert_eq!(report.failed.len(), 2);
    assert_eq!(
        source.fetched(),
        vec![
            SeriesKey::explore_video("vid1", WindowKind::First24h),
            SeriesKey::explore_video("vid2", WindowKind::First24h),
        ]
    );
    assert_eq!(registry.list(true).unwrap().len(), 1);
}
