use std::sync::Arc;

use ytrack::{SeriesKey, YtrackError};
use ytrack_mock::{MemoryStore, MockSource};

use crate::helpers::*;

#[test]
fn failing_sources_do_not_stop_the_cycle() {
    let store = Arc::new(MemoryStore::new());
    let source = MockSource::new().with_snapshot(channel_key(), first_channel_card().build());
    let tracker = tracker(source, &store);

    let keys = [
        SeriesKey::hourly_video("FAIL"),
        channel_key(),
        SeriesKey::hourly_video("TIMEOUT"),
        SeriesKey::hourly_video("unscripted"),
    ];
    let report = tracker.run_cycle(&keys);
    assert!(!report.is_clean());
    assert_eq!(report.completed.len(), 1);
    assert_eq!(report.failed.len(), 3);
    assert!(matches!(report.failed[0].1, YtrackError::Source { .. }));
    assert!(matches!(report.failed[1].1, YtrackError::SourceTimeout { .. }));
    assert!(matches!(report.failed[2].1, YtrackError::NotFound { .. }));
    assert_eq!(report.rows_appended(), 4);
    assert!(store.get(&channel_key()).is_some());
}

#[test]
fn write_failure_skips_only_that_series() {
    let store = Arc::new(MemoryStore::new());
    store.fail_writes_for(channel_key());
    let video = SeriesKey::hourly_video("vidA");
    let source = MockSource::new()
        .with_snapshot(channel_key(), first_channel_card().build())
        .with_snapshot(video.clone(), video_card("vidA").build());
    let tracker = tracker(source, &store);

    let report = tracker.run_cycle(&[channel_key(), video.clone()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, channel_key());
    assert!(matches!(report.failed[0].1, YtrackError::Io { .. }));
    assert!(report.report_for(&video).is_some_and(|r| r.stored));
    assert!(store.get(&channel_key()).is_none());
    assert!(store.get(&video).is_some());
}

#[test]
fn snapshot_of_another_video_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let key = SeriesKey::hourly_video("vidA");
    let source = MockSource::new().with_snapshot(key.clone(), video_card("vidB").build());
    let tracker = tracker(source, &store);

    let err = tracker.run_series(&key).unwrap_err();
    assert_eq!(
        err,
        YtrackError::IdentityMismatch {
            expected: "vidA".into(),
            actual: "vidB".into(),
        }
    );
    assert!(err.is_caller_error());
    assert_eq!(store.writes(), 0);
}

#[test]
fn malformed_snapshot_leaves_the_series_untouched() {
    let store = Arc::new(MemoryStore::new());
    let source = MockSource::new()
        .with_snapshot(channel_key(), first_channel_card().build())
        .with_snapshot(channel_key(), "<html>sign in</html>".to_string());
    let tracker = tracker(source, &store);

    tracker.run_series(&channel_key()).unwrap();
    let before = store.get(&channel_key()).unwrap();
    let err = tracker.run_series(&channel_key()).unwrap_err();
    assert!(matches!(err, YtrackError::MalformedSnapshot(_)));
    assert_eq!(store.get(&channel_key()).unwrap(), before);
    assert_eq!(store.writes(), 1);
}

#[test]
fn builder_requires_a_source_and_a_channel() {
    let missing_source = ytrack::Tracker::builder().channel_id(CHANNEL).build();
    assert!(matches!(missing_source, Err(YtrackError::InvalidConfig(_))));

    let missing_channel = ytrack::Tracker::builder()
        .with_source(Arc::new(MockSource::new()))
        .build();
    assert!(matches!(missing_channel, Err(YtrackError::InvalidConfig(_))));
}
