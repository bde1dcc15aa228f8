use std::sync::Arc;

use ytrack::{SeriesStore, Value};
use ytrack_mock::{CardBuilder, MemoryStore, MockSource};

use crate::helpers::*;

#[test]
fn first_scrape_creates_the_series_without_the_open_bucket() {
    let store = Arc::new(MemoryStore::new());
    let source = MockSource::new().with_snapshot(channel_key(), first_channel_card().build());
    let tracker = tracker(source, &store);

    let report = tracker.run_series(&channel_key()).unwrap();
    assert!(report.merge.created);
    assert_eq!(report.merge.appended, 4);
    assert!(report.stored);
    assert_eq!(report.attributed_columns, vec!["vidA".to_string()]);
    assert!(!report.had_warnings());

    let series = store.get(&channel_key()).unwrap();
    assert_eq!(series.first_ts(), Some(at(2, 20)));
    assert_eq!(series.last_ts(), Some(at(2, 23)));
    assert_eq!(series.value(0, "vidA"), Some(&Value::Int(10)));
    assert_eq!(series.value(3, "views"), Some(&Value::Int(8)));
}

#[test]
fn overlapping_scrape_appends_only_new_buckets() {
    let store = Arc::new(MemoryStore::new());
    let second = CardBuilder::new(naive(3, 3))
        .hourly(naive(2, 22), &[7, 8, 9, 10, 11])
        .entity(CHANNEL);
    let source = MockSource::new()
        .with_snapshot(channel_key(), first_channel_card().build())
        .with_snapshot(channel_key(), second.build_text());
    let tracker = tracker(source, &store);

    tracker.run_series(&channel_key()).unwrap();
    let report = tracker.run_series(&channel_key()).unwrap();
    assert_eq!(report.merge.skipped, 2);
    assert_eq!(report.merge.appended, 2);
    assert!(report.attributed_columns.is_empty());

    let series = store.get(&channel_key()).unwrap();
    assert_eq!(series.len(), 6);
    assert_eq!(series.last_ts(), Some(at(3, 1)));
    assert_eq!(series.value(4, "views"), Some(&Value::Int(9)));
    // vidA is absent from the second card, but keeps its earlier values.
    assert_eq!(series.value(0, "vidA"), Some(&Value::Int(10)));
    assert_eq!(series.value(5, "vidA"), None);
}

#[test]
fn missed_scrapes_leave_placeholder_rows() {
    let store = Arc::new(MemoryStore::new());
    let later = CardBuilder::new(naive(3, 6))
        .hourly(naive(3, 2), &[1, 2, 3])
        .entity(CHANNEL);
    let source = MockSource::new()
        .with_snapshot(channel_key(), first_channel_card().build())
        .with_snapshot(channel_key(), later.build());
    let tracker = tracker(source, &store);

    tracker.run_series(&channel_key()).unwrap();
    let report = tracker.run_series(&channel_key()).unwrap();
    assert_eq!(report.merge.placeholders, 2);
    assert_eq!(report.merge.appended, 2);

    let series = store.get(&channel_key()).unwrap();
    assert_eq!(series.len(), 8);
    assert_eq!(series.rows[4].ts, at(3, 0));
    assert_eq!(series.value(4, "views"), Some(&Value::Missing));
    assert_eq!(series.value(5, "vidA"), Some(&Value::Missing));
    assert_eq!(series.value(6, "views"), Some(&Value::Int(1)));
}

#[test]
fn repeated_snapshot_does_not_rewrite_the_table() {
    let store = Arc::new(MemoryStore::new());
    let source = MockSource::new().with_snapshot(channel_key(), first_channel_card().build());
    let tracker = tracker(source, &store);

    tracker.run_series(&channel_key()).unwrap();
    let again = tracker.run_series(&channel_key()).unwrap();
    assert!(again.merge.is_noop());
    assert!(!again.stored);
    assert_eq!(store.writes(), 1);
}

#[test]
fn traffic_sources_are_attributed_from_their_share() {
    let store = Arc::new(MemoryStore::new());
    let key = ytrack::SeriesKey::hourly_video("vidA");
    let source = MockSource::new().with_snapshot(key.clone(), video_card("vidA").build());
    let tracker = tracker(source, &store);

    let report = tracker.run_series(&key).unwrap();
    assert_eq!(report.attributed_columns, vec!["YouTube search".to_string()]);
    let series = store.load(&key).unwrap().unwrap();
    assert_eq!(series.len(), 4);
    assert!(series.column("YouTube search").all(|v| v == Some(&Value::Int(5))));
}

#[test]
fn failing_category_keeps_the_rest_of_the_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let card = first_channel_card().video("vidZ", "50", &[0.0; 5]);
    let source = MockSource::new().with_snapshot(channel_key(), card.build());
    let tracker = tracker(source, &store);

    let report = tracker.run_series(&channel_key()).unwrap();
    assert!(report.had_warnings());
    assert!(matches!(
        report.category_failures.as_slice(),
        [ytrack::YtrackError::DivisionByZero { category }] if category == "vidZ"
    ));
    assert_eq!(report.attributed_columns, vec!["vidA".to_string()]);

    let series = store.get(&channel_key()).unwrap();
    assert!(!series.columns.contains("vidZ"));
    assert_eq!(series.value(1, "vidA"), Some(&Value::Int(10)));
}

#[cfg(feature = "tracing")]
#[test]
fn runs_with_a_subscriber_installed() {
    ytrack::init_tracing("ytrack=debug");
    ytrack::init_tracing("ytrack=debug");
    let store = Arc::new(MemoryStore::new());
    let source = MockSource::new().with_snapshot(channel_key(), first_channel_card().build());
    let report = tracker(source, &store).run_series(&channel_key()).unwrap();
    assert!(report.stored);
}
