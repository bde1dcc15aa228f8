use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use ytrack::{DumpDirectory, SnapshotRequest, SnapshotSource, YtrackError};
use ytrack_mock::{CardBuilder, MemoryStore, MockSource};

use crate::helpers::*;

fn write_dumps(dir: &TempDir) {
    let first = first_channel_card().dash('-');
    let second = CardBuilder::new(naive(3, 3))
        .hourly(naive(2, 22), &[7, 8, 9, 10, 11])
        .dash('\u{2212}')
        .entity(CHANNEL);
    // Name order, not creation order, decides replay order.
    fs::write(dir.path().join("channel_02.txt"), second.build_text()).unwrap();
    fs::write(dir.path().join("channel_01.txt"), first.build_text()).unwrap();
    fs::write(dir.path().join("video_01.txt"), "unrelated").unwrap();
}

#[test]
fn dumps_are_served_in_name_order() {
    let dir = TempDir::new().unwrap();
    write_dumps(&dir);
    let dumps = DumpDirectory::open(dir.path(), "channel").unwrap();
    assert_eq!(dumps.remaining(), 2);

    let req = SnapshotRequest::new(channel_key());
    let first = dumps.fetch(&req).unwrap().into_value().unwrap();
    assert_eq!(first["lastUpdated"], "2024-01-03T01:00:00.000");
    dumps.fetch(&req).unwrap();
    assert!(matches!(dumps.fetch(&req), Err(YtrackError::NotFound { .. })));
}

#[test]
fn replayed_dumps_build_the_series_incrementally() {
    let dir = TempDir::new().unwrap();
    write_dumps(&dir);
    let store = Arc::new(MemoryStore::new());
    let tracker = tracker(MockSource::new(), &store);

    let report = tracker
        .ingest_dumps(&channel_key(), dir.path(), "channel")
        .unwrap();
    assert!(report.is_clean());
    assert_eq!(report.completed.len(), 2);
    assert_eq!(report.rows_appended(), 6);
    assert!(report.completed[0].merge.created);

    let series = store.get(&channel_key()).unwrap();
    assert_eq!(series.first_ts(), Some(at(2, 20)));
    assert_eq!(series.last_ts(), Some(at(3, 1)));
}

#[test]
fn bad_dump_is_skipped_and_replay_continues() {
    let dir = TempDir::new().unwrap();
    write_dumps(&dir);
    fs::write(dir.path().join("channel_00.txt"), "no json here").unwrap();
    let store = Arc::new(MemoryStore::new());
    let tracker = tracker(MockSource::new(), &store);

    let report = tracker
        .ingest_dumps(&channel_key(), dir.path(), "channel")
        .unwrap();
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].1, YtrackError::MalformedSnapshot(_)));
    assert_eq!(report.completed.len(), 2);
}

#[test]
fn missing_dump_directory_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = DumpDirectory::open(&dir.path().join("nope"), "channel").unwrap_err();
    assert!(matches!(err, YtrackError::Io { .. }));
}
