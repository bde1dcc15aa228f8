use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use ytrack::{CsvStore, SeriesStore, Tracker, Value};
use ytrack_mock::{CardBuilder, MockSource};

use crate::helpers::*;

#[test]
fn default_store_writes_csv_tables_under_the_data_dir() {
    let dir = TempDir::new().unwrap();
    let second = CardBuilder::new(naive(3, 6))
        .hourly(naive(3, 2), &[1, 2, 3])
        .entity(CHANNEL);
    let source = MockSource::new()
        .with_snapshot(channel_key(), first_channel_card().build_text())
        .with_snapshot(channel_key(), second.build_text());
    let tracker = Tracker::builder()
        .with_source(Arc::new(source))
        .data_dir(dir.path())
        .channel_id(CHANNEL)
        .build()
        .unwrap();

    tracker.run_series(&channel_key()).unwrap();
    tracker.run_series(&channel_key()).unwrap();

    let path = dir.path().join(format!("Hourly_{CHANNEL}.csv"));
    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("datetime(UTC),day,start,end,views,vidA"));
    assert_eq!(
        lines.next(),
        Some("2024-01-02 20:00:00+00:00,Tue,20:00,21:00,5,10")
    );
    assert_eq!(
        text.lines().nth(5),
        Some("2024-01-03 00:00:00+00:00,Wed,00:00,01:00,missing,missing")
    );
    assert_eq!(
        text.lines().nth(7),
        Some("2024-01-03 02:00:00+00:00,Wed,02:00,03:00,1,")
    );

    let reloaded = CsvStore::new(dir.path())
        .load(&channel_key())
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.len(), 8);
    assert_eq!(reloaded.value(4, "views"), Some(&Value::Missing));
    assert_eq!(reloaded.value(0, "vidA"), Some(&Value::Int(10)));
}
