use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde_json::{Value as Json, json};
use ytrack_core::snapshot::card::{parse_card, parse_last_updated};
use ytrack_core::{
    ParseOptions, RawSnapshot, Scope, TimestampSource, Value, YtrackError, attribute,
};

fn point(label: &str, y: i64) -> Json {
    json!({ "x": 0, "y": y, "hovercardInfo": { "domainText": label } })
}

fn channel_card(points: Vec<Json>, table: Vec<Json>) -> Json {
    json!({
        "lastUpdated": "2024-01-03T10:30:00.000",
        "last48HoursData": {
            "totalMetricValue": "1,500",
            "mainChart": { "data": points },
            "table": table,
        },
        "exploreConfig": {
            "restrictAndTimePeriodConfig": { "entity": { "id": "UCchannel" } }
        }
    })
}

fn at(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
}

fn views(snap: &ytrack_core::Snapshot) -> Vec<Option<&Value>> {
    let id = snap.columns.get("views").unwrap();
    snap.buckets.iter().map(|b| b.get(id)).collect()
}

#[test]
fn labels_resolve_against_last_updated() {
    let card = channel_card(
        vec![
            point("Monday, 11:00 PM\u{2013}12:00 AM", 1),
            point("Yesterday, 12:00\u{2013}1:00 AM", 2),
            point("Yesterday, 1:00\u{2013}2:00 AM", 3),
        ],
        vec![],
    );
    let snap = parse_card(
        RawSnapshot::Value(card),
        &Scope::Channel("UCchannel".into()),
        &ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(snap.timestamps(), vec![at(1, 23), at(2, 0), at(2, 1)]);
    assert_eq!(snap.granularity, TimeDelta::hours(1));
    assert_eq!(snap.entity_id.as_deref(), Some("UCchannel"));
    assert_eq!(
        views(&snap),
        vec![Some(&Value::Int(1)), Some(&Value::Int(2)), Some(&Value::Int(3))]
    );
}

#[test]
fn out_of_order_points_carry_their_weights() {
    let card = channel_card(
        vec![
            point("Today, 9:00\u{2013}10:00 AM", 9),
            point("Today, 8:00\u{2013}9:00 AM", 8),
        ],
        vec![json!({
            "title": "A video",
            "value": "1,000",
            "sparkChartPercentages": [75, 25],
            "analyticsLink": { "routeLink": { "route": { "params": { "videoId": "vidA" } } } }
        })],
    );
    let mut snap = parse_card(
        RawSnapshot::Value(card),
        &Scope::Channel("UCchannel".into()),
        &ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(snap.timestamps(), vec![at(3, 8), at(3, 9)]);
    let outcome = attribute(&mut snap);
    assert!(outcome.failures.is_empty());
    let vid = snap.columns.get("vidA").unwrap();
    assert_eq!(snap.buckets[0].get(vid), Some(&Value::Int(250)));
    assert_eq!(snap.buckets[1].get(vid), Some(&Value::Int(750)));
    assert_eq!(views(&snap)[0], Some(&Value::Int(8)));
}

#[test]
fn thumbnail_fallback_names_the_column() {
    let card = channel_card(
        vec![
            point("Today, 8:00\u{2013}9:00 AM", 1),
            point("Today, 9:00\u{2013}10:00 AM", 1),
        ],
        vec![json!({
            "title": "Thumb only",
            "value": "10",
            "sparkChartPercentages": [1.5, 0.5],
            "thumbnailData": { "thumbnailUrl": "https://i.ytimg.com/vi/thumbVid/mqdefault.jpg" }
        })],
    );
    let mut snap = parse_card(
        RawSnapshot::Value(card),
        &Scope::Channel("UCchannel".into()),
        &ParseOptions::default(),
    )
    .unwrap();
    let outcome = attribute(&mut snap);
    assert_eq!(outcome.attributed, vec!["thumbVid".to_string()]);
}

#[test]
fn video_cards_attribute_traffic_sources() {
    let card = channel_card(
        vec![
            point("Today, 8:00\u{2013}9:00 AM", 1),
            point("Today, 9:00\u{2013}10:00 AM", 1),
        ],
        vec![json!({
            "title": "External",
            "value": "20%",
            "sparkChartPercentages": [1, 1]
        })],
    );
    let mut snap = parse_card(
        RawSnapshot::Value(card),
        &Scope::Video("vidA".into()),
        &ParseOptions::default(),
    )
    .unwrap();
    let outcome = attribute(&mut snap);
    assert!(outcome.failures.is_empty());
    let ext = snap.columns.get("External").unwrap();
    assert_eq!(snap.buckets[0].get(ext), Some(&Value::Int(150)));
}

#[test]
fn text_dumps_with_locale_dashes_parse() {
    let card = channel_card(
        vec![
            point("Today, 8:00\u{2012}9:00 AM", 1),
            point("Today, 9:00\u{2012}10:00 AM", 2),
        ],
        vec![],
    );
    let text = format!("<body>{card}</body>\n");
    let text = text.trim_end_matches("</body>\n").to_string();
    let snap = parse_card(
        RawSnapshot::Text(text),
        &Scope::Channel("UCchannel".into()),
        &ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(snap.timestamps(), vec![at(3, 8), at(3, 9)]);
}

#[test]
fn labels_are_local_to_the_dashboard_zone() {
    let card = channel_card(
        vec![
            point("Today, 8:00\u{2013}9:00 AM", 1),
            point("Today, 9:00\u{2013}10:00 AM", 1),
        ],
        vec![],
    );
    let opts = ParseOptions {
        timezone: chrono_tz::America::New_York,
        ..ParseOptions::default()
    };
    let snap = parse_card(RawSnapshot::Value(card), &Scope::Channel("UC".into()), &opts).unwrap();
    assert_eq!(snap.timestamps(), vec![at(3, 13), at(3, 14)]);
}

#[test]
fn repeated_fall_back_hour_maps_to_both_instants() {
    let mut card = channel_card(
        vec![
            point("Today, 12:00\u{2013}1:00 AM", 1),
            point("Today, 1:00\u{2013}2:00 AM", 2),
            point("Today, 1:00\u{2013}2:00 AM", 3),
            point("Today, 2:00\u{2013}3:00 AM", 4),
            point("Today, 3:00\u{2013}4:00 AM", 5),
        ],
        vec![],
    );
    card["lastUpdated"] = json!("2024-11-03T03:30:00.000");
    let opts = ParseOptions {
        timezone: chrono_tz::America::New_York,
        ..ParseOptions::default()
    };
    let snap = parse_card(RawSnapshot::Value(card), &Scope::Channel("UC".into()), &opts).unwrap();
    let nov3 = |h| Utc.with_ymd_and_hms(2024, 11, 3, h, 0, 0).unwrap();
    assert_eq!(
        snap.timestamps(),
        vec![nov3(4), nov3(5), nov3(6), nov3(7), nov3(8)]
    );
    assert_eq!(snap.granularity, TimeDelta::hours(1));
    assert_eq!(views(&snap)[2], Some(&Value::Int(3)));
}

#[test]
fn fractional_epoch_millis_are_rejected() {
    let card = json!({
        "last48HoursData": {
            "mainChart": { "data": [
                { "x": 1_704_067_200_000.5_f64, "y": 4 },
                { "x": 1_704_070_800_000_i64, "y": 5 }
            ] }
        }
    });
    let opts = ParseOptions {
        timestamp_source: TimestampSource::Epoch,
        ..ParseOptions::default()
    };
    assert!(matches!(
        parse_card(RawSnapshot::Value(card), &Scope::Channel("UC".into()), &opts),
        Err(YtrackError::MalformedSnapshot(_))
    ));
}

#[test]
fn epoch_mode_ignores_labels() {
    let card = json!({
        "last48HoursData": {
            "mainChart": { "data": [
                { "x": 1_704_067_200_000_i64, "y": 4, "hovercardInfo": { "domainText": "garbage" } },
                { "x": 1_704_070_800_000_i64, "y": 5 }
            ] }
        }
    });
    let opts = ParseOptions {
        timestamp_source: TimestampSource::Epoch,
        ..ParseOptions::default()
    };
    let snap = parse_card(RawSnapshot::Value(card), &Scope::Channel("UC".into()), &opts).unwrap();
    assert_eq!(snap.timestamps(), vec![at(1, 0), at(1, 1)]);
}

#[test]
fn malformed_cards_are_rejected() {
    let scope = Scope::Channel("UC".into());
    let opts = ParseOptions::default();

    let no_chart = json!({ "lastUpdated": "2024-01-03T10:30:00", "last48HoursData": {} });
    assert!(matches!(
        parse_card(RawSnapshot::Value(no_chart), &scope, &opts),
        Err(YtrackError::MalformedSnapshot(_))
    ));

    let empty = channel_card(vec![], vec![]);
    assert!(parse_card(RawSnapshot::Value(empty), &scope, &opts).is_err());

    let one_half = channel_card(vec![point("Today, 8:00 AM", 1)], vec![]);
    assert!(parse_card(RawSnapshot::Value(one_half), &scope, &opts).is_err());

    let duplicate = channel_card(
        vec![
            point("Today, 8:00\u{2013}9:00 AM", 1),
            point("Today, 8:00\u{2013}9:00 AM", 1),
        ],
        vec![],
    );
    assert!(parse_card(RawSnapshot::Value(duplicate), &scope, &opts).is_err());

    let mut no_anchor = channel_card(vec![point("Today, 8:00\u{2013}9:00 AM", 1)], vec![]);
    no_anchor.as_object_mut().unwrap().remove("lastUpdated");
    assert!(parse_card(RawSnapshot::Value(no_anchor), &scope, &opts).is_err());
}

#[test]
fn last_updated_accepts_offsets_and_naive_local_times() {
    assert_eq!(
        parse_last_updated("2024-01-03T10:30:00Z", chrono_tz::UTC).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 3, 10, 30, 0).unwrap()
    );
    assert_eq!(
        parse_last_updated("2024-01-03T10:30:00.123", chrono_tz::Europe::Amsterdam).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 3, 9, 30, 0).unwrap()
    );
    assert!(parse_last_updated("yesterday", chrono_tz::UTC).is_err());
}
