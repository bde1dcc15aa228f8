//! Grammar for the dashboard's relative bucket labels.
//!
//! A label reads `<day>, <start>–<end>`, e.g. `Monday, 1:00–2:00 PM` or
//! `Today, 11:00 AM–12:00 PM`. Parsing is two steps: tokenize the day name
//! and the clock range into a [`BucketLabel`], then resolve the day against a
//! [`DayTable`] anchored on the snapshot's "last updated" date.

use chrono::{Days, NaiveDate, NaiveTime, Weekday};
use ytrack_types::YtrackError;

/// Day part of a bucket label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayLabel {
    /// The day the snapshot was last updated.
    Today,
    /// One day before `Today`.
    Yesterday,
    /// An explicit weekday name.
    ///
    /// The rolling window spans at most three calendar days, so a weekday
    /// name always means two days before `Today`.
    Weekday(Weekday),
}

/// AM/PM marker on a clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    /// Before noon.
    Am,
    /// Noon and after.
    Pm,
}

/// A tokenized bucket label with times normalized to 24-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketLabel {
    /// Day the bucket starts on.
    pub day: DayLabel,
    /// Bucket start.
    pub start: NaiveTime,
    /// Bucket end.
    pub end: NaiveTime,
}

/// Maps day labels to calendar dates for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTable {
    today: NaiveDate,
}

impl DayTable {
    /// Table anchored on the snapshot's "last updated" date.
    #[must_use]
    pub const fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Calendar date of a day label.
    #[must_use]
    pub fn resolve(&self, day: DayLabel) -> NaiveDate {
        let back = match day {
            DayLabel::Today => 0,
            DayLabel::Yesterday => 1,
            DayLabel::Weekday(_) => 2,
        };
        self.today
            .checked_sub_days(Days::new(back))
            .unwrap_or(self.today)
    }
}

/// True for every dash-like character the dashboard uses between clock times.
#[must_use]
pub const fn is_range_separator(c: char) -> bool {
    matches!(
        c,
        '-' | '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}'
    )
}

/// The character separating the two clock times of `label`.
///
/// Scans past the day name, then past digits, colons, AM/PM letters and any
/// whitespace; the next character is the separator. Returns `None` if the
/// label has no comma or nothing follows the first clock time.
#[must_use]
pub fn detect_range_separator(label: &str) -> Option<char> {
    let (_, range) = label.split_once(',')?;
    range
        .chars()
        .find(|&c| !(c.is_whitespace() || c.is_ascii_digit() || matches!(c, ':' | 'A' | 'P' | 'M')))
}

fn parse_day(raw: &str) -> Option<DayLabel> {
    match raw {
        "Today" => Some(DayLabel::Today),
        "Yesterday" => Some(DayLabel::Yesterday),
        other => other.parse::<Weekday>().ok().map(DayLabel::Weekday),
    }
}

fn parse_meridiem(raw: &str) -> Option<Meridiem> {
    let letters: String = raw
        .chars()
        .filter(|c| *c != '.')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    match letters.as_str() {
        "AM" => Some(Meridiem::Am),
        "PM" => Some(Meridiem::Pm),
        _ => None,
    }
}

/// A clock time with an optional AM/PM marker, e.g. `1:00` or `11:00 PM`.
fn parse_half(raw: &str) -> Option<(u32, u32, Option<Meridiem>)> {
    let mut tokens = raw.split_whitespace();
    let clock = tokens.next()?;
    let meridiem = match tokens.next() {
        Some(t) => Some(parse_meridiem(t)?),
        None => None,
    };
    if tokens.next().is_some() {
        return None;
    }
    let (h, m) = clock.split_once(':')?;
    Some((h.parse().ok()?, m.parse().ok()?, meridiem))
}

fn to_24h(hour: u32, minute: u32, meridiem: Option<Meridiem>) -> Option<NaiveTime> {
    let hour = match meridiem {
        None => hour,
        Some(_) if !(1..=12).contains(&hour) => return None,
        Some(Meridiem::Am) => hour % 12,
        Some(Meridiem::Pm) => hour % 12 + 12,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Tokenize a bucket label.
///
/// When only one half carries an AM/PM marker it applies to both; when
/// neither does the times are read as 24-hour clock.
///
/// # Errors
/// Returns `MalformedSnapshot` if the day is unknown, the range does not split
/// into exactly two halves, or a half is not a valid clock time.
pub fn parse_bucket_label(label: &str) -> Result<BucketLabel, YtrackError> {
    let bad = |why: &str| YtrackError::malformed(format!("bucket label {label:?}: {why}"));

    let (day, range) = label.split_once(',').ok_or_else(|| bad("no day name"))?;
    let day = parse_day(day.trim()).ok_or_else(|| bad("unknown day name"))?;

    let halves: Vec<&str> = range.split(is_range_separator).collect();
    let [start, end] = halves.as_slice() else {
        return Err(bad("time range does not have exactly two halves"));
    };
    let (sh, sm, sp) = parse_half(start).ok_or_else(|| bad("unreadable start time"))?;
    let (eh, em, ep) = parse_half(end).ok_or_else(|| bad("unreadable end time"))?;
    let sp = sp.or(ep);
    let ep = ep.or(sp);

    Ok(BucketLabel {
        day,
        start: to_24h(sh, sm, sp).ok_or_else(|| bad("start time out of range"))?,
        end: to_24h(eh, em, ep).ok_or_else(|| bad("end time out of range"))?,
    })
}
