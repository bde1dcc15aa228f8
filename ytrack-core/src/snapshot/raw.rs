use serde_json::Value as Json;
use ytrack_types::YtrackError;

use super::label::{detect_range_separator, is_range_separator};

const FIRST_LABEL: &str = "/last48HoursData/mainChart/data/0/hovercardInfo/domainText";

/// A raw analytics snapshot, either live or replayed from a capture.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSnapshot {
    /// Captured text of the snapshot object, possibly with leading page noise.
    Text(String),
    /// A structured value straight from the page.
    Value(Json),
}

impl RawSnapshot {
    /// Structured form of the snapshot.
    ///
    /// Text captures are trimmed to the JSON object and, when their first
    /// bucket label uses a locale dash between the clock times, that dash is
    /// replaced by a plain hyphen throughout before the final parse.
    ///
    /// # Errors
    /// Returns `MalformedSnapshot` if the text is not a JSON document.
    pub fn into_value(self) -> Result<Json, YtrackError> {
        match self {
            Self::Value(v) => Ok(v),
            Self::Text(text) => parse_text(&text),
        }
    }
}

impl From<Json> for RawSnapshot {
    fn from(v: Json) -> Self {
        Self::Value(v)
    }
}

impl From<String> for RawSnapshot {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Strip anything before the first `{` and trailing spaces, newlines and
/// zero-width spaces.
fn clean(text: &str) -> Result<&str, YtrackError> {
    let start = text
        .find('{')
        .ok_or_else(|| YtrackError::malformed("text capture contains no JSON object"))?;
    Ok(text[start..].trim_end_matches([' ', '\n', '\r', '\u{200b}']))
}

fn parse_text(text: &str) -> Result<Json, YtrackError> {
    let body = clean(text)?;
    let value: Json = serde_json::from_str(body)?;
    let dash = value
        .pointer(FIRST_LABEL)
        .and_then(Json::as_str)
        .and_then(detect_range_separator)
        .filter(|&c| c != '-' && is_range_separator(c));
    match dash {
        Some(c) => Ok(serde_json::from_str(&body.replace(c, "-"))?),
        None => Ok(value),
    }
}
