use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Canonical tag representation: tag name to arbitrary JSON value.
///
/// `serde_json::Map` is ordered by key, so two maps with the same entries
/// serialize identically regardless of insertion order.
pub type TagMap = serde_json::Map<String, serde_json::Value>;

/// A single player statistic: either numeric or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(serde_json::Number),
    Text(String),
}

/// Player name to (stat name to value).
pub type PlayerStats = BTreeMap<String, BTreeMap<String, StatValue>>;

/// Parse a timestamp supplied as text.
///
/// Accepts RFC 3339 (`2024-07-14T19:00:00Z`), the PostgreSQL text rendering
/// of `TIMESTAMPTZ` (`2024-07-14 19:00:00+00`), a naive date-time (taken as
/// UTC) and a bare date (`2024-07-14`, midnight UTC).
pub fn parse_timestamp(input: &str) -> Option<Timestamp> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(ts) = chrono::DateTime::parse_from_str(input, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Serde adapter for optional timestamps supplied as text in any form
/// [`parse_timestamp`] accepts. `null`, a missing field and `""` are all
/// absent.
pub mod optional_timestamp {
    use serde::de::{self, Deserialize, Deserializer};

    use super::{parse_timestamp, Timestamp};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_timestamp(text)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{text}'"))),
        }
    }
}
