//! Normalization of raw column values into typed record fields.
//!
//! JSON columns may arrive either as structured JSON (the normal JSONB path)
//! or as JSON-encoded text (rows written by older tooling, or columns read
//! through a text cast). Both are handled by one decode-if-string step so
//! the rest of the code only ever sees structured values.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{parse_timestamp, PlayerStats, TagMap, Timestamp};
use crate::validation::tags_from_list;

/// A column value could not be turned into its typed form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("Column '{column}' holds malformed JSON text: {message}")]
    MalformedJson {
        column: &'static str,
        message: String,
    },

    #[error("Column '{column}' has an unexpected shape: expected {expected}")]
    UnexpectedShape {
        column: &'static str,
        expected: &'static str,
    },

    #[error("Column '{column}' holds an unparseable timestamp '{value}'")]
    InvalidTimestamp { column: &'static str, value: String },
}

/// Decode a JSON column value: encoded text is parsed, anything else is
/// passed through unchanged.
pub fn decode_json_column(column: &'static str, value: Value) -> Result<Value, ProjectionError> {
    match value {
        Value::String(text) => {
            serde_json::from_str(&text).map_err(|e| ProjectionError::MalformedJson {
                column,
                message: e.to_string(),
            })
        }
        other => Ok(other),
    }
}

fn decode_as<T: DeserializeOwned>(
    column: &'static str,
    expected: &'static str,
    value: Value,
) -> Result<T, ProjectionError> {
    let decoded = decode_json_column(column, value)?;
    serde_json::from_value(decoded).map_err(|_| ProjectionError::UnexpectedShape { column, expected })
}

/// `teams`: a list of names. SQL NULL becomes an empty list.
pub fn decode_teams(value: Option<Value>) -> Result<Vec<String>, ProjectionError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => decode_as("teams", "an array of strings", v),
    }
}

/// `tags`: returned in canonical mapping form. A stored list of labels is
/// converted to `{label: true}`.
pub fn decode_tags(value: Option<Value>) -> Result<Option<TagMap>, ProjectionError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match decode_json_column("tags", value)? {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        Value::Array(items) => {
            let labels = items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    _ => Err(ProjectionError::UnexpectedShape {
                        column: "tags",
                        expected: "an object or an array of strings",
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(tags_from_list(labels)))
        }
        _ => Err(ProjectionError::UnexpectedShape {
            column: "tags",
            expected: "an object or an array of strings",
        }),
    }
}

/// `player_stats`: player name to (stat name to number or text).
pub fn decode_player_stats(value: Option<Value>) -> Result<Option<PlayerStats>, ProjectionError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => {
            let decoded = decode_json_column("player_stats", v)?;
            if decoded.is_null() {
                return Ok(None);
            }
            serde_json::from_value(decoded)
                .map(Some)
                .map_err(|_| ProjectionError::UnexpectedShape {
                    column: "player_stats",
                    expected: "an object of objects",
                })
        }
    }
}

/// Parse a timestamp column that arrived as text.
pub fn decode_timestamp_text(
    column: &'static str,
    text: &str,
) -> Result<Timestamp, ProjectionError> {
    parse_timestamp(text).ok_or_else(|| ProjectionError::InvalidTimestamp {
        column,
        value: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn structured_and_encoded_json_decode_the_same() {
        let structured = decode_json_column("teams", json!(["X", "Y"])).unwrap();
        let encoded = decode_json_column("teams", json!("[\"X\",\"Y\"]")).unwrap();
        assert_eq!(structured, encoded);
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert_matches!(
            decode_json_column("teams", json!("[oops")),
            Err(ProjectionError::MalformedJson { column: "teams", .. })
        );
    }

    #[test]
    fn teams_round_trip() {
        assert_eq!(decode_teams(Some(json!(["X", "Y"]))).unwrap(), vec!["X", "Y"]);
        assert_eq!(
            decode_teams(Some(json!("[\"X\",\"Y\"]"))).unwrap(),
            vec!["X", "Y"]
        );
        assert!(decode_teams(None).unwrap().is_empty());
        assert_matches!(
            decode_teams(Some(json!({"a": 1}))),
            Err(ProjectionError::UnexpectedShape { column: "teams", .. })
        );
    }

    #[test]
    fn tags_mapping_passes_through() {
        let tags = decode_tags(Some(json!({"a": 1}))).unwrap().unwrap();
        assert_eq!(Value::Object(tags), json!({"a": 1}));

        let from_text = decode_tags(Some(json!("{\"a\":1}"))).unwrap().unwrap();
        assert_eq!(Value::Object(from_text), json!({"a": 1}));
    }

    #[test]
    fn legacy_tag_list_becomes_mapping() {
        let tags = decode_tags(Some(json!(["highlight", "final"]))).unwrap().unwrap();
        assert_eq!(Value::Object(tags), json!({"final": true, "highlight": true}));
    }

    #[test]
    fn null_tags_and_stats_are_absent() {
        assert_eq!(decode_tags(None).unwrap(), None);
        assert_eq!(decode_tags(Some(Value::Null)).unwrap(), None);
        assert_eq!(decode_player_stats(Some(Value::Null)).unwrap(), None);
    }

    #[test]
    fn player_stats_accept_numbers_and_text() {
        let stats = decode_player_stats(Some(json!({
            "Messi": {"goals": 2, "position": "forward"}
        })))
        .unwrap()
        .unwrap();
        let messi = &stats["Messi"];
        assert_eq!(
            serde_json::to_value(messi).unwrap(),
            json!({"goals": 2, "position": "forward"})
        );
    }

    #[test]
    fn timestamp_text_fallback() {
        assert_eq!(
            decode_timestamp_text("created_at", "2024-07-14 19:00:00+00").unwrap(),
            Utc.with_ymd_and_hms(2024, 7, 14, 19, 0, 0).unwrap()
        );
        assert_matches!(
            decode_timestamp_text("created_at", "yesterday"),
            Err(ProjectionError::InvalidTimestamp { .. })
        );
    }
}
