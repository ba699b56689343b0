//! Field validation for video metadata records.
//!
//! Applied on create and update only. Filters are never validated against
//! these rules; a filter for an unknown game type simply matches nothing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::TagMap;

/* --------------------------------------------------------------------------
   Vocabulary and limits
   -------------------------------------------------------------------------- */

/// The closed set of recognized game types (compared case-insensitively).
pub const VALID_GAME_TYPES: &[&str] = &[
    "football",
    "basketball",
    "soccer",
    "baseball",
    "hockey",
    "tennis",
    "golf",
    "volleyball",
    "rugby",
    "cricket",
    "american-football",
    "esports",
    "boxing",
    "mma",
    "other",
];

pub const MIN_TEAMS: usize = 1;
pub const MAX_TEAMS: usize = 10;

/// 24 hours.
pub const MAX_DURATION_SECONDS: i32 = 86_400;

pub const MAX_SCORE_LEN: usize = 200;

pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_LEN: usize = 50;

pub const MAX_TITLE_LEN: usize = 255;

/* --------------------------------------------------------------------------
   Errors
   -------------------------------------------------------------------------- */

/// A record field failed validation. Raised before any store access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataValidationError {
    #[error("Invalid game type '{0}'")]
    InvalidGameType(String),

    #[error("Invalid teams: {0}")]
    InvalidTeams(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid score: {0}")]
    InvalidScore(String),

    #[error("Invalid tags: {0}")]
    InvalidTags(String),

    #[error("Invalid title: {0}")]
    InvalidTitle(String),
}

/* --------------------------------------------------------------------------
   Field validators
   -------------------------------------------------------------------------- */

pub fn is_valid_game_type(game_type: &str) -> bool {
    let lowered = game_type.to_lowercase();
    VALID_GAME_TYPES.contains(&lowered.as_str())
}

/// Validate a game type and return its stored (lower-cased) form.
pub fn normalize_game_type(game_type: &str) -> Result<String, MetadataValidationError> {
    if is_valid_game_type(game_type) {
        Ok(game_type.to_lowercase())
    } else {
        Err(MetadataValidationError::InvalidGameType(game_type.to_string()))
    }
}

pub fn validate_title(title: &str) -> Result<(), MetadataValidationError> {
    if title.trim().is_empty() {
        return Err(MetadataValidationError::InvalidTitle(
            "Title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(MetadataValidationError::InvalidTitle(format!(
            "Title too long (max {MAX_TITLE_LEN} characters)"
        )));
    }
    Ok(())
}

/// 1 to 10 teams, each a non-blank name.
pub fn validate_teams<S: AsRef<str>>(teams: &[S]) -> Result<(), MetadataValidationError> {
    if teams.len() < MIN_TEAMS {
        return Err(MetadataValidationError::InvalidTeams(
            "At least one team is required".to_string(),
        ));
    }
    if teams.len() > MAX_TEAMS {
        return Err(MetadataValidationError::InvalidTeams(format!(
            "Maximum {MAX_TEAMS} teams allowed"
        )));
    }
    if teams.iter().any(|t| t.as_ref().trim().is_empty()) {
        return Err(MetadataValidationError::InvalidTeams(
            "Each team must be a non-empty string".to_string(),
        ));
    }
    Ok(())
}

/// Absent durations are fine.
pub fn validate_duration(duration: Option<i32>) -> Result<(), MetadataValidationError> {
    match duration {
        Some(d) if d < 0 => Err(MetadataValidationError::InvalidDuration(
            "Duration must be a positive number".to_string(),
        )),
        Some(d) if d > MAX_DURATION_SECONDS => Err(MetadataValidationError::InvalidDuration(
            "Duration cannot exceed 24 hours".to_string(),
        )),
        _ => Ok(()),
    }
}

pub fn validate_score(score: Option<&str>) -> Result<(), MetadataValidationError> {
    match score {
        Some(s) if s.chars().count() > MAX_SCORE_LEN => Err(MetadataValidationError::InvalidScore(
            format!("Score description too long (max {MAX_SCORE_LEN} characters)"),
        )),
        _ => Ok(()),
    }
}

fn validate_tag_labels<'a>(
    labels: impl ExactSizeIterator<Item = &'a str>,
) -> Result<(), MetadataValidationError> {
    if labels.len() > MAX_TAGS {
        return Err(MetadataValidationError::InvalidTags(format!(
            "Maximum {MAX_TAGS} tags allowed"
        )));
    }
    for label in labels {
        if label.trim().is_empty() {
            return Err(MetadataValidationError::InvalidTags(
                "Each tag must be a non-empty string".to_string(),
            ));
        }
        if label.chars().count() > MAX_TAG_LEN {
            return Err(MetadataValidationError::InvalidTags(format!(
                "Each tag must be at most {MAX_TAG_LEN} characters"
            )));
        }
    }
    Ok(())
}

/// Sequence-form tags: at most 20 non-blank labels of up to 50 characters.
pub fn validate_tag_list<S: AsRef<str>>(tags: &[S]) -> Result<(), MetadataValidationError> {
    validate_tag_labels(tags.iter().map(|t| t.as_ref()))
}

/// Mapping-form tags: the same rules applied to the keys.
pub fn validate_tag_map(tags: &TagMap) -> Result<(), MetadataValidationError> {
    validate_tag_labels(tags.keys().map(String::as_str))
}

/// Convert sequence-form tags to the canonical `{tag: true}` mapping.
pub fn tags_from_list<I, S>(tags: I) -> TagMap
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tags.into_iter()
        .map(|t| (t.into(), Value::Bool(true)))
        .collect()
}

/* --------------------------------------------------------------------------
   Tag input
   -------------------------------------------------------------------------- */

/// Tags as supplied by a caller: either a list of labels or a mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Map(TagMap),
}

impl TagsInput {
    /// Validate with the rules for the supplied form, then return the
    /// canonical mapping.
    pub fn into_validated_map(self) -> Result<TagMap, MetadataValidationError> {
        match self {
            TagsInput::List(list) => {
                validate_tag_list(&list)?;
                Ok(tags_from_list(list))
            }
            TagsInput::Map(map) => {
                validate_tag_map(&map)?;
                Ok(map)
            }
        }
    }

    /// The canonical mapping without validation; used for filters.
    pub fn into_map(self) -> TagMap {
        match self {
            TagsInput::List(list) => tags_from_list(list),
            TagsInput::Map(map) => map,
        }
    }
}

/* --------------------------------------------------------------------------
   Tests
   -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    // -- game type -----------------------------------------------------------

    #[test]
    fn game_type_is_case_insensitive_and_stored_lowercase() {
        assert!(is_valid_game_type("Soccer"));
        assert_eq!(normalize_game_type("BASKETBALL").unwrap(), "basketball");
        assert_eq!(
            normalize_game_type("American-Football").unwrap(),
            "american-football"
        );
    }

    #[test]
    fn unknown_game_type_is_rejected() {
        assert_matches!(
            normalize_game_type("chess"),
            Err(MetadataValidationError::InvalidGameType(g)) if g == "chess"
        );
        assert!(!is_valid_game_type(""));
    }

    // -- teams ---------------------------------------------------------------

    #[test]
    fn teams_bounds() {
        assert!(validate_teams(&["Spain"]).is_ok());
        assert!(validate_teams(&vec!["T"; 10]).is_ok());
        assert_matches!(
            validate_teams::<&str>(&[]),
            Err(MetadataValidationError::InvalidTeams(_))
        );
        assert_matches!(
            validate_teams(&vec!["T"; 11]),
            Err(MetadataValidationError::InvalidTeams(msg)) if msg.contains("10")
        );
    }

    #[test]
    fn blank_team_name_is_rejected() {
        assert_matches!(
            validate_teams(&["Spain", "  "]),
            Err(MetadataValidationError::InvalidTeams(_))
        );
    }

    // -- duration / score / title -------------------------------------------

    #[test]
    fn duration_bounds() {
        assert!(validate_duration(None).is_ok());
        assert!(validate_duration(Some(0)).is_ok());
        assert!(validate_duration(Some(MAX_DURATION_SECONDS)).is_ok());
        assert_matches!(
            validate_duration(Some(-1)),
            Err(MetadataValidationError::InvalidDuration(_))
        );
        assert_matches!(
            validate_duration(Some(MAX_DURATION_SECONDS + 1)),
            Err(MetadataValidationError::InvalidDuration(_))
        );
    }

    #[test]
    fn score_length_limit() {
        assert!(validate_score(None).is_ok());
        assert!(validate_score(Some("2-1")).is_ok());
        let long = "x".repeat(MAX_SCORE_LEN + 1);
        assert_matches!(
            validate_score(Some(&long)),
            Err(MetadataValidationError::InvalidScore(_))
        );
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(validate_title("Final").is_ok());
        assert_matches!(
            validate_title("   "),
            Err(MetadataValidationError::InvalidTitle(_))
        );
    }

    // -- tags ----------------------------------------------------------------

    #[test]
    fn tag_list_limits() {
        assert!(validate_tag_list(&["highlight", "final"]).is_ok());
        assert_matches!(
            validate_tag_list(&vec!["t"; MAX_TAGS + 1]),
            Err(MetadataValidationError::InvalidTags(_))
        );
        assert_matches!(
            validate_tag_list(&[""]),
            Err(MetadataValidationError::InvalidTags(_))
        );
        let long = "x".repeat(MAX_TAG_LEN + 1);
        assert_matches!(
            validate_tag_list(&[long.as_str()]),
            Err(MetadataValidationError::InvalidTags(_))
        );
        let exact = "x".repeat(MAX_TAG_LEN);
        assert!(validate_tag_list(&[exact.as_str()]).is_ok());
    }

    #[test]
    fn tag_list_converts_to_mapping() {
        let input: TagsInput = serde_json::from_value(json!(["highlight", "final"])).unwrap();
        let map = input.into_validated_map().unwrap();
        assert_eq!(
            Value::Object(map),
            json!({"highlight": true, "final": true})
        );
    }

    #[test]
    fn tag_mapping_keys_are_validated() {
        let input: TagsInput = serde_json::from_value(json!({" ": 1})).unwrap();
        assert_matches!(
            input.into_validated_map(),
            Err(MetadataValidationError::InvalidTags(_))
        );

        let ok: TagsInput = serde_json::from_value(json!({"camera": "wide"})).unwrap();
        assert_eq!(Value::Object(ok.into_validated_map().unwrap()), json!({"camera": "wide"}));
    }
}
