//! `video_metadata` rows, the typed entity, and create/update DTOs.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Postgres, Row};
use vidcat_core::projection::{
    decode_player_stats, decode_tags, decode_teams, decode_timestamp_text, ProjectionError,
};
use vidcat_core::query_options::{Column, Projection};
use vidcat_core::stats::VideoFacts;
use vidcat_core::types::{optional_timestamp, DbId, PlayerStats, TagMap, Timestamp};
use vidcat_core::validation::{
    normalize_game_type, validate_duration, validate_score, validate_teams, validate_title,
    MetadataValidationError, TagsInput,
};

// ---------------------------------------------------------------------------
// Raw row
// ---------------------------------------------------------------------------

/// A `video_metadata` row as fetched, with every column optional.
///
/// Columns that were not selected decode as `None`, so the same type serves
/// full and projected queries. JSON columns are normalized through the
/// decode-if-string step; timestamps fall back to parsing text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoMetadataRow {
    pub id: Option<DbId>,
    pub title: Option<String>,
    pub game_type: Option<String>,
    pub teams: Option<Vec<String>>,
    pub score: Option<String>,
    pub winner: Option<String>,
    pub duration_seconds: Option<i32>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub tags: Option<TagMap>,
    pub player_stats: Option<PlayerStats>,
    pub match_date: Option<Timestamp>,
    pub venue: Option<String>,
    pub league: Option<String>,
    pub season: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

fn projection_error(column: &str, err: ProjectionError) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    }
}

/// Read a column that may be absent from the result set.
fn optional<'r, T>(row: &'r PgRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    match row.try_get::<Option<T>, _>(column) {
        Err(sqlx::Error::ColumnNotFound(_)) => Ok(None),
        other => other,
    }
}

/// Read a JSON column, accepting JSONB or JSON-encoded text.
fn json_column(row: &PgRow, column: &str) -> Result<Option<serde_json::Value>, sqlx::Error> {
    match optional::<serde_json::Value>(row, column) {
        Err(sqlx::Error::ColumnDecode { .. }) => {
            Ok(optional::<String>(row, column)?.map(serde_json::Value::String))
        }
        other => other,
    }
}

/// Read a timestamp column, accepting TIMESTAMPTZ or its text rendering.
fn timestamp_column(row: &PgRow, column: &'static str) -> Result<Option<Timestamp>, sqlx::Error> {
    match optional::<Timestamp>(row, column) {
        Err(sqlx::Error::ColumnDecode { .. }) => optional::<String>(row, column)?
            .map(|text| decode_timestamp_text(column, &text))
            .transpose()
            .map_err(|e| projection_error(column, e)),
        other => other,
    }
}

impl<'r> FromRow<'r, PgRow> for VideoMetadataRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let teams = match json_column(row, "teams")? {
            Some(value) => Some(decode_teams(Some(value)).map_err(|e| projection_error("teams", e))?),
            None => None,
        };
        let tags = decode_tags(json_column(row, "tags")?).map_err(|e| projection_error("tags", e))?;
        let player_stats = decode_player_stats(json_column(row, "player_stats")?)
            .map_err(|e| projection_error("player_stats", e))?;

        Ok(Self {
            id: optional(row, "id")?,
            title: optional(row, "title")?,
            game_type: optional(row, "game_type")?,
            teams,
            score: optional(row, "score")?,
            winner: optional(row, "winner")?,
            duration_seconds: optional(row, "duration_seconds")?,
            video_url: optional(row, "video_url")?,
            thumbnail_url: optional(row, "thumbnail_url")?,
            description: optional(row, "description")?,
            tags,
            player_stats,
            match_date: timestamp_column(row, "match_date")?,
            venue: optional(row, "venue")?,
            league: optional(row, "league")?,
            season: optional(row, "season")?,
            created_at: timestamp_column(row, "created_at")?,
            updated_at: timestamp_column(row, "updated_at")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A complete `video_metadata` record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoMetadata {
    pub id: DbId,
    pub title: String,
    pub game_type: String,
    pub teams: Vec<String>,
    pub score: Option<String>,
    pub winner: Option<String>,
    pub duration_seconds: Option<i32>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub tags: Option<TagMap>,
    pub player_stats: Option<PlayerStats>,
    pub match_date: Option<Timestamp>,
    pub venue: Option<String>,
    pub league: Option<String>,
    pub season: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl VideoMetadata {
    pub fn facts(&self) -> VideoFacts<'_> {
        VideoFacts {
            game_type: &self.game_type,
            teams: &self.teams,
            league: self.league.as_deref(),
            duration_seconds: self.duration_seconds,
            match_date: self.match_date,
        }
    }
}

fn required<T>(value: Option<T>, column: &str) -> Result<T, sqlx::Error> {
    value.ok_or_else(|| sqlx::Error::ColumnNotFound(column.to_string()))
}

impl TryFrom<VideoMetadataRow> for VideoMetadata {
    type Error = sqlx::Error;

    fn try_from(row: VideoMetadataRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: required(row.id, "id")?,
            title: required(row.title, "title")?,
            game_type: required(row.game_type, "game_type")?,
            teams: row.teams.unwrap_or_default(),
            score: row.score,
            winner: row.winner,
            duration_seconds: row.duration_seconds,
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
            description: row.description,
            tags: row.tags,
            player_stats: row.player_stats,
            match_date: row.match_date,
            venue: row.venue,
            league: row.league,
            season: row.season,
            created_at: required(row.created_at, "created_at")?,
            updated_at: required(row.updated_at, "updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for VideoMetadata {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        VideoMetadataRow::from_row(row)?.try_into()
    }
}

// ---------------------------------------------------------------------------
// Projected record
// ---------------------------------------------------------------------------

/// A row returned by a filtered query, serialized with exactly the columns
/// the projection asked for (all columns when nothing was requested).
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedVideoMetadata {
    pub projection: Projection,
    pub row: VideoMetadataRow,
}

impl ProjectedVideoMetadata {
    pub fn columns(&self) -> Vec<Column> {
        match &self.projection {
            Projection::All => Column::ALL.to_vec(),
            Projection::Columns(columns) => columns.clone(),
        }
    }
}

impl Serialize for ProjectedVideoMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.columns();
        let row = &self.row;
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for column in columns {
            let key = column.as_str();
            match column {
                Column::Id => map.serialize_entry(key, &row.id)?,
                Column::Title => map.serialize_entry(key, &row.title)?,
                Column::GameType => map.serialize_entry(key, &row.game_type)?,
                Column::Teams => map.serialize_entry(key, &row.teams)?,
                Column::Score => map.serialize_entry(key, &row.score)?,
                Column::Winner => map.serialize_entry(key, &row.winner)?,
                Column::DurationSeconds => map.serialize_entry(key, &row.duration_seconds)?,
                Column::VideoUrl => map.serialize_entry(key, &row.video_url)?,
                Column::ThumbnailUrl => map.serialize_entry(key, &row.thumbnail_url)?,
                Column::Description => map.serialize_entry(key, &row.description)?,
                Column::Tags => map.serialize_entry(key, &row.tags)?,
                Column::PlayerStats => map.serialize_entry(key, &row.player_stats)?,
                Column::MatchDate => map.serialize_entry(key, &row.match_date)?,
                Column::Venue => map.serialize_entry(key, &row.venue)?,
                Column::League => map.serialize_entry(key, &row.league)?,
                Column::Season => map.serialize_entry(key, &row.season)?,
                Column::CreatedAt => map.serialize_entry(key, &row.created_at)?,
                Column::UpdatedAt => map.serialize_entry(key, &row.updated_at)?,
            }
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// Payload for creating a record. Accepts snake_case and camelCase keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateVideoMetadata {
    pub title: String,
    #[serde(alias = "gameType")]
    pub game_type: String,
    pub teams: Vec<String>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default, alias = "durationSeconds")]
    pub duration_seconds: Option<i32>,
    #[serde(default, alias = "videoUrl")]
    pub video_url: Option<String>,
    #[serde(default, alias = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
    #[serde(default, alias = "playerStats")]
    pub player_stats: Option<PlayerStats>,
    #[serde(default, alias = "matchDate", deserialize_with = "optional_timestamp::deserialize")]
    pub match_date: Option<Timestamp>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
}

/// A create payload that passed validation, in stored form: game type
/// lower-cased, tags in mapping form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideoMetadata {
    pub title: String,
    pub game_type: String,
    pub teams: Vec<String>,
    pub score: Option<String>,
    pub winner: Option<String>,
    pub duration_seconds: Option<i32>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub tags: Option<TagMap>,
    pub player_stats: Option<PlayerStats>,
    pub match_date: Option<Timestamp>,
    pub venue: Option<String>,
    pub league: Option<String>,
    pub season: Option<String>,
}

impl CreateVideoMetadata {
    /// Check every field and convert to stored form.
    pub fn validate(self) -> Result<NewVideoMetadata, MetadataValidationError> {
        validate_title(&self.title)?;
        let game_type = normalize_game_type(&self.game_type)?;
        validate_teams(&self.teams)?;
        validate_duration(self.duration_seconds)?;
        validate_score(self.score.as_deref())?;
        let tags = self.tags.map(TagsInput::into_validated_map).transpose()?;

        Ok(NewVideoMetadata {
            title: self.title,
            game_type,
            teams: self.teams,
            score: self.score,
            winner: self.winner,
            duration_seconds: self.duration_seconds,
            video_url: self.video_url,
            thumbnail_url: self.thumbnail_url,
            description: self.description,
            tags,
            player_stats: self.player_stats,
            match_date: self.match_date,
            venue: self.venue,
            league: self.league,
            season: self.season,
        })
    }
}

/// Payload for a partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVideoMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "gameType")]
    pub game_type: Option<String>,
    #[serde(default)]
    pub teams: Option<Vec<String>>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default, alias = "durationSeconds")]
    pub duration_seconds: Option<i32>,
    #[serde(default, alias = "videoUrl")]
    pub video_url: Option<String>,
    #[serde(default, alias = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
    #[serde(default, alias = "playerStats")]
    pub player_stats: Option<PlayerStats>,
    #[serde(default, alias = "matchDate", deserialize_with = "optional_timestamp::deserialize")]
    pub match_date: Option<Timestamp>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
}

/// Validated update in stored form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoMetadataChanges {
    pub title: Option<String>,
    pub game_type: Option<String>,
    pub teams: Option<Vec<String>>,
    pub score: Option<String>,
    pub winner: Option<String>,
    pub duration_seconds: Option<i32>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub tags: Option<TagMap>,
    pub player_stats: Option<PlayerStats>,
    pub match_date: Option<Timestamp>,
    pub venue: Option<String>,
    pub league: Option<String>,
    pub season: Option<String>,
}

impl UpdateVideoMetadata {
    /// Validate only the supplied fields.
    pub fn validate(self) -> Result<VideoMetadataChanges, MetadataValidationError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        let game_type = self
            .game_type
            .as_deref()
            .map(normalize_game_type)
            .transpose()?;
        if let Some(teams) = &self.teams {
            validate_teams(teams)?;
        }
        validate_duration(self.duration_seconds)?;
        validate_score(self.score.as_deref())?;
        let tags = self.tags.map(TagsInput::into_validated_map).transpose()?;

        Ok(VideoMetadataChanges {
            title: self.title,
            game_type,
            teams: self.teams,
            score: self.score,
            winner: self.winner,
            duration_seconds: self.duration_seconds,
            video_url: self.video_url,
            thumbnail_url: self.thumbnail_url,
            description: self.description,
            tags,
            player_stats: self.player_stats,
            match_date: self.match_date,
            venue: self.venue,
            league: self.league,
            season: self.season,
        })
    }
}
