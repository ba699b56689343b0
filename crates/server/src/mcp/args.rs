//! Typed tool arguments.
//!
//! Each tool's `arguments` object is deserialized into one of these structs.
//! Keys are snake_case with camelCase aliases; unrecognized keys are ignored.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use vidcat_core::filter::{DateRange, TeamsFilter, TextFilters, VideoFilters};
use vidcat_core::query_options::{Projection, QueryError, QueryOptions};
use vidcat_core::types::{optional_timestamp, DbId, Timestamp};
use vidcat_core::validation::TagsInput;
use vidcat_db::models::video_metadata::{CreateVideoMetadata, UpdateVideoMetadata};

use crate::error::AppError;

/// Deserialize tool arguments. Missing or `null` arguments are read as `{}`.
pub fn parse<T: DeserializeOwned>(arguments: Option<Value>) -> Result<T, AppError> {
    let value = match arguments {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(value) => value,
    };
    serde_json::from_value(value).map_err(|err| AppError::InvalidParams(err.to_string()))
}

/* --------------------------------------------------------------------------
   Filters and query options
   -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterArgs {
    #[serde(default, alias = "gameType")]
    pub game_type: Option<String>,
    #[serde(default)]
    pub teams: Option<TeamsFilter>,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
    #[serde(
        default,
        alias = "matchDateStart",
        alias = "match_date_from",
        deserialize_with = "optional_timestamp::deserialize"
    )]
    pub match_date_start: Option<Timestamp>,
    #[serde(
        default,
        alias = "matchDateEnd",
        alias = "match_date_to",
        deserialize_with = "optional_timestamp::deserialize"
    )]
    pub match_date_end: Option<Timestamp>,
}

impl FilterArgs {
    pub fn into_filters(self) -> VideoFilters {
        VideoFilters {
            game_type: self.game_type,
            league: self.league,
            season: self.season,
            winner: self.winner,
            venue: self.venue,
            teams: self.teams,
            tags: self.tags.map(TagsInput::into_map),
            date_range: DateRange {
                start: self.match_date_start,
                end: self.match_date_end,
            },
            text: TextFilters::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryArgs {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default, alias = "orderBy")]
    pub order_by: Option<String>,
    #[serde(default, alias = "orderDirection")]
    pub order_direction: Option<String>,
    #[serde(default)]
    pub select: Option<Vec<String>>,
}

impl QueryArgs {
    /// Resolve names against the relation and check numeric bounds.
    pub fn into_options(self) -> Result<QueryOptions, QueryError> {
        let mut options = QueryOptions::default();
        if let Some(select) = &self.select {
            options.projection = Projection::parse(select)?;
        }
        if let Some(order_by) = &self.order_by {
            options.order_by = order_by.parse()?;
        }
        if let Some(direction) = &self.order_direction {
            options.direction = direction.parse()?;
        }
        options.limit = self.limit;
        options.offset = self.offset;
        options.validate()?;
        Ok(options)
    }
}

/* --------------------------------------------------------------------------
   Per-tool argument shapes
   -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct IdArgs {
    pub id: DbId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiltersQueryArgs {
    #[serde(default)]
    pub filters: FilterArgs,
    #[serde(default)]
    pub query: QueryArgs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchArgs {
    pub term: String,
    #[serde(default)]
    pub filters: FilterArgs,
    #[serde(default)]
    pub query: QueryArgs,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginatedArgs {
    #[serde(default)]
    pub filters: FilterArgs,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default, alias = "pageSize")]
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextSearchArgs {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "minDuration")]
    pub min_duration: Option<i32>,
    #[serde(default, alias = "maxDuration")]
    pub max_duration: Option<i32>,
    #[serde(default, alias = "hasPlayerStats")]
    pub has_player_stats: Option<bool>,
    #[serde(default, alias = "hasVideo")]
    pub has_video: Option<bool>,
    #[serde(default, alias = "hasThumbnail")]
    pub has_thumbnail: Option<bool>,
    #[serde(default)]
    pub query: QueryArgs,
}

impl TextSearchArgs {
    pub fn text_filters(&self) -> TextFilters {
        TextFilters {
            title: self.title.clone(),
            description: self.description.clone(),
            min_duration: self.min_duration,
            max_duration: self.max_duration,
            has_player_stats: self.has_player_stats,
            has_video: self.has_video,
            has_thumbnail: self.has_thumbnail,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateRangeArgs {
    #[serde(alias = "startDate", deserialize_with = "required_timestamp")]
    pub start_date: Timestamp,
    #[serde(alias = "endDate", deserialize_with = "required_timestamp")]
    pub end_date: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentArgs {
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateArgs {
    pub id: DbId,
    #[serde(flatten)]
    pub changes: UpdateVideoMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkCreateArgs {
    pub records: Vec<CreateVideoMetadata>,
}

fn required_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: serde::Deserializer<'de>,
{
    optional_timestamp::deserialize(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("timestamp must not be empty"))
}
