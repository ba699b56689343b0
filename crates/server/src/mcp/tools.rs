//! The tool catalog advertised by `tools/list`.

use std::str::FromStr;

use serde_json::{json, Value};
use vidcat_core::pagination::{DEFAULT_PAGE_SIZE, DEFAULT_RECENT_LIMIT, MAX_PAGE_SIZE};
use vidcat_core::query_options::Column;
use vidcat_core::validation::VALID_GAME_TYPES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    ListVideoMetadata,
    GetVideoMetadata,
    GetVideoMetadataByFilters,
    SearchVideos,
    SearchPaginated,
    SearchByText,
    GetVideosByDateRange,
    GetRecentVideos,
    CreateVideoMetadata,
    BulkCreateVideoMetadata,
    UpdateVideoMetadata,
    DeleteVideoMetadata,
    ListUniqueGameTypes,
    ListUniqueLeagues,
    ListUniqueSeasons,
    ListUniqueTeams,
    GetStatistics,
}

impl Tool {
    pub const ALL: [Tool; 17] = [
        Tool::ListVideoMetadata,
        Tool::GetVideoMetadata,
        Tool::GetVideoMetadataByFilters,
        Tool::SearchVideos,
        Tool::SearchPaginated,
        Tool::SearchByText,
        Tool::GetVideosByDateRange,
        Tool::GetRecentVideos,
        Tool::CreateVideoMetadata,
        Tool::BulkCreateVideoMetadata,
        Tool::UpdateVideoMetadata,
        Tool::DeleteVideoMetadata,
        Tool::ListUniqueGameTypes,
        Tool::ListUniqueLeagues,
        Tool::ListUniqueSeasons,
        Tool::ListUniqueTeams,
        Tool::GetStatistics,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::ListVideoMetadata => "list_video_metadata",
            Tool::GetVideoMetadata => "get_video_metadata",
            Tool::GetVideoMetadataByFilters => "get_video_metadata_by_filters",
            Tool::SearchVideos => "search_videos",
            Tool::SearchPaginated => "search_paginated",
            Tool::SearchByText => "search_by_text",
            Tool::GetVideosByDateRange => "get_videos_by_date_range",
            Tool::GetRecentVideos => "get_recent_videos",
            Tool::CreateVideoMetadata => "create_video_metadata",
            Tool::BulkCreateVideoMetadata => "bulk_create_video_metadata",
            Tool::UpdateVideoMetadata => "update_video_metadata",
            Tool::DeleteVideoMetadata => "delete_video_metadata",
            Tool::ListUniqueGameTypes => "list_unique_game_types",
            Tool::ListUniqueLeagues => "list_unique_leagues",
            Tool::ListUniqueSeasons => "list_unique_seasons",
            Tool::ListUniqueTeams => "list_unique_teams",
            Tool::GetStatistics => "get_statistics",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::ListVideoMetadata => "List all video metadata records, newest first",
            Tool::GetVideoMetadata => "Get a video metadata record by ID",
            Tool::GetVideoMetadataByFilters => {
                "List video metadata matching filters, with optional projection, ordering and paging"
            }
            Tool::SearchVideos => {
                "Search title, description, venue and league for a term, narrowed by filters"
            }
            Tool::SearchPaginated => "One page of filtered video metadata with the total count",
            Tool::SearchByText => {
                "Find videos by title/description substring, duration bounds and attached media"
            }
            Tool::GetVideosByDateRange => "List videos whose match date falls within a range",
            Tool::GetRecentVideos => "List the most recently added videos",
            Tool::CreateVideoMetadata => "Create a new video metadata record",
            Tool::BulkCreateVideoMetadata => {
                "Create several video metadata records; all succeed or none are stored"
            }
            Tool::UpdateVideoMetadata => "Update fields of an existing video metadata record",
            Tool::DeleteVideoMetadata => "Delete a video metadata record",
            Tool::ListUniqueGameTypes => "List the distinct game types in the catalog",
            Tool::ListUniqueLeagues => "List the distinct leagues in the catalog",
            Tool::ListUniqueSeasons => "List the distinct seasons in the catalog",
            Tool::ListUniqueTeams => "List every team appearing in the catalog",
            Tool::GetStatistics => "Catalog statistics: counts, average duration, date span",
        }
    }

    pub fn input_schema(self) -> Value {
        match self {
            Tool::ListVideoMetadata
            | Tool::ListUniqueGameTypes
            | Tool::ListUniqueLeagues
            | Tool::ListUniqueSeasons
            | Tool::ListUniqueTeams
            | Tool::GetStatistics => object_schema(json!({}), &[]),
            Tool::GetVideoMetadata | Tool::DeleteVideoMetadata => {
                object_schema(json!({ "id": { "type": "integer" } }), &["id"])
            }
            Tool::GetVideoMetadataByFilters => object_schema(
                json!({ "filters": filters_schema(), "query": query_schema() }),
                &[],
            ),
            Tool::SearchVideos => object_schema(
                json!({
                    "term": { "type": "string", "description": "Case-insensitive substring" },
                    "filters": filters_schema(),
                    "query": query_schema(),
                }),
                &["term"],
            ),
            Tool::SearchPaginated => object_schema(
                json!({
                    "filters": filters_schema(),
                    "page": { "type": "integer", "minimum": 1, "default": 1 },
                    "page_size": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": MAX_PAGE_SIZE,
                        "default": DEFAULT_PAGE_SIZE,
                    },
                }),
                &[],
            ),
            Tool::SearchByText => object_schema(
                json!({
                    "title": { "type": "string" },
                    "description": { "type": "string" },
                    "min_duration": { "type": "integer", "minimum": 0 },
                    "max_duration": { "type": "integer", "minimum": 0 },
                    "has_player_stats": { "type": "boolean" },
                    "has_video": { "type": "boolean" },
                    "has_thumbnail": { "type": "boolean" },
                    "query": query_schema(),
                }),
                &[],
            ),
            Tool::GetVideosByDateRange => object_schema(
                json!({
                    "start_date": { "type": "string", "format": "date-time" },
                    "end_date": { "type": "string", "format": "date-time" },
                }),
                &["start_date", "end_date"],
            ),
            Tool::GetRecentVideos => object_schema(
                json!({
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": MAX_PAGE_SIZE,
                        "default": DEFAULT_RECENT_LIMIT,
                    },
                }),
                &[],
            ),
            Tool::CreateVideoMetadata => record_schema(&["title", "game_type", "teams"]),
            Tool::BulkCreateVideoMetadata => object_schema(
                json!({
                    "records": {
                        "type": "array",
                        "items": record_schema(&["title", "game_type", "teams"]),
                    },
                }),
                &["records"],
            ),
            Tool::UpdateVideoMetadata => {
                let mut schema = record_schema(&["id"]);
                schema["properties"]["id"] = json!({ "type": "integer" });
                schema
            }
        }
    }

    pub fn definition(self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "inputSchema": self.input_schema(),
        })
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| format!("Unknown tool: {name}"))
    }
}

/// Definitions for every tool, in catalog order.
pub fn tool_definitions() -> Vec<Value> {
    Tool::ALL.into_iter().map(Tool::definition).collect()
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn filters_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "game_type": { "type": "string", "enum": VALID_GAME_TYPES },
            "teams": {
                "oneOf": [
                    { "type": "string" },
                    { "type": "array", "items": { "type": "string" } },
                ],
                "description": "Matches records featuring any of the given teams",
            },
            "league": { "type": "string" },
            "season": { "type": "string" },
            "winner": { "type": "string" },
            "venue": { "type": "string" },
            "tags": {
                "type": "object",
                "description": "Every key/value pair must be present in the record's tags",
            },
            "match_date_start": { "type": "string", "format": "date-time" },
            "match_date_end": { "type": "string", "format": "date-time" },
        },
    })
}

fn query_schema() -> Value {
    let columns: Vec<&str> = Column::ALL.iter().map(|c| c.as_str()).collect();
    json!({
        "type": "object",
        "properties": {
            "limit": { "type": "integer", "minimum": 1 },
            "offset": { "type": "integer", "minimum": 0 },
            "order_by": { "type": "string", "enum": columns },
            "order_direction": { "type": "string", "enum": ["asc", "desc"] },
            "select": { "type": "array", "items": { "type": "string", "enum": columns } },
        },
    })
}

/// Schema for a record's writable fields.
pub fn record_schema(required: &[&str]) -> Value {
    object_schema(
        json!({
            "title": { "type": "string", "maxLength": 255 },
            "game_type": { "type": "string", "enum": VALID_GAME_TYPES },
            "teams": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 1,
                "maxItems": 10,
            },
            "score": { "type": "string", "maxLength": 200 },
            "winner": { "type": "string" },
            "duration_seconds": { "type": "integer", "minimum": 0, "maximum": 86400 },
            "video_url": { "type": "string" },
            "thumbnail_url": { "type": "string" },
            "description": { "type": "string" },
            "tags": {
                "oneOf": [
                    { "type": "array", "items": { "type": "string", "maxLength": 50 }, "maxItems": 20 },
                    { "type": "object" },
                ],
            },
            "player_stats": { "type": "object" },
            "match_date": { "type": "string", "format": "date-time" },
            "venue": { "type": "string" },
            "league": { "type": "string" },
            "season": { "type": "string", "maxLength": 50 },
        }),
        required,
    )
}
