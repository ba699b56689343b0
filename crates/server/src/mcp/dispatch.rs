//! Tool dispatch: argument parsing, repository calls and result shaping.

use serde::Serialize;
use serde_json::{json, Value};
use vidcat_core::error::CoreError;
use vidcat_core::filter::{DateRange, VideoFilters};
use vidcat_core::pagination::{clamp_limit, PageRequest, DEFAULT_RECENT_LIMIT, MAX_PAGE_SIZE};
use vidcat_core::query_options::Column;
use vidcat_db::models::video_metadata::{CreateVideoMetadata, NewVideoMetadata};
use vidcat_db::repositories::VideoMetadataRepo;

use crate::error::{AppError, AppResult};
use crate::mcp::args::{
    parse, BulkCreateArgs, DateRangeArgs, FiltersQueryArgs, IdArgs, PaginatedArgs, RecentArgs,
    SearchArgs, TextSearchArgs, UpdateArgs,
};
use crate::mcp::tools::Tool;
use crate::state::AppState;

pub const NOT_FOUND_TEXT: &str = "Video metadata not found";
pub const DELETED_TEXT: &str = "Video metadata deleted successfully";

/// The text content of a tool result.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    fn json<T: Serialize>(value: &T) -> AppResult<Self> {
        serde_json::to_string_pretty(value)
            .map(Self::text)
            .map_err(|err| AppError::InternalError(format!("Failed to serialize result: {err}")))
    }

    /// The `tools/call` result object.
    pub fn into_value(self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.text }],
            "isError": self.is_error,
        })
    }
}

/// Run a tool by name.
///
/// Validation failures come back as an `isError` output; every other failure
/// is an [`AppError`] for the caller to turn into a protocol error.
pub async fn call_tool(state: &AppState, name: &str, arguments: Option<Value>) -> AppResult<ToolOutput> {
    let tool: Tool = name.parse().map_err(AppError::MethodNotFound)?;
    tracing::debug!(tool = name, "Calling tool");

    match run(state, tool, arguments).await {
        Err(err) if err.is_tool_error() => {
            tracing::info!(tool = name, error = %err, "Tool rejected input");
            Ok(ToolOutput::error(err.to_string()))
        }
        other => other,
    }
}

async fn run(state: &AppState, tool: Tool, arguments: Option<Value>) -> AppResult<ToolOutput> {
    let pool = &state.pool;

    match tool {
        Tool::ListVideoMetadata => ToolOutput::json(&VideoMetadataRepo::list_all(pool).await?),

        Tool::GetVideoMetadata => {
            let IdArgs { id } = parse(arguments)?;
            match VideoMetadataRepo::find_by_id(pool, id).await? {
                Some(video) => ToolOutput::json(&video),
                None => Ok(ToolOutput::text(NOT_FOUND_TEXT)),
            }
        }

        Tool::GetVideoMetadataByFilters => {
            let args: FiltersQueryArgs = parse(arguments)?;
            let options = args.query.into_options().map_err(CoreError::from)?;
            let filters = args.filters.into_filters();
            ToolOutput::json(&VideoMetadataRepo::find_by_filters(pool, &filters, &options).await?)
        }

        Tool::SearchVideos => {
            let args: SearchArgs = parse(arguments)?;
            let term = args.term.trim();
            if term.is_empty() {
                return Err(CoreError::Validation("Search term must not be empty".into()).into());
            }
            let options = args.query.into_options().map_err(CoreError::from)?;
            let filters = args.filters.into_filters();
            ToolOutput::json(&VideoMetadataRepo::search(pool, term, &filters, &options).await?)
        }

        Tool::SearchPaginated => {
            let args: PaginatedArgs = parse(arguments)?;
            let page = PageRequest::new(args.page, args.page_size);
            let filters = args.filters.into_filters();
            ToolOutput::json(&VideoMetadataRepo::search_paginated(pool, &filters, page).await?)
        }

        Tool::SearchByText => {
            let args: TextSearchArgs = parse(arguments)?;
            let filters = VideoFilters {
                text: args.text_filters(),
                ..VideoFilters::default()
            };
            let options = args.query.into_options().map_err(CoreError::from)?;
            ToolOutput::json(&VideoMetadataRepo::find_by_filters(pool, &filters, &options).await?)
        }

        Tool::GetVideosByDateRange => {
            let DateRangeArgs {
                start_date,
                end_date,
            } = parse(arguments)?;
            if start_date > end_date {
                return Err(
                    CoreError::Validation("start_date must not be after end_date".into()).into(),
                );
            }
            let range = DateRange::between(start_date, end_date);
            ToolOutput::json(&VideoMetadataRepo::find_by_date_range(pool, range).await?)
        }

        Tool::GetRecentVideos => {
            let RecentArgs { limit } = parse(arguments)?;
            let limit = clamp_limit(limit, DEFAULT_RECENT_LIMIT, MAX_PAGE_SIZE);
            ToolOutput::json(&VideoMetadataRepo::find_recent(pool, limit).await?)
        }

        Tool::CreateVideoMetadata => {
            let input: CreateVideoMetadata = parse(arguments)?;
            let input = input.validate().map_err(CoreError::from)?;
            ToolOutput::json(&VideoMetadataRepo::create(pool, &input).await?)
        }

        Tool::BulkCreateVideoMetadata => {
            let BulkCreateArgs { records } = parse(arguments)?;
            if records.is_empty() {
                return Err(CoreError::Validation("records must not be empty".into()).into());
            }
            let inputs = records
                .into_iter()
                .enumerate()
                .map(|(index, record)| {
                    record
                        .validate()
                        .map_err(|err| CoreError::Validation(format!("Record {index}: {err}")))
                })
                .collect::<Result<Vec<NewVideoMetadata>, _>>()?;
            ToolOutput::json(&VideoMetadataRepo::create_many(pool, &inputs).await?)
        }

        Tool::UpdateVideoMetadata => {
            let UpdateArgs { id, changes } = parse(arguments)?;
            let changes = changes.validate().map_err(CoreError::from)?;
            match VideoMetadataRepo::update(pool, id, &changes).await? {
                Some(video) => ToolOutput::json(&video),
                None => Ok(ToolOutput::text(NOT_FOUND_TEXT)),
            }
        }

        Tool::DeleteVideoMetadata => {
            let IdArgs { id } = parse(arguments)?;
            if VideoMetadataRepo::delete(pool, id).await? {
                Ok(ToolOutput::text(DELETED_TEXT))
            } else {
                Ok(ToolOutput::text(NOT_FOUND_TEXT))
            }
        }

        Tool::ListUniqueGameTypes => distinct(state, Column::GameType).await,
        Tool::ListUniqueLeagues => distinct(state, Column::League).await,
        Tool::ListUniqueSeasons => distinct(state, Column::Season).await,
        Tool::ListUniqueTeams => {
            let teams = VideoMetadataRepo::distinct_teams(pool).await?;
            Ok(ToolOutput::text(teams.join(", ")))
        }

        Tool::GetStatistics => ToolOutput::json(&VideoMetadataRepo::statistics(pool).await?),
    }
}

async fn distinct(state: &AppState, column: Column) -> AppResult<ToolOutput> {
    let values = VideoMetadataRepo::distinct_values(&state.pool, column).await?;
    Ok(ToolOutput::text(values.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use sqlx::postgres::PgPoolOptions;

    use crate::config::{ServerConfig, Transport};

    /// State whose pool never connects; only paths that fail before any
    /// query are exercised here.
    fn lazy_state() -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        AppState {
            pool,
            config: Arc::new(ServerConfig {
                transport: Transport::Stdio,
                host: "127.0.0.1".into(),
                port: 0,
                cors_origins: vec![],
                request_timeout_secs: 30,
            }),
        }
    }

    #[test]
    fn output_value_shape() {
        let value = ToolOutput::error("bad").into_value();
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "bad");
        assert_eq!(value["isError"], true);
    }

    #[tokio::test]
    async fn unknown_tool_is_method_not_found() {
        let result = call_tool(&lazy_state(), "drop_everything", None).await;
        assert_matches!(result, Err(AppError::MethodNotFound(_)));
    }

    #[tokio::test]
    async fn invalid_game_type_is_tool_error() {
        let args = json!({ "title": "Blitz", "game_type": "chess", "teams": ["A", "B"] });
        let output = call_tool(&lazy_state(), "create_video_metadata", Some(args))
            .await
            .unwrap();
        assert!(output.is_error);
        assert!(output.text.contains("chess"));
    }

    #[tokio::test]
    async fn too_many_teams_is_tool_error() {
        let teams: Vec<String> = (0..11).map(|i| format!("Team {i}")).collect();
        let args = json!({ "title": "Relay", "game_type": "soccer", "teams": teams });
        let output = call_tool(&lazy_state(), "create_video_metadata", Some(args))
            .await
            .unwrap();
        assert!(output.is_error);
    }

    #[tokio::test]
    async fn bulk_create_reports_failing_record() {
        let args = json!({ "records": [
            { "title": "Ok", "game_type": "soccer", "teams": ["A"] },
            { "title": "Bad", "game_type": "soccer", "teams": [] },
        ]});
        let output = call_tool(&lazy_state(), "bulk_create_video_metadata", Some(args))
            .await
            .unwrap();
        assert!(output.is_error);
        assert!(output.text.starts_with("Validation failed: Record 1"));
    }

    #[tokio::test]
    async fn blank_search_term_is_tool_error() {
        let output = call_tool(&lazy_state(), "search_videos", Some(json!({ "term": "  " })))
            .await
            .unwrap();
        assert!(output.is_error);
    }

    #[tokio::test]
    async fn missing_id_is_invalid_params() {
        let result = call_tool(&lazy_state(), "get_video_metadata", Some(json!({}))).await;
        assert_matches!(result, Err(AppError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn unknown_order_column_is_invalid_params() {
        let args = json!({ "query": { "orderBy": "rating" } });
        let result = call_tool(&lazy_state(), "get_video_metadata_by_filters", Some(args)).await;
        let err = result.unwrap_err();
        assert_eq!(err.rpc_code(), crate::mcp::protocol::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn reversed_date_range_is_tool_error() {
        let args = json!({ "start_date": "2024-06-01", "end_date": "2024-01-01" });
        let output = call_tool(&lazy_state(), "get_videos_by_date_range", Some(args))
            .await
            .unwrap();
        assert!(output.is_error);
    }
}
