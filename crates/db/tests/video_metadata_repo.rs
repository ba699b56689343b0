//! Integration tests for the video metadata repository.
//!
//! Exercises composed queries against a real database:
//! - Create, partial update, delete
//! - Equality, teams, tags and date-range filters
//! - Free-text search, pagination and statistics
//! - Bulk create rollback

use chrono::{TimeZone, Utc};
use serde_json::json;
use sqlx::PgPool;
use vidcat_core::filter::{DateRange, TeamsFilter, TextFilters, VideoFilters};
use vidcat_core::pagination::PageRequest;
use vidcat_core::query_options::{Column, Projection, QueryOptions, SortDirection};
use vidcat_core::types::Timestamp;
use vidcat_db::models::video_metadata::{
    CreateVideoMetadata, NewVideoMetadata, UpdateVideoMetadata,
};
use vidcat_db::repositories::VideoMetadataRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> Timestamp {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn new_video(title: &str, game_type: &str, teams: &[&str]) -> NewVideoMetadata {
    CreateVideoMetadata {
        title: title.to_string(),
        game_type: game_type.to_string(),
        teams: teams.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    }
    .validate()
    .unwrap()
}

async fn seed(pool: &PgPool) {
    let mut final_match = new_video("Euro Final", "soccer", &["Spain", "England"]);
    final_match.league = Some("UEFA".into());
    final_match.match_date = Some(date(2024, 7, 14));
    final_match.duration_seconds = Some(5400);
    final_match.tags = Some(
        json!({"highlight": true})
            .as_object()
            .cloned()
            .unwrap(),
    );

    let mut semi = new_video("Semi", "soccer", &["France", "Spain"]);
    semi.league = Some("UEFA".into());
    semi.match_date = Some(date(2024, 7, 9));

    let mut hoops = new_video("Game 7", "basketball", &["Celtics", "Knicks"]);
    hoops.description = Some("Conference final, overtime".into());

    let undated = new_video("Friendly", "soccer", &["Brazil", "Chile"]);

    for video in [final_match, semi, hoops, undated] {
        VideoMetadataRepo::create(pool, &video).await.unwrap();
    }
}

fn titles<T: serde::Serialize>(records: &[T]) -> Vec<String> {
    let mut titles: Vec<String> = records
        .iter()
        .map(|r| serde_json::to_value(r).unwrap()["title"].as_str().unwrap().to_string())
        .collect();
    titles.sort();
    titles
}

// ---------------------------------------------------------------------------
// Create / read / update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_sets_matching_timestamps(pool: PgPool) {
    let created = VideoMetadataRepo::create(&pool, &new_video("Final", "Soccer", &["A", "B"]))
        .await
        .unwrap();

    assert!(created.id > 0);
    assert_eq!(created.game_type, "soccer");
    assert_eq!(created.teams, vec!["A", "B"]);
    assert_eq!(created.created_at, created.updated_at);
    assert!(created.match_date.is_none());

    let found = VideoMetadataRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, created);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_update_changes_only_supplied_fields(pool: PgPool) {
    let created = VideoMetadataRepo::create(&pool, &new_video("Final", "soccer", &["A", "B"]))
        .await
        .unwrap();

    let changes = UpdateVideoMetadata {
        score: Some("3-1".into()),
        ..Default::default()
    }
    .validate()
    .unwrap();
    let updated = VideoMetadataRepo::update(&pool, created.id, &changes)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.score.as_deref(), Some("3-1"));
    assert_eq!(updated.title, created.title);
    assert_eq!(updated.teams, created.teams);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_delete_missing_record(pool: PgPool) {
    let changes = UpdateVideoMetadata::default().validate().unwrap();
    assert!(VideoMetadataRepo::update(&pool, 9999, &changes)
        .await
        .unwrap()
        .is_none());
    assert!(!VideoMetadataRepo::delete(&pool, 9999).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_removes_record(pool: PgPool) {
    let created = VideoMetadataRepo::create(&pool, &new_video("Final", "soccer", &["A", "B"]))
        .await
        .unwrap();
    assert!(VideoMetadataRepo::delete(&pool, created.id).await.unwrap());
    assert!(VideoMetadataRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_create_is_all_or_nothing(pool: PgPool) {
    let good = new_video("One", "soccer", &["A", "B"]);
    let mut too_long = new_video("Two", "soccer", &["C", "D"]);
    // Bypasses validation; the column is VARCHAR(200).
    too_long.score = Some("x".repeat(300));

    assert!(VideoMetadataRepo::create_many(&pool, &[good.clone(), too_long])
        .await
        .is_err());
    assert!(VideoMetadataRepo::list_all(&pool).await.unwrap().is_empty());

    let created = VideoMetadataRepo::create_many(&pool, &[good.clone(), good])
        .await
        .unwrap();
    assert_eq!(created.len(), 2);
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_filters_return_everything_newest_first(pool: PgPool) {
    seed(&pool).await;
    let all = VideoMetadataRepo::find_by_filters(&pool, &VideoFilters::default(), &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 4);
    let listed = VideoMetadataRepo::list_all(&pool).await.unwrap();
    assert_eq!(listed[0].title, "Friendly");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_equality_filter_narrows(pool: PgPool) {
    seed(&pool).await;
    let filters = VideoFilters::default().with_game_type("basketball");
    let rows = VideoMetadataRepo::find_by_filters(&pool, &filters, &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(titles(&rows), vec!["Game 7"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_teams_filter_matches_any(pool: PgPool) {
    seed(&pool).await;
    let filters = VideoFilters::default().with_any_team(["England", "Celtics"]);
    let rows = VideoMetadataRepo::find_by_filters(&pool, &filters, &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(titles(&rows), vec!["Euro Final", "Game 7"]);

    let spain = VideoFilters::default().with_team("Spain");
    let rows = VideoMetadataRepo::find_by_filters(&pool, &spain, &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(titles(&rows), vec!["Euro Final", "Semi"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_teams_filter_matches_everything(pool: PgPool) {
    seed(&pool).await;
    let filters = VideoFilters {
        teams: Some(TeamsFilter::Any(vec![])),
        ..Default::default()
    };
    let rows = VideoMetadataRepo::find_by_filters(&pool, &filters, &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tags_containment(pool: PgPool) {
    seed(&pool).await;
    let tags = json!({"highlight": true}).as_object().cloned().unwrap();
    let rows = VideoMetadataRepo::find_by_filters(
        &pool,
        &VideoFilters::default().with_tags(tags),
        &QueryOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(titles(&rows), vec!["Euro Final"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_date_range_never_matches_null_match_date(pool: PgPool) {
    seed(&pool).await;
    let range = DateRange::between(date(2024, 1, 1), date(2024, 12, 31));
    let rows = VideoMetadataRepo::find_by_date_range(&pool, range).await.unwrap();
    assert_eq!(
        rows.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(),
        vec!["Euro Final", "Semi"]
    );

    let lower_only = DateRange {
        start: Some(date(2024, 7, 10)),
        end: None,
    };
    let rows = VideoMetadataRepo::find_by_date_range(&pool, lower_only).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_attribute_filters(pool: PgPool) {
    seed(&pool).await;
    let filters = VideoFilters {
        text: TextFilters {
            min_duration: Some(60),
            ..Default::default()
        },
        ..Default::default()
    };
    let rows = VideoMetadataRepo::find_by_filters(&pool, &filters, &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(titles(&rows), vec!["Euro Final"]);
}

// ---------------------------------------------------------------------------
// Search, projection, pagination
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_matches_title_and_description(pool: PgPool) {
    seed(&pool).await;
    let rows = VideoMetadataRepo::search(&pool, "FINAL", &VideoFilters::default(), &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(titles(&rows), vec!["Euro Final", "Game 7"]);

    let narrowed = VideoMetadataRepo::search(
        &pool,
        "final",
        &VideoFilters::default().with_game_type("soccer"),
        &QueryOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(titles(&narrowed), vec!["Euro Final"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_projection_ordering_and_limit(pool: PgPool) {
    seed(&pool).await;
    let options = QueryOptions {
        projection: Projection::columns([Column::Title, Column::Teams]),
        ..QueryOptions::default()
    }
    .ordered_by(Column::Title, SortDirection::Asc)
    .with_limit(2)
    .with_offset(1);

    let rows = VideoMetadataRepo::find_by_filters(&pool, &VideoFilters::default(), &options)
        .await
        .unwrap();
    let values: Vec<_> = rows.iter().map(|r| serde_json::to_value(r).unwrap()).collect();
    assert_eq!(
        values,
        vec![
            json!({"title": "Friendly", "teams": ["Brazil", "Chile"]}),
            json!({"title": "Game 7", "teams": ["Celtics", "Knicks"]}),
        ]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_paginated(pool: PgPool) {
    seed(&pool).await;
    let filters = VideoFilters::default().with_game_type("soccer");
    let page = VideoMetadataRepo::search_paginated(&pool, &filters, PageRequest::new(Some(1), Some(2)))
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.data.len(), 2);
    assert!(page.has_next);
    assert!(!page.has_previous);
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_distinct_values_and_statistics(pool: PgPool) {
    seed(&pool).await;
    assert_eq!(
        VideoMetadataRepo::distinct_values(&pool, Column::GameType)
            .await
            .unwrap(),
        vec!["basketball", "soccer"]
    );
    assert_eq!(
        VideoMetadataRepo::distinct_values(&pool, Column::League)
            .await
            .unwrap(),
        vec!["UEFA"]
    );
    let teams = VideoMetadataRepo::distinct_teams(&pool).await.unwrap();
    assert_eq!(teams.len(), 7);

    let stats = VideoMetadataRepo::statistics(&pool).await.unwrap();
    assert_eq!(stats.total_videos, 4);
    assert_eq!(stats.game_types["soccer"], 3);
    assert_eq!(stats.teams["Spain"], 2);
    assert_eq!(stats.date_range.latest, Some(date(2024, 7, 14)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_text_encoded_json_columns_decode(pool: PgPool) {
    seed(&pool).await;
    // Read the JSON columns through a text cast to exercise the fallback.
    let rows = VideoMetadataRepo::fetch_composed(
        &pool,
        &vidcat_core::query::ComposedQuery {
            sql: "SELECT title, teams::text AS teams, tags::text AS tags, \
                  created_at::text AS created_at \
                  FROM video_metadata WHERE title = $1"
                .to_string(),
            params: vec![vidcat_core::query::SqlParam::Text("Euro Final".into())],
        },
    )
    .await
    .unwrap();

    let row = &rows[0];
    assert_eq!(row.teams.as_deref(), Some(&["Spain".to_string(), "England".to_string()][..]));
    assert_eq!(
        row.tags.clone().map(serde_json::Value::Object),
        Some(json!({"highlight": true}))
    );
    assert!(row.created_at.is_some());
}
