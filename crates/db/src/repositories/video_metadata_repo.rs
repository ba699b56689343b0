//! Repository for the `video_metadata` table.
//!
//! Filtered reads go through the query composition engine in
//! `vidcat_core::query`; this module only binds the composed parameters and
//! executes. Writes take already-validated payloads.

use sqlx::postgres::PgArguments;
use sqlx::types::Json;
use sqlx::{Arguments, PgPool, Postgres};
use vidcat_core::filter::{DateRange, VideoFilters};
use vidcat_core::pagination::{PageRequest, Paginated};
use vidcat_core::query::{compose, compose_count, ComposedQuery, SqlParam, VIDEO_METADATA_RELATION};
use vidcat_core::query_options::{Column, QueryOptions, SortDirection};
use vidcat_core::stats::{calculate_statistics, VideoStatistics};
use vidcat_core::types::DbId;

use crate::models::video_metadata::{
    NewVideoMetadata, ProjectedVideoMetadata, VideoMetadata, VideoMetadataChanges,
    VideoMetadataRow,
};

/// Column list for full-record queries.
const COLUMNS: &str = "\
    id, title, game_type, teams, score, winner, duration_seconds, \
    video_url, thumbnail_url, description, tags, player_stats, \
    match_date, venue, league, season, created_at, updated_at";

/// Bind composed parameters, in order, into an argument buffer.
fn to_arguments(params: &[SqlParam]) -> Result<PgArguments, sqlx::Error> {
    let mut args = PgArguments::default();
    for param in params {
        let added = match param {
            SqlParam::Text(value) => args.add(value.as_str()),
            SqlParam::Json(value) => args.add(value),
            SqlParam::Timestamp(value) => args.add(*value),
            SqlParam::Int(value) => args.add(*value),
            SqlParam::BigInt(value) => args.add(*value),
        };
        added.map_err(sqlx::Error::Encode)?;
    }
    Ok(args)
}

/// Provides reads and writes over the video metadata catalog.
pub struct VideoMetadataRepo;

impl VideoMetadataRepo {
    // -----------------------------------------------------------------------
    // Composed reads
    // -----------------------------------------------------------------------

    /// Execute a composed query, decoding rows leniently.
    pub async fn fetch_composed(
        pool: &PgPool,
        query: &ComposedQuery,
    ) -> Result<Vec<VideoMetadataRow>, sqlx::Error> {
        tracing::debug!(sql = %query.sql, params = query.params.len(), "Executing composed query");
        let args = to_arguments(&query.params)?;
        sqlx::query_as_with::<_, VideoMetadataRow, _>(&query.sql, args)
            .fetch_all(pool)
            .await
    }

    /// Execute a composed `COUNT(*)` query.
    pub async fn count_composed(pool: &PgPool, query: &ComposedQuery) -> Result<i64, sqlx::Error> {
        let args = to_arguments(&query.params)?;
        sqlx::query_scalar_with::<_, i64, _>(&query.sql, args)
            .fetch_one(pool)
            .await
    }

    /// List records matching `filters`, shaped by `options`.
    pub async fn find_by_filters(
        pool: &PgPool,
        filters: &VideoFilters,
        options: &QueryOptions,
    ) -> Result<Vec<ProjectedVideoMetadata>, sqlx::Error> {
        Self::search_inner(pool, filters, options, None).await
    }

    /// Free-text search over title, description, venue and league, narrowed
    /// by `filters`.
    pub async fn search(
        pool: &PgPool,
        term: &str,
        filters: &VideoFilters,
        options: &QueryOptions,
    ) -> Result<Vec<ProjectedVideoMetadata>, sqlx::Error> {
        Self::search_inner(pool, filters, options, Some(term)).await
    }

    async fn search_inner(
        pool: &PgPool,
        filters: &VideoFilters,
        options: &QueryOptions,
        term: Option<&str>,
    ) -> Result<Vec<ProjectedVideoMetadata>, sqlx::Error> {
        let query = compose(VIDEO_METADATA_RELATION, filters, options, term);
        let rows = Self::fetch_composed(pool, &query).await?;
        Ok(rows
            .into_iter()
            .map(|row| ProjectedVideoMetadata {
                projection: options.projection.clone(),
                row,
            })
            .collect())
    }

    /// Count records matching `filters` (and `term`, when given).
    pub async fn count(
        pool: &PgPool,
        filters: &VideoFilters,
        term: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let query = compose_count(VIDEO_METADATA_RELATION, filters, term);
        Self::count_composed(pool, &query).await
    }

    /// One page of full records, newest first, with the total match count.
    pub async fn search_paginated(
        pool: &PgPool,
        filters: &VideoFilters,
        page: PageRequest,
    ) -> Result<Paginated<VideoMetadata>, sqlx::Error> {
        let total = Self::count(pool, filters, None).await?;

        let options = QueryOptions::default()
            .with_limit(page.limit())
            .with_offset(page.offset());
        let query = compose(VIDEO_METADATA_RELATION, filters, &options, None);
        let data = Self::fetch_composed(pool, &query)
            .await?
            .into_iter()
            .map(VideoMetadata::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated::new(data, total, page))
    }

    /// Records whose match date falls inside `range`, latest match first.
    pub async fn find_by_date_range(
        pool: &PgPool,
        range: DateRange,
    ) -> Result<Vec<VideoMetadata>, sqlx::Error> {
        let filters = VideoFilters::default().with_date_range(range);
        let options = QueryOptions::default().ordered_by(Column::MatchDate, SortDirection::Desc);
        Self::fetch_full(pool, &filters, &options).await
    }

    /// The most recently created records.
    pub async fn find_recent(pool: &PgPool, limit: i64) -> Result<Vec<VideoMetadata>, sqlx::Error> {
        let options = QueryOptions::default().with_limit(limit);
        Self::fetch_full(pool, &VideoFilters::default(), &options).await
    }

    async fn fetch_full(
        pool: &PgPool,
        filters: &VideoFilters,
        options: &QueryOptions,
    ) -> Result<Vec<VideoMetadata>, sqlx::Error> {
        let query = compose(VIDEO_METADATA_RELATION, filters, options, None);
        Self::fetch_composed(pool, &query)
            .await?
            .into_iter()
            .map(VideoMetadata::try_from)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Simple reads
    // -----------------------------------------------------------------------

    /// Find a record by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<VideoMetadata>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM video_metadata WHERE id = $1");
        sqlx::query_as::<_, VideoMetadata>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every record, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<VideoMetadata>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM video_metadata ORDER BY created_at DESC");
        sqlx::query_as::<_, VideoMetadata>(&query)
            .fetch_all(pool)
            .await
    }

    /// Distinct non-null values of a scalar column, sorted.
    pub async fn distinct_values(pool: &PgPool, column: Column) -> Result<Vec<String>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT {column} FROM video_metadata \
             WHERE {column} IS NOT NULL \
             ORDER BY {column}"
        );
        sqlx::query_scalar::<_, String>(&query)
            .fetch_all(pool)
            .await
    }

    /// Every team name appearing in any record, sorted.
    pub async fn distinct_teams(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT jsonb_array_elements_text(teams) AS team \
             FROM video_metadata \
             ORDER BY team",
        )
        .fetch_all(pool)
        .await
    }

    /// Catalog-wide statistics.
    pub async fn statistics(pool: &PgPool) -> Result<VideoStatistics, sqlx::Error> {
        let videos = Self::list_all(pool).await?;
        Ok(calculate_statistics(videos.iter().map(VideoMetadata::facts)))
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    async fn insert<'e, E>(executor: E, input: &NewVideoMetadata) -> Result<VideoMetadata, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO video_metadata (\
                title, game_type, teams, score, winner, duration_seconds, \
                video_url, thumbnail_url, description, tags, player_stats, \
                match_date, venue, league, season\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoMetadata>(&query)
            .bind(&input.title)
            .bind(&input.game_type)
            .bind(Json(&input.teams))
            .bind(input.score.as_deref())
            .bind(input.winner.as_deref())
            .bind(input.duration_seconds)
            .bind(input.video_url.as_deref())
            .bind(input.thumbnail_url.as_deref())
            .bind(input.description.as_deref())
            .bind(input.tags.as_ref().map(Json))
            .bind(input.player_stats.as_ref().map(Json))
            .bind(input.match_date)
            .bind(input.venue.as_deref())
            .bind(input.league.as_deref())
            .bind(input.season.as_deref())
            .fetch_one(executor)
            .await
    }

    /// Insert a validated record. `created_at` and `updated_at` are both
    /// set by the store to the same instant.
    pub async fn create(pool: &PgPool, input: &NewVideoMetadata) -> Result<VideoMetadata, sqlx::Error> {
        let created = Self::insert(pool, input).await?;
        tracing::info!(id = created.id, game_type = %created.game_type, "Video metadata created");
        Ok(created)
    }

    /// Insert several records in one transaction. Any failure rolls back
    /// the whole batch.
    pub async fn create_many(
        pool: &PgPool,
        inputs: &[NewVideoMetadata],
    ) -> Result<Vec<VideoMetadata>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            created.push(Self::insert(&mut *tx, input).await?);
        }
        tx.commit().await?;

        tracing::info!(count = created.len(), "Video metadata bulk created");
        Ok(created)
    }

    /// Apply a partial update. Only supplied fields change; `updated_at` is
    /// always refreshed. Returns `None` when no record has this ID.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &VideoMetadataChanges,
    ) -> Result<Option<VideoMetadata>, sqlx::Error> {
        let query = format!(
            "UPDATE video_metadata SET \
                title = COALESCE($2, title), \
                game_type = COALESCE($3, game_type), \
                teams = COALESCE($4, teams), \
                score = COALESCE($5, score), \
                winner = COALESCE($6, winner), \
                duration_seconds = COALESCE($7, duration_seconds), \
                video_url = COALESCE($8, video_url), \
                thumbnail_url = COALESCE($9, thumbnail_url), \
                description = COALESCE($10, description), \
                tags = COALESCE($11, tags), \
                player_stats = COALESCE($12, player_stats), \
                match_date = COALESCE($13, match_date), \
                venue = COALESCE($14, venue), \
                league = COALESCE($15, league), \
                season = COALESCE($16, season), \
                updated_at = GREATEST(NOW(), updated_at) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, VideoMetadata>(&query)
            .bind(id)
            .bind(changes.title.as_deref())
            .bind(changes.game_type.as_deref())
            .bind(changes.teams.as_ref().map(Json))
            .bind(changes.score.as_deref())
            .bind(changes.winner.as_deref())
            .bind(changes.duration_seconds)
            .bind(changes.video_url.as_deref())
            .bind(changes.thumbnail_url.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.tags.as_ref().map(Json))
            .bind(changes.player_stats.as_ref().map(Json))
            .bind(changes.match_date)
            .bind(changes.venue.as_deref())
            .bind(changes.league.as_deref())
            .bind(changes.season.as_deref())
            .fetch_optional(pool)
            .await?;

        if updated.is_some() {
            tracing::info!(id, "Video metadata updated");
        }
        Ok(updated)
    }

    /// Delete a record by ID. Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM video_metadata WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(id, "Video metadata deleted");
        }
        Ok(deleted)
    }
}
