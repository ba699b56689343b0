//! Query composition for the `video_metadata` relation.
//!
//! Filters and options are turned into a [`SelectQuery`], an ordered list of
//! predicates plus ordering and pagination, which renders to SQL text with a
//! positionally matched parameter list (`$1`, `$2`, ...). Nothing here
//! executes anything; the repository layer binds [`SqlParam`]s and runs the
//! result.
//!
//! Each filter dimension has its own predicate builder. The builders are
//! consulted once each, in the order of [`FILTER_PREDICATE_BUILDERS`], so the
//! same inputs always produce the same SQL.

use serde_json::Value;

use crate::filter::{present, VideoFilters};
use crate::query_options::{Column, Projection, QueryOptions, SortDirection};
use crate::types::Timestamp;

/// The relation every catalog query targets.
pub const VIDEO_METADATA_RELATION: &str = "video_metadata";

/// Columns the free-text search matches against.
pub const SEARCH_COLUMNS: [Column; 4] = [
    Column::Title,
    Column::Description,
    Column::Venue,
    Column::League,
];

// ---------------------------------------------------------------------------
// Parameters and predicates
// ---------------------------------------------------------------------------

/// A value bound to a positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Json(Value),
    Timestamp(Timestamp),
    Int(i32),
    BigInt(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gte,
    Lte,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
        }
    }
}

/// A single WHERE condition. Top-level predicates are AND-ed together.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = $n`
    Eq { column: Column, value: SqlParam },
    /// `column >= $n` / `column <= $n`
    Compare {
        column: Column,
        op: CompareOp,
        value: SqlParam,
    },
    /// `column @> $n::jsonb`
    JsonContains { column: Column, value: Value },
    /// `column ILIKE $n`; the pattern is bound verbatim.
    ILike { column: Column, pattern: String },
    IsNull(Column),
    IsNotNull(Column),
    /// Parenthesized OR of the inner predicates. An empty group is `FALSE`.
    AnyOf(Vec<Predicate>),
}

impl Predicate {
    /// OR-group the given predicates, collapsing a single-element group.
    pub fn any_of(mut predicates: Vec<Predicate>) -> Predicate {
        if predicates.len() == 1 {
            predicates.remove(0)
        } else {
            Predicate::AnyOf(predicates)
        }
    }

    fn render(&self, params: &mut Vec<SqlParam>) -> String {
        match self {
            Predicate::Eq { column, value } => {
                format!("{column} = {}", push_param(params, value.clone()))
            }
            Predicate::Compare { column, op, value } => format!(
                "{column} {} {}",
                op.as_sql(),
                push_param(params, value.clone())
            ),
            Predicate::JsonContains { column, value } => format!(
                "{column} @> {}::jsonb",
                push_param(params, SqlParam::Json(value.clone()))
            ),
            Predicate::ILike { column, pattern } => format!(
                "{column} ILIKE {}",
                push_param(params, SqlParam::Text(pattern.clone()))
            ),
            Predicate::IsNull(column) => format!("{column} IS NULL"),
            Predicate::IsNotNull(column) => format!("{column} IS NOT NULL"),
            Predicate::AnyOf(inner) if inner.is_empty() => "FALSE".to_string(),
            Predicate::AnyOf(inner) => {
                let parts: Vec<String> = inner.iter().map(|p| p.render(params)).collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }
}

fn push_param(params: &mut Vec<SqlParam>, value: SqlParam) -> String {
    params.push(value);
    format!("${}", params.len())
}

// ---------------------------------------------------------------------------
// Composed query
// ---------------------------------------------------------------------------

/// Rendered SQL plus the values for its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// A chainable SELECT against one relation.
///
/// Further predicates can be conjoined after composition (this is how the
/// search clause is added) before rendering with [`SelectQuery::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    relation: String,
    projection: Projection,
    predicates: Vec<Predicate>,
    order: Option<(Column, SortDirection)>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectQuery {
    pub fn from(relation: &str) -> Self {
        Self {
            relation: relation.to_string(),
            projection: Projection::All,
            predicates: Vec::new(),
            order: None,
            limit: None,
            offset: None,
        }
    }

    pub fn select(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// AND-conjoin a predicate with everything added so far.
    pub fn and_where(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn and_where_all(mut self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }

    /// Set the single ordering column. A later call replaces an earlier one.
    pub fn order_by(mut self, column: Column, direction: SortDirection) -> Self {
        self.order = Some((column, direction));
        self
    }

    /// Apply a limit. Non-positive values are ignored.
    pub fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit.filter(|l| *l > 0);
        self
    }

    /// Apply an offset. Zero and negative values are ignored, since an
    /// offset of zero has no effect.
    pub fn offset(mut self, offset: Option<i64>) -> Self {
        self.offset = offset.filter(|o| *o > 0);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Render the full SELECT with ordering and pagination.
    pub fn build(&self) -> ComposedQuery {
        let mut params = Vec::new();
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.projection.to_sql(),
            self.relation
        );
        self.render_where(&mut sql, &mut params);

        if let Some((column, direction)) = self.order {
            sql.push_str(&format!(" ORDER BY {column} {}", direction.as_sql()));
        }
        if let Some(limit) = self.limit {
            let placeholder = push_param(&mut params, SqlParam::BigInt(limit));
            sql.push_str(&format!(" LIMIT {placeholder}"));
        }
        if let Some(offset) = self.offset {
            let placeholder = push_param(&mut params, SqlParam::BigInt(offset));
            sql.push_str(&format!(" OFFSET {placeholder}"));
        }

        ComposedQuery { sql, params }
    }

    /// Render `SELECT COUNT(*)` over the same predicates, ignoring
    /// projection, ordering and pagination.
    pub fn build_count(&self) -> ComposedQuery {
        let mut params = Vec::new();
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.relation);
        self.render_where(&mut sql, &mut params);
        ComposedQuery { sql, params }
    }

    fn render_where(&self, sql: &mut String, params: &mut Vec<SqlParam>) {
        if self.predicates.is_empty() {
            return;
        }
        let conditions: Vec<String> = self.predicates.iter().map(|p| p.render(params)).collect();
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
}

// ---------------------------------------------------------------------------
// Predicate builders
// ---------------------------------------------------------------------------

/// A builder inspects one filter dimension and returns the predicates for it
/// (none when the dimension is absent).
pub type PredicateBuilder = fn(&VideoFilters) -> Vec<Predicate>;

/// The filter dimensions, in the order their predicates are appended.
pub const FILTER_PREDICATE_BUILDERS: [(&str, PredicateBuilder); 5] = [
    ("equality", equality_predicates),
    ("teams", teams_predicates),
    ("tags", tags_predicates),
    ("date_range", date_range_predicates),
    ("attributes", attribute_predicates),
];

/// Exact-match predicates for game_type, league, season, winner and venue.
pub fn equality_predicates(filters: &VideoFilters) -> Vec<Predicate> {
    [
        (Column::GameType, &filters.game_type),
        (Column::League, &filters.league),
        (Column::Season, &filters.season),
        (Column::Winner, &filters.winner),
        (Column::Venue, &filters.venue),
    ]
    .into_iter()
    .filter_map(|(column, value)| {
        present(value).map(|v| Predicate::Eq {
            column,
            value: SqlParam::Text(v.to_string()),
        })
    })
    .collect()
}

/// Containment on the `teams` array. Several names match if ANY is present.
/// An empty list adds nothing, so it matches every row.
pub fn teams_predicates(filters: &VideoFilters) -> Vec<Predicate> {
    let Some(teams) = &filters.teams else {
        return Vec::new();
    };
    if teams.is_empty() {
        return Vec::new();
    }

    let contains: Vec<Predicate> = teams
        .names()
        .into_iter()
        .map(|name| Predicate::JsonContains {
            column: Column::Teams,
            value: Value::Array(vec![Value::String(name.to_string())]),
        })
        .collect();

    vec![Predicate::any_of(contains)]
}

/// Containment on the `tags` mapping: every supplied pair must match.
/// An empty mapping adds nothing.
pub fn tags_predicates(filters: &VideoFilters) -> Vec<Predicate> {
    match &filters.tags {
        Some(tags) if !tags.is_empty() => vec![Predicate::JsonContains {
            column: Column::Tags,
            value: Value::Object(tags.clone()),
        }],
        _ => Vec::new(),
    }
}

/// Inclusive bounds on `match_date`. Rows with a NULL `match_date` never
/// satisfy a bound.
pub fn date_range_predicates(filters: &VideoFilters) -> Vec<Predicate> {
    let range = &filters.date_range;
    if range.is_open() {
        return Vec::new();
    }
    let mut predicates = Vec::new();
    if let Some(start) = range.start {
        predicates.push(Predicate::Compare {
            column: Column::MatchDate,
            op: CompareOp::Gte,
            value: SqlParam::Timestamp(start),
        });
    }
    if let Some(end) = range.end {
        predicates.push(Predicate::Compare {
            column: Column::MatchDate,
            op: CompareOp::Lte,
            value: SqlParam::Timestamp(end),
        });
    }
    predicates
}

/// Title/description substring filters, duration bounds, and presence
/// checks on `player_stats`, `video_url` and `thumbnail_url`.
pub fn attribute_predicates(filters: &VideoFilters) -> Vec<Predicate> {
    let text = &filters.text;
    let mut predicates = Vec::new();

    for (column, needle) in [
        (Column::Title, &text.title),
        (Column::Description, &text.description),
    ] {
        if let Some(needle) = present(needle) {
            predicates.push(Predicate::ILike {
                column,
                pattern: contains_pattern(needle),
            });
        }
    }

    if let Some(min) = text.min_duration {
        predicates.push(Predicate::Compare {
            column: Column::DurationSeconds,
            op: CompareOp::Gte,
            value: SqlParam::Int(min),
        });
    }
    if let Some(max) = text.max_duration {
        predicates.push(Predicate::Compare {
            column: Column::DurationSeconds,
            op: CompareOp::Lte,
            value: SqlParam::Int(max),
        });
    }

    for (column, wanted) in [
        (Column::PlayerStats, text.has_player_stats),
        (Column::VideoUrl, text.has_video),
        (Column::ThumbnailUrl, text.has_thumbnail),
    ] {
        match wanted {
            Some(true) => predicates.push(Predicate::IsNotNull(column)),
            Some(false) => predicates.push(Predicate::IsNull(column)),
            None => {}
        }
    }

    predicates
}

/// Case-insensitive substring match of `term` against title, description,
/// venue and league. NULL columns simply fail to match.
pub fn search_predicate(term: &str) -> Predicate {
    let pattern = contains_pattern(term);
    Predicate::AnyOf(
        SEARCH_COLUMNS
            .into_iter()
            .map(|column| Predicate::ILike {
                column,
                pattern: pattern.clone(),
            })
            .collect(),
    )
}

/// Wrap `needle` in `%...%`, escaping LIKE metacharacters so they match
/// literally.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

// ---------------------------------------------------------------------------
// Composition entry points
// ---------------------------------------------------------------------------

/// Compose filters and options into a chainable [`SelectQuery`].
pub fn compose_select(
    relation: &str,
    filters: &VideoFilters,
    options: &QueryOptions,
) -> SelectQuery {
    let predicates = FILTER_PREDICATE_BUILDERS
        .iter()
        .flat_map(|(_, build)| build(filters));

    SelectQuery::from(relation)
        .select(options.projection.clone())
        .and_where_all(predicates)
        .order_by(options.order_by, options.direction)
        .limit(options.limit)
        .offset(options.offset)
}

/// Compose the executable query. When `search_term` is present and not
/// blank, the search clause is AND-ed after all filters.
pub fn compose(
    relation: &str,
    filters: &VideoFilters,
    options: &QueryOptions,
    search_term: Option<&str>,
) -> ComposedQuery {
    with_search(compose_select(relation, filters, options), search_term).build()
}

/// Compose the row count matching the same filters (and search term).
pub fn compose_count(
    relation: &str,
    filters: &VideoFilters,
    search_term: Option<&str>,
) -> ComposedQuery {
    let query = compose_select(relation, filters, &QueryOptions::default());
    with_search(query, search_term).build_count()
}

fn with_search(query: SelectQuery, search_term: Option<&str>) -> SelectQuery {
    match search_term.filter(|t| !t.trim().is_empty()) {
        Some(term) => query.and_where(search_predicate(term)),
        None => query,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
