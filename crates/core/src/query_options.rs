//! Result-shaping options: projection, ordering and pagination.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Errors raised while interpreting query options.
///
/// These indicate a caller asked for something the relation does not have,
/// not a problem with the data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Invalid order direction '{0}'. Must be 'asc' or 'desc'")]
    InvalidDirection(String),

    #[error("Limit must be a positive integer, got {0}")]
    InvalidLimit(i64),

    #[error("Offset must be non-negative, got {0}")]
    InvalidOffset(i64),
}

/// A column of the `video_metadata` relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    Title,
    GameType,
    Teams,
    Score,
    Winner,
    DurationSeconds,
    VideoUrl,
    ThumbnailUrl,
    Description,
    Tags,
    PlayerStats,
    MatchDate,
    Venue,
    League,
    Season,
    CreatedAt,
    UpdatedAt,
}

impl Column {
    /// Every column, in table definition order.
    pub const ALL: [Column; 18] = [
        Column::Id,
        Column::Title,
        Column::GameType,
        Column::Teams,
        Column::Score,
        Column::Winner,
        Column::DurationSeconds,
        Column::VideoUrl,
        Column::ThumbnailUrl,
        Column::Description,
        Column::Tags,
        Column::PlayerStats,
        Column::MatchDate,
        Column::Venue,
        Column::League,
        Column::Season,
        Column::CreatedAt,
        Column::UpdatedAt,
    ];

    /// The SQL column name.
    pub fn as_str(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Title => "title",
            Column::GameType => "game_type",
            Column::Teams => "teams",
            Column::Score => "score",
            Column::Winner => "winner",
            Column::DurationSeconds => "duration_seconds",
            Column::VideoUrl => "video_url",
            Column::ThumbnailUrl => "thumbnail_url",
            Column::Description => "description",
            Column::Tags => "tags",
            Column::PlayerStats => "player_stats",
            Column::MatchDate => "match_date",
            Column::Venue => "venue",
            Column::League => "league",
            Column::Season => "season",
            Column::CreatedAt => "created_at",
            Column::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = QueryError;

    /// Accepts the snake_case column name or its camelCase spelling
    /// (`match_date` and `matchDate` are the same column).
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let snake = to_snake_case(name.trim());
        Column::ALL
            .into_iter()
            .find(|c| c.as_str() == snake)
            .ok_or_else(|| QueryError::UnknownColumn(name.to_string()))
    }
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Sort direction for the single ordering column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(QueryError::InvalidDirection(s.to_string())),
        }
    }
}

/// Which columns a query returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    #[default]
    All,
    Columns(Vec<Column>),
}

impl Projection {
    /// Build a projection from a column list, dropping duplicates while
    /// keeping first-seen order. An empty list selects everything.
    pub fn columns(columns: impl IntoIterator<Item = Column>) -> Self {
        let mut picked: Vec<Column> = Vec::new();
        for column in columns {
            if !picked.contains(&column) {
                picked.push(column);
            }
        }
        if picked.is_empty() {
            Projection::All
        } else {
            Projection::Columns(picked)
        }
    }

    /// Parse a list of column names (snake_case or camelCase).
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, QueryError> {
        let columns = names
            .iter()
            .map(|n| n.as_ref().parse::<Column>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::columns(columns))
    }

    /// The SQL select list.
    pub fn to_sql(&self) -> String {
        match self {
            Projection::All => "*".to_string(),
            Projection::Columns(columns) => columns
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Result shaping for a list or search query.
///
/// Defaults: all columns, `created_at DESC`, no limit, no offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub projection: Projection,
    pub order_by: Column,
    pub direction: SortDirection,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            projection: Projection::All,
            order_by: Column::CreatedAt,
            direction: SortDirection::Desc,
            limit: None,
            offset: None,
        }
    }
}

impl QueryOptions {
    /// Check the numeric bounds: limit must be positive, offset non-negative.
    pub fn validate(&self) -> Result<(), QueryError> {
        if let Some(limit) = self.limit {
            if limit <= 0 {
                return Err(QueryError::InvalidLimit(limit));
            }
        }
        if let Some(offset) = self.offset {
            if offset < 0 {
                return Err(QueryError::InvalidOffset(offset));
            }
        }
        Ok(())
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn ordered_by(mut self, column: Column, direction: SortDirection) -> Self {
        self.order_by = column;
        self.direction = direction;
        self
    }
}
