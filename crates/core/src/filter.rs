//! The filter model: which rows a list or search query should return.
//!
//! Every dimension is optional. An entirely empty [`VideoFilters`] matches
//! every row.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{TagMap, Timestamp};

/// Teams filter: a single team name or a set of names matched disjunctively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeamsFilter {
    One(String),
    Any(Vec<String>),
}

impl TeamsFilter {
    /// The distinct team names, sorted, so `["B", "A"]` and `["A", "B"]`
    /// describe the same filter.
    pub fn names(&self) -> Vec<&str> {
        match self {
            TeamsFilter::One(name) => vec![name.as_str()],
            TeamsFilter::Any(names) => names
                .iter()
                .map(String::as_str)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }

    /// An empty set of names filters nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, TeamsFilter::Any(names) if names.is_empty())
    }
}

/// Inclusive bounds on `match_date`. Either side may be open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl DateRange {
    pub fn between(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Attribute filters: substring matches on title/description, duration
/// bounds, and presence checks on optional columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFilters {
    pub title: Option<String>,
    pub description: Option<String>,
    pub min_duration: Option<i32>,
    pub max_duration: Option<i32>,
    pub has_player_stats: Option<bool>,
    pub has_video: Option<bool>,
    pub has_thumbnail: Option<bool>,
}

/// All recognized filter dimensions for `video_metadata` queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoFilters {
    pub game_type: Option<String>,
    pub league: Option<String>,
    pub season: Option<String>,
    pub winner: Option<String>,
    pub venue: Option<String>,
    pub teams: Option<TeamsFilter>,
    /// Conjunctive containment: every key/value pair must be present.
    pub tags: Option<TagMap>,
    pub date_range: DateRange,
    pub text: TextFilters,
}

impl VideoFilters {
    pub fn with_game_type(mut self, game_type: impl Into<String>) -> Self {
        self.game_type = Some(game_type.into());
        self
    }

    pub fn with_league(mut self, league: impl Into<String>) -> Self {
        self.league = Some(league.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.teams = Some(TeamsFilter::One(team.into()));
        self
    }

    pub fn with_any_team<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.teams = Some(TeamsFilter::Any(teams.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_tags(mut self, tags: TagMap) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }
}

/// Treat a missing value and an empty string the same way: no filter.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
