//! Catalog-wide statistics computed over fetched records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::Timestamp;

/// The fields of a record that statistics are computed from.
#[derive(Debug, Clone, Copy)]
pub struct VideoFacts<'a> {
    pub game_type: &'a str,
    pub teams: &'a [String],
    pub league: Option<&'a str>,
    pub duration_seconds: Option<i32>,
    pub match_date: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchDateRange {
    pub earliest: Option<Timestamp>,
    pub latest: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoStatistics {
    pub total_videos: i64,
    pub game_types: BTreeMap<String, i64>,
    pub teams: BTreeMap<String, i64>,
    pub leagues: BTreeMap<String, i64>,
    /// Mean over all records; a missing duration counts as zero.
    pub average_duration: f64,
    pub date_range: MatchDateRange,
}

/// Compute counts per game type, team and league, the average duration, and
/// the span of match dates.
pub fn calculate_statistics<'a>(videos: impl IntoIterator<Item = VideoFacts<'a>>) -> VideoStatistics {
    let mut stats = VideoStatistics::default();
    let mut total_duration: i64 = 0;

    for video in videos {
        stats.total_videos += 1;
        *stats.game_types.entry(video.game_type.to_string()).or_default() += 1;
        for team in video.teams {
            *stats.teams.entry(team.clone()).or_default() += 1;
        }
        if let Some(league) = video.league.filter(|l| !l.is_empty()) {
            *stats.leagues.entry(league.to_string()).or_default() += 1;
        }
        total_duration += i64::from(video.duration_seconds.unwrap_or(0));

        if let Some(date) = video.match_date {
            let range = &mut stats.date_range;
            range.earliest = Some(range.earliest.map_or(date, |e| e.min(date)));
            range.latest = Some(range.latest.map_or(date, |l| l.max(date)));
        }
    }

    if stats.total_videos > 0 {
        stats.average_duration = total_duration as f64 / stats.total_videos as f64;
    }
    stats
}
