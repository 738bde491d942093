use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A scheduled or played match between two teams within a season.
///
/// The central deduplication key is `(match_date, home_team_id,
/// away_team_id)`; the resolver never creates a second fixture for an
/// exact key match. Near-duplicates can still appear under different
/// seasons or competitions when fuzzy name resolution misfires; those
/// are caught by the repair pass, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: i64,
    pub season_id: Option<i64>,
    pub match_date: Option<NaiveDate>,
    /// Kickoff time as free text (`HH:MM`), when the source carries one.
    pub match_time: Option<String>,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub stage: Option<String>,
    pub venue: Option<String>,
    pub is_completed: bool,
    pub ground_id: Option<i64>,
    pub group_id: Option<i64>,
}

impl Fixture {
    #[must_use]
    pub fn new(home_team_id: i64, away_team_id: i64) -> Self {
        Self {
            id: 0,
            season_id: None,
            match_date: None,
            match_time: None,
            home_team_id,
            away_team_id,
            stage: None,
            venue: None,
            is_completed: false,
            ground_id: None,
            group_id: None,
        }
    }
}

/// Final score of a completed fixture, 1:1 with `Fixture`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub fixture_id: i64,
    pub home_score: i32,
    pub away_score: i32,
    pub extra_time: bool,
    pub penalties: bool,
}

impl MatchResult {
    #[must_use]
    pub fn new(fixture_id: i64, home_score: i32, away_score: i32) -> Self {
        Self {
            fixture_id,
            home_score,
            away_score,
            extra_time: false,
            penalties: false,
        }
    }
}
