//! Parsed record types handed from parsers to the resolver.
//!
//! Raw files carry partial data as a matter of course, so every field a
//! parser cannot always populate is optional. Validation is a separate,
//! uniform gate applied after parsing and before persistence.

use chrono::NaiveDate;

/// Highest per-side score accepted as real. Anything above is treated
/// as a data-corruption sentinel, not a scoreline.
pub const MAX_SCORE: i32 = 20;

/// A club as parsed from a club text or JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClubRecord {
    pub name: String,
    pub founded_year: Option<i32>,
    pub stadium_name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// Comma-joined alternative names, as stored on the Club row.
    pub alternative_names: Option<String>,
}

/// A fixture as parsed from a match-list text file or a CSV row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureRecord {
    pub match_date: Option<NaiveDate>,
    pub match_time: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub stage: Option<String>,
    pub venue: Option<String>,
    pub is_completed: bool,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

/// A squad member as parsed from a squad text file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRecord {
    pub name: String,
    pub position: Option<String>,
    pub birth_year: Option<i32>,
    pub nationality: Option<String>,
    pub number: Option<i32>,
    pub current_club: Option<String>,
}

/// Why a record was dropped instead of persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingTeam,
    /// Completed fixture without a full score.
    MissingScore,
    /// Score outside `0..=MAX_SCORE` on either side.
    ExtremeScore,
    /// No match date; the dedup key needs one.
    NoDate,
    /// Resolution failed mid-record; logged with context at the source.
    ResolutionFailed,
}

impl SkipReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingTeam => "missing team name",
            Self::MissingScore => "completed fixture without score",
            Self::ExtremeScore => "score out of range",
            Self::NoDate => "no match date",
            Self::ResolutionFailed => "resolution failed",
        }
    }
}

/// The uniform validation gate applied to every fixture record after
/// parsing, before it reaches the resolver.
pub fn validate_fixture(record: &FixtureRecord) -> Result<(), SkipReason> {
    if record.home_team.trim().is_empty() || record.away_team.trim().is_empty() {
        return Err(SkipReason::MissingTeam);
    }

    if record.is_completed {
        match (record.home_score, record.away_score) {
            (Some(home), Some(away)) => {
                if !(0..=MAX_SCORE).contains(&home) || !(0..=MAX_SCORE).contains(&away) {
                    return Err(SkipReason::ExtremeScore);
                }
            }
            _ => return Err(SkipReason::MissingScore),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(home_score: i32, away_score: i32) -> FixtureRecord {
        FixtureRecord {
            home_team: "Arsenal FC".to_string(),
            away_team: "Chelsea FC".to_string(),
            is_completed: true,
            home_score: Some(home_score),
            away_score: Some(away_score),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_team_rejected() {
        let record = FixtureRecord {
            away_team: "Chelsea FC".to_string(),
            ..Default::default()
        };
        assert_eq!(validate_fixture(&record), Err(SkipReason::MissingTeam));
    }

    #[test]
    fn test_score_boundary() {
        assert_eq!(validate_fixture(&completed(20, 0)), Ok(()));
        assert_eq!(
            validate_fixture(&completed(21, 0)),
            Err(SkipReason::ExtremeScore)
        );
        assert_eq!(
            validate_fixture(&completed(0, -1)),
            Err(SkipReason::ExtremeScore)
        );
    }

    #[test]
    fn test_completed_without_score_rejected() {
        let mut record = completed(1, 1);
        record.away_score = None;
        assert_eq!(validate_fixture(&record), Err(SkipReason::MissingScore));
    }

    #[test]
    fn test_upcoming_without_score_accepted() {
        let record = FixtureRecord {
            home_team: "Arsenal FC".to_string(),
            away_team: "Chelsea FC".to_string(),
            ..Default::default()
        };
        assert_eq!(validate_fixture(&record), Ok(()));
    }
}
