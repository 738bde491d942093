use serde::{Deserialize, Serialize};

/// Whether a team is a club side or a national side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamType {
    Club,
    National,
}

impl TeamType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Club => "club",
            Self::National => "national",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "national" => Self::National,
            _ => Self::Club,
        }
    }
}

/// A playing unit tied 0-or-1 to a Club.
///
/// `club_id` is null for national teams. The resolver assumes exactly
/// one Team per Club; multi-squad clubs are not modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub club_id: Option<i64>,
    pub team_type: TeamType,
}

impl Team {
    #[must_use]
    pub fn for_club(club_id: i64) -> Self {
        Self {
            id: 0,
            club_id: Some(club_id),
            team_type: TeamType::Club,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_type_round_trip() {
        assert_eq!(TeamType::parse(TeamType::Club.as_str()), TeamType::Club);
        assert_eq!(
            TeamType::parse(TeamType::National.as_str()),
            TeamType::National
        );
        // Unknown values fall back to club sides.
        assert_eq!(TeamType::parse("whatever"), TeamType::Club);
    }
}
