use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompetitionType {
    League,
    Cup,
    International,
}

impl CompetitionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::League => "league",
            Self::Cup => "cup",
            Self::International => "international",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "cup" => Self::Cup,
            "international" => Self::International,
            _ => Self::League,
        }
    }
}

/// A competition, identified by `(name, country)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub id: i64,
    pub name: String,
    pub country: Option<String>,
    pub competition_type: CompetitionType,
}

impl Competition {
    #[must_use]
    pub fn new(name: impl Into<String>, competition_type: CompetitionType) -> Self {
        Self {
            id: 0,
            name: name.into(),
            country: None,
            competition_type,
        }
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

/// One instance of a competition, bounded by a year range.
///
/// Identity is `(competition_id, season_name)`. The year bounds are
/// parsed from a `YYYY-YY` label and are nullable: a malformed label
/// stores null bounds rather than guessing a fixed year range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: i64,
    pub competition_id: i64,
    pub season_name: String,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
}

impl Season {
    #[must_use]
    pub fn new(competition_id: i64, season_name: impl Into<String>) -> Self {
        let season_name = season_name.into();
        let (year_start, year_end) = parse_season_years(&season_name);
        Self {
            id: 0,
            competition_id,
            season_name,
            year_start,
            year_end,
        }
    }
}

/// Parse year bounds from a season label like `2023-24` or `2023-2024`.
///
/// A two-digit end year is expanded against the start year's century.
/// Returns `(None, None)` when the label does not carry a usable start
/// year; callers log the condition and keep the season keyed by name.
#[must_use]
pub fn parse_season_years(label: &str) -> (Option<i32>, Option<i32>) {
    let mut parts = label.splitn(2, '-');
    let start = parts.next().and_then(|p| p.trim().parse::<i32>().ok());
    let Some(start) = start else {
        return (None, None);
    };
    if !(1800..=2200).contains(&start) {
        return (None, None);
    }

    let end = parts.next().map(str::trim).and_then(|p| {
        let n = p.parse::<i32>().ok()?;
        if p.len() == 2 {
            Some((start / 100) * 100 + n)
        } else {
            Some(n)
        }
    });

    (Some(start), end.or(Some(start + 1)))
}
