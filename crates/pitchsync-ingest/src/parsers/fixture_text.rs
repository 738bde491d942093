//! OpenFootball match-list text files.
//!
//! ```text
//! = Premier League 2023/24
//!
//! Matchday 1
//! [Fri Aug/11]
//!   20.00  Burnley FC  0-3 (0-2)  Manchester City FC
//! [Sat Aug/12]
//!   Arsenal FC v Nottingham Forest FC
//! ```
//!
//! Date headers in brackets and `Matchday`/`Round`/`Group` headers set
//! running state applied to every match line beneath them. A scored
//! line is complete when its date is not in the future; the `v`/`vs`
//! grammar always produces an upcoming, score-less fixture.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dates::normalize_date;
use crate::error::IngestResult;
use crate::mapper::TeamMapper;
use crate::record::FixtureRecord;

static DATE_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^\[(.+)\]").unwrap()
});

// time  home_team  score (ht)  away_team
static SCORED_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^(\d{1,2}\.\d{2})?\s*([\w &'\-\.]+?)\s+(\d+)-(\d+)(?:\s+\([^)]+\))?\s+([\w &'\-\.]+)").unwrap()
});

// Home Team v Away Team (also "vs", a bare dash, or a ?-? score)
static UNSCORED_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^(\d{1,2}\.\d{2})?\s*([\w &'\-\.]+?)\s+(?:vs|v|\?-\?|-)\s+([\w &'\-\.]+)").unwrap()
});

fn is_round_header(line: &str) -> bool {
    let lowered = line.to_lowercase();
    lowered.starts_with("matchday") || lowered.starts_with("round") || lowered.starts_with("group")
}

/// `20.00` in the raw files becomes `20:00`.
fn normalize_time(raw: &str) -> String {
    raw.replacen('.', ":", 1)
}

/// Parse a match-list file. `season_year` is the season's starting
/// calendar year, inferred by the caller from the file's path.
pub fn parse(
    path: &Path,
    mapper: &TeamMapper,
    season_year: Option<i32>,
) -> IngestResult<Vec<FixtureRecord>> {
    let text = fs::read_to_string(path)?;
    let today = Utc::now().date_naive();

    let mut fixtures = Vec::new();
    let mut current_date: Option<String> = None;
    let mut current_round: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('=') || line.starts_with('#') {
            continue;
        }

        if is_round_header(line) {
            current_round = Some(line.to_string());
            continue;
        }

        if let Some(caps) = DATE_HEADER_RE.captures(line) {
            current_date = Some(caps[1].to_string());
            continue;
        }

        let match_date = current_date
            .as_deref()
            .and_then(|raw| normalize_date(raw, season_year));

        if let Some(caps) = SCORED_RE.captures(line) {
            let (Ok(home_score), Ok(away_score)) =
                (caps[3].parse::<i32>(), caps[4].parse::<i32>())
            else {
                log::warn!("unparseable score in {}: {line:?}", path.display());
                continue;
            };

            // A scored line for a future date is a prediction artifact,
            // not a result.
            let is_completed = match_date.map_or(true, |d| d <= today);

            fixtures.push(FixtureRecord {
                match_date,
                match_time: caps.get(1).map(|t| normalize_time(t.as_str())),
                home_team: mapper.canonical(caps[2].trim()).to_string(),
                away_team: mapper.canonical(caps[5].trim()).to_string(),
                stage: current_round.clone(),
                venue: None,
                is_completed,
                home_score: Some(home_score),
                away_score: Some(away_score),
            });
        } else if let Some(caps) = UNSCORED_RE.captures(line) {
            fixtures.push(FixtureRecord {
                match_date,
                match_time: caps.get(1).map(|t| normalize_time(t.as_str())),
                home_team: mapper.canonical(caps[2].trim()).to_string(),
                away_team: mapper.canonical(caps[3].trim()).to_string(),
                stage: current_round.clone(),
                venue: None,
                is_completed: false,
                home_score: None,
                away_score: None,
            });
        } else {
            log::debug!("unrecognized line in {}: {line:?}", path.display());
        }
    }

    Ok(fixtures)
}

/// Collect every raw team spelling a match-list file mentions, without
/// canonicalization. Used when building the team mapper.
pub fn extract_team_names(path: &Path) -> IngestResult<HashSet<String>> {
    let text = fs::read_to_string(path)?;
    let mut names = HashSet::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with('=')
            || line.starts_with('#')
            || is_round_header(line)
            || DATE_HEADER_RE.is_match(line)
        {
            continue;
        }

        if let Some(caps) = SCORED_RE.captures(line) {
            names.insert(caps[2].trim().to_string());
            names.insert(caps[5].trim().to_string());
        } else if let Some(caps) = UNSCORED_RE.captures(line) {
            names.insert(caps[2].trim().to_string());
            names.insert(caps[3].trim().to_string());
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn parse_str(content: &str, season_year: Option<i32>) -> Vec<FixtureRecord> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1-premierleague.txt");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        parse(&path, &TeamMapper::empty(), season_year).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_scored_line_under_date_header() {
        let fixtures = parse_str(
            "= Premier League 2023/24\n\nMatchday 1\n[Fri Aug/11]\n  20.00  Burnley FC  0-3 (0-2)  Manchester City FC\n",
            Some(2023),
        );
        assert_eq!(fixtures.len(), 1);
        let fixture = &fixtures[0];
        assert_eq!(fixture.match_date, Some(date(2023, 8, 11)));
        assert_eq!(fixture.match_time.as_deref(), Some("20:00"));
        assert_eq!(fixture.home_team, "Burnley FC");
        assert_eq!(fixture.away_team, "Manchester City FC");
        assert_eq!(fixture.stage.as_deref(), Some("Matchday 1"));
        assert!(fixture.is_completed);
        assert_eq!(fixture.home_score, Some(0));
        assert_eq!(fixture.away_score, Some(3));
    }

    #[test]
    fn test_upcoming_grammar_is_never_completed() {
        let fixtures = parse_str(
            "[Sat Aug/12]\nArsenal FC v Nottingham Forest FC\nChelsea FC vs Liverpool FC\n",
            Some(2023),
        );
        assert_eq!(fixtures.len(), 2);
        for fixture in &fixtures {
            assert!(!fixture.is_completed);
            assert_eq!(fixture.home_score, None);
        }
        assert_eq!(fixtures[1].home_team, "Chelsea FC");
        assert_eq!(fixtures[1].away_team, "Liverpool FC");
    }

    #[test]
    fn test_scored_line_in_the_future_is_not_completed() {
        let next_year = Utc::now().date_naive() + chrono::Days::new(400);
        let content = format!("[{}]\nArsenal FC 2-1 Chelsea FC\n", next_year.format("%Y-%m-%d"));
        let fixtures = parse_str(&content, None);
        assert_eq!(fixtures.len(), 1);
        assert!(!fixtures[0].is_completed);
        assert_eq!(fixtures[0].home_score, Some(2));
    }

    #[test]
    fn test_scored_line_without_date_is_completed() {
        let fixtures = parse_str("Arsenal FC 2-1 Chelsea FC\n", Some(2023));
        assert_eq!(fixtures.len(), 1);
        assert!(fixtures[0].is_completed);
        assert_eq!(fixtures[0].match_date, None);
    }

    #[test]
    fn test_mapper_is_applied_to_both_sides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.txt");
        fs::write(&path, "Man City 1-0 Arsenal\n").unwrap();

        let mut mapper = TeamMapper::empty();
        mapper.insert("Man City", "Manchester City FC");
        mapper.insert("Arsenal", "Arsenal FC");

        let fixtures = parse(&path, &mapper, Some(2023)).unwrap();
        assert_eq!(fixtures[0].home_team, "Manchester City FC");
        assert_eq!(fixtures[0].away_team, "Arsenal FC");
    }

    #[test]
    fn test_garbage_lines_are_skipped_not_fatal() {
        let fixtures = parse_str(
            "[Fri Aug/11]\n!!! not a fixture !!!\nArsenal FC 2-1 Chelsea FC\n",
            Some(2023),
        );
        assert_eq!(fixtures.len(), 1);
    }

    #[test]
    fn test_extract_team_names_is_raw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.txt");
        fs::write(&path, "[Fri Aug/11]\nMan City 1-0 Arsenal\nChelsea v Fulham\n").unwrap();

        let names = extract_team_names(&path).unwrap();
        assert_eq!(names.len(), 4);
        assert!(names.contains("Man City"));
        assert!(names.contains("Fulham"));
    }
}
