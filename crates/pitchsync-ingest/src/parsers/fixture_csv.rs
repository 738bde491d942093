//! Fixture CSV files with a header row: `date`, `home_team`,
//! `away_team`, `score`, and optionally `stage` and `venue`. A row is
//! completed exactly when its score parses into two numbers.

use std::path::Path;

use serde::Deserialize;

use crate::dates::normalize_date;
use crate::error::IngestResult;
use crate::mapper::TeamMapper;
use crate::record::FixtureRecord;

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    home_team: String,
    #[serde(default)]
    away_team: String,
    #[serde(default)]
    score: Option<String>,
    #[serde(default)]
    stage: Option<String>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    time: Option<String>,
}

fn parse_score(raw: &str) -> Option<(i32, i32)> {
    let (home, away) = raw.split_once('-')?;
    Some((
        home.trim().parse::<i32>().ok()?,
        away.trim().parse::<i32>().ok()?,
    ))
}

/// Parse a fixture CSV file. Rows that fail to deserialize are logged
/// and skipped.
pub fn parse(
    path: &Path,
    mapper: &TeamMapper,
    season_year: Option<i32>,
) -> IngestResult<Vec<FixtureRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut fixtures = Vec::new();
    for result in reader.deserialize::<Row>() {
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                log::warn!("skipping CSV row in {}: {err}", path.display());
                continue;
            }
        };

        let score = row.score.as_deref().and_then(parse_score);
        let is_completed = score.is_some();

        fixtures.push(FixtureRecord {
            match_date: row
                .date
                .as_deref()
                .and_then(|raw| normalize_date(raw, season_year)),
            match_time: row.time.filter(|t| !t.is_empty()),
            home_team: mapper.canonical(row.home_team.trim()).to_string(),
            away_team: mapper.canonical(row.away_team.trim()).to_string(),
            stage: row.stage.filter(|s| !s.is_empty()),
            venue: row.venue.filter(|v| !v.is_empty()),
            is_completed,
            home_score: score.map(|(home, _)| home),
            away_score: score.map(|(_, away)| away),
        });
    }

    Ok(fixtures)
}
