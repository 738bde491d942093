//! The upsert engine: parsed records in, persisted entities out.
//!
//! Each batch works the same way: prefetch everything the batch could
//! touch by name in a handful of IN queries, resolve or
//! placeholder-create the referenced entities, then walk the records
//! doing field-level change detection so an unchanged record writes
//! nothing. A record that fails mid-resolution is logged and skipped;
//! it never poisons the rest of its batch.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};

use pitchsync_core::model::{Club, Fixture, MatchResult, Player, Team};
use pitchsync_core::Database;

use crate::error::IngestResult;
use crate::record::{validate_fixture, ClubRecord, FixtureRecord, PlayerRecord, SkipReason};

/// What happened to one batch of records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub added: u64,
    pub updated: u64,
    pub skipped: u64,
}

impl BatchSummary {
    pub fn absorb(&mut self, other: Self) {
        self.added += other.added;
        self.updated += other.updated;
        self.skipped += other.skipped;
    }
}

enum Outcome {
    Added,
    Updated,
    Unchanged,
    Skipped(SkipReason),
}

/// Upsert parsed club records, updating only fields the file actually
/// carries. An existing row never loses data to a sparser file.
pub fn upsert_clubs(db: &Database, records: &[ClubRecord]) -> IngestResult<BatchSummary> {
    let mut summary = BatchSummary::default();
    if records.is_empty() {
        return Ok(summary);
    }

    let names: Vec<String> = records
        .iter()
        .filter(|r| !r.name.trim().is_empty())
        .map(|r| r.name.clone())
        .collect();
    let mut existing: HashMap<String, Club> = db
        .find_clubs_by_names(&names)?
        .into_iter()
        .map(|c| (c.name.clone(), c))
        .collect();

    for record in records {
        if record.name.trim().is_empty() {
            summary.skipped += 1;
            continue;
        }

        if let Some(club) = existing.get_mut(&record.name) {
            let mut changed = false;
            apply_field(&mut club.founded_year, record.founded_year, &mut changed);
            apply_field(
                &mut club.stadium_name,
                record.stadium_name.clone(),
                &mut changed,
            );
            apply_field(&mut club.city, record.city.clone(), &mut changed);
            apply_field(&mut club.country, record.country.clone(), &mut changed);
            apply_field(
                &mut club.alternative_names,
                record.alternative_names.clone(),
                &mut changed,
            );
            if changed {
                db.update_club(club)?;
                summary.updated += 1;
            }
        } else {
            let mut club = Club::new(&record.name);
            club.founded_year = record.founded_year;
            club.stadium_name = record.stadium_name.clone();
            club.city = record.city.clone();
            club.country = record.country.clone();
            club.alternative_names = record.alternative_names.clone();
            club.id = db.insert_club(&club)?;
            existing.insert(club.name.clone(), club);
            summary.added += 1;
        }
    }

    Ok(summary)
}

/// Set `target` from `value` when the new value is present and differs.
fn apply_field<T: PartialEq>(target: &mut Option<T>, value: Option<T>, changed: &mut bool) {
    if let Some(value) = value {
        if target.as_ref() != Some(&value) {
            *target = Some(value);
            *changed = true;
        }
    }
}

/// Name-to-id resolution state for one fixture batch. Placeholder
/// creations land here too, so a name is resolved at most once per
/// batch no matter how often it appears.
struct TeamResolver {
    club_ids: HashMap<String, i64>,
    team_ids: HashMap<String, i64>,
}

impl TeamResolver {
    fn prefetch(db: &Database, names: &HashSet<String>) -> IngestResult<Self> {
        let name_list: Vec<String> = names.iter().cloned().collect();
        let clubs = db.find_clubs_by_names(&name_list)?;
        let club_ids: HashMap<String, i64> =
            clubs.iter().map(|c| (c.name.clone(), c.id)).collect();

        let ids: Vec<i64> = club_ids.values().copied().collect();
        let by_club: HashMap<i64, i64> = db
            .find_teams_for_clubs(&ids)?
            .into_iter()
            .filter_map(|t| t.club_id.map(|club_id| (club_id, t.id)))
            .collect();
        let team_ids = club_ids
            .iter()
            .filter_map(|(name, club_id)| by_club.get(club_id).map(|&t| (name.clone(), t)))
            .collect();

        Ok(Self { club_ids, team_ids })
    }

    /// Team id for a name, creating a placeholder Club and Team on
    /// first sight. A later club file fills the placeholder in.
    fn resolve(&mut self, db: &Database, name: &str) -> IngestResult<i64> {
        if let Some(&team_id) = self.team_ids.get(name) {
            return Ok(team_id);
        }

        let club_id = match self.club_ids.get(name) {
            Some(&id) => id,
            None => {
                let id = match db.find_club_by_name(name)? {
                    Some(club) => club.id,
                    None => {
                        log::debug!("creating placeholder club for {name:?}");
                        db.insert_club(&Club::new(name))?
                    }
                };
                self.club_ids.insert(name.to_string(), id);
                id
            }
        };

        let team_id = match db.find_team_for_club(club_id)? {
            Some(team) => team.id,
            None => db.insert_team(&Team::for_club(club_id))?,
        };
        self.team_ids.insert(name.to_string(), team_id);
        Ok(team_id)
    }
}

/// Upsert parsed fixture records against the `(date, home, away)`
/// dedup key. Records failing validation or missing a date are skipped
/// with a logged reason; everything else is inserted or field-level
/// updated, results included.
pub fn upsert_fixtures(
    db: &Database,
    records: &[FixtureRecord],
    season_id: Option<i64>,
) -> IngestResult<BatchSummary> {
    let mut summary = BatchSummary::default();
    if records.is_empty() {
        return Ok(summary);
    }

    let mut valid = Vec::new();
    for record in records {
        match validate_fixture(record) {
            Ok(()) => valid.push(record),
            Err(reason) => {
                log::warn!(
                    "skipping fixture {:?} vs {:?}: {}",
                    record.home_team,
                    record.away_team,
                    reason.as_str()
                );
                summary.skipped += 1;
            }
        }
    }

    let names: HashSet<String> = valid
        .iter()
        .flat_map(|r| [r.home_team.clone(), r.away_team.clone()])
        .collect();
    let mut resolver = TeamResolver::prefetch(db, &names)?;

    // Batch prefetch of possible dedup-key collisions; exact triples
    // are matched in memory.
    let mut dates = Vec::new();
    let mut home_ids = Vec::new();
    let mut away_ids = Vec::new();
    for record in &valid {
        if let (Some(date), Some(&home), Some(&away)) = (
            record.match_date,
            resolver.team_ids.get(&record.home_team),
            resolver.team_ids.get(&record.away_team),
        ) {
            dates.push(date);
            home_ids.push(home);
            away_ids.push(away);
        }
    }
    let mut existing: HashMap<(NaiveDate, i64, i64), Fixture> = db
        .fixtures_matching(&dates, &home_ids, &away_ids)?
        .into_iter()
        .filter_map(|f| f.match_date.map(|d| ((d, f.home_team_id, f.away_team_id), f)))
        .collect();

    for record in valid {
        let outcome = upsert_one_fixture(db, record, season_id, &mut resolver, &mut existing);
        match outcome {
            Ok(Outcome::Added) => summary.added += 1,
            Ok(Outcome::Updated) => summary.updated += 1,
            Ok(Outcome::Unchanged) => {}
            Ok(Outcome::Skipped(reason)) => {
                log::warn!(
                    "skipping fixture {:?} vs {:?}: {}",
                    record.home_team,
                    record.away_team,
                    reason.as_str()
                );
                summary.skipped += 1;
            }
            Err(err) => {
                log::error!(
                    "failed to upsert fixture {:?} vs {:?}: {err}",
                    record.home_team,
                    record.away_team
                );
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}

fn upsert_one_fixture(
    db: &Database,
    record: &FixtureRecord,
    season_id: Option<i64>,
    resolver: &mut TeamResolver,
    existing: &mut HashMap<(NaiveDate, i64, i64), Fixture>,
) -> IngestResult<Outcome> {
    let home_id = resolver.resolve(db, &record.home_team)?;
    let away_id = resolver.resolve(db, &record.away_team)?;

    let Some(date) = record.match_date else {
        return Ok(Outcome::Skipped(SkipReason::NoDate));
    };

    let key = (date, home_id, away_id);
    if let Some(fixture) = existing.get_mut(&key) {
        let mut changed = false;

        if fixture.stage != record.stage {
            fixture.stage = record.stage.clone();
            changed = true;
        }
        if record.venue.is_some() && fixture.venue != record.venue {
            fixture.venue = record.venue.clone();
            changed = true;
        }
        if record.match_time.is_some() && fixture.match_time != record.match_time {
            fixture.match_time = record.match_time.clone();
            changed = true;
        }
        if fixture.is_completed != record.is_completed {
            fixture.is_completed = record.is_completed;
            changed = true;
        }
        if changed {
            db.update_fixture(fixture)?;
        }

        if let Some(result) = record_result(record, fixture.id) {
            let stored = db.find_result(fixture.id)?;
            if stored.as_ref() != Some(&result) {
                db.upsert_result(&result)?;
                changed = true;
            }
        }

        if changed {
            Ok(Outcome::Updated)
        } else {
            Ok(Outcome::Unchanged)
        }
    } else {
        let mut fixture = Fixture::new(home_id, away_id);
        fixture.season_id = season_id;
        fixture.match_date = Some(date);
        fixture.match_time = record.match_time.clone();
        fixture.stage = record.stage.clone();
        fixture.venue = record.venue.clone();
        fixture.is_completed = record.is_completed;
        fixture.id = db.insert_fixture(&fixture)?;

        if let Some(result) = record_result(record, fixture.id) {
            db.upsert_result(&result)?;
        }

        // A second copy of the same key later in this batch must
        // update, not insert.
        existing.insert(key, fixture);
        Ok(Outcome::Added)
    }
}

fn record_result(record: &FixtureRecord, fixture_id: i64) -> Option<MatchResult> {
    if !record.is_completed {
        return None;
    }
    match (record.home_score, record.away_score) {
        (Some(home), Some(away)) => Some(MatchResult::new(fixture_id, home, away)),
        _ => None,
    }
}

/// Upsert parsed squad records for one club's squad file. Players are
/// keyed by name; `club_id`/`team_id` tie them to the squad the file
/// belongs to when the club resolved.
pub fn upsert_players(
    db: &Database,
    records: &[PlayerRecord],
    club_id: Option<i64>,
    team_id: Option<i64>,
) -> IngestResult<BatchSummary> {
    let mut summary = BatchSummary::default();
    if records.is_empty() {
        return Ok(summary);
    }

    let names: Vec<String> = records
        .iter()
        .filter(|r| !r.name.trim().is_empty())
        .map(|r| r.name.clone())
        .collect();
    let mut existing: HashMap<String, Player> = db
        .find_players_by_names(&names)?
        .into_iter()
        .map(|p| (p.name.clone(), p))
        .collect();

    for record in records {
        if record.name.trim().is_empty() {
            summary.skipped += 1;
            continue;
        }

        let date_of_birth = record
            .birth_year
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));

        if let Some(player) = existing.get_mut(&record.name) {
            let mut changed = false;
            apply_field(&mut player.position, record.position.clone(), &mut changed);
            apply_field(
                &mut player.nationality,
                record.nationality.clone(),
                &mut changed,
            );
            apply_field(&mut player.club_id, club_id, &mut changed);
            apply_field(&mut player.team_id, team_id, &mut changed);
            if let Some(dob) = date_of_birth {
                if player.date_of_birth.map(|d| d.year()) != Some(dob.year()) {
                    player.date_of_birth = Some(dob);
                    changed = true;
                }
            }
            if changed {
                db.update_player(player)?;
                summary.updated += 1;
            }
        } else {
            let mut player = Player::new(&record.name);
            player.position = record.position.clone();
            player.nationality = record.nationality.clone();
            player.date_of_birth = date_of_birth;
            player.club_id = club_id;
            player.team_id = team_id;
            player.id = db.insert_player(&player)?;
            existing.insert(player.name.clone(), player);
            summary.added += 1;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(date: &str, home: &str, away: &str, score: Option<(i32, i32)>) -> FixtureRecord {
        FixtureRecord {
            match_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            is_completed: score.is_some(),
            home_score: score.map(|(h, _)| h),
            away_score: score.map(|(_, a)| a),
            ..Default::default()
        }
    }

    #[test]
    fn test_placeholder_club_and_team_created() {
        let db = Database::open_in_memory().unwrap();
        let records = vec![fixture("2023-08-11", "Arsenal FC", "Chelsea FC", Some((2, 1)))];

        let summary = upsert_fixtures(&db, &records, None).unwrap();
        assert_eq!(summary.added, 1);

        let club = db.find_club_by_name("Arsenal FC").unwrap().unwrap();
        assert!(club.country.is_none());
        assert!(db.find_team_for_club(club.id).unwrap().is_some());
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let db = Database::open_in_memory().unwrap();
        let records = vec![fixture("2023-08-11", "Arsenal FC", "Chelsea FC", Some((2, 1)))];

        upsert_fixtures(&db, &records, None).unwrap();
        let summary = upsert_fixtures(&db, &records, None).unwrap();
        assert_eq!(summary, BatchSummary::default());
        assert_eq!(db.count_rows("fixtures").unwrap(), 1);
    }

    #[test]
    fn test_duplicate_within_batch_inserts_once() {
        let db = Database::open_in_memory().unwrap();
        let record = fixture("2023-08-11", "Arsenal FC", "Chelsea FC", Some((2, 1)));
        let summary = upsert_fixtures(&db, &[record.clone(), record], None).unwrap();
        assert_eq!(summary.added, 1);
        assert_eq!(db.count_rows("fixtures").unwrap(), 1);
    }

    #[test]
    fn test_score_correction_updates_result() {
        let db = Database::open_in_memory().unwrap();
        upsert_fixtures(
            &db,
            &[fixture("2023-08-11", "Arsenal FC", "Chelsea FC", Some((2, 1)))],
            None,
        )
        .unwrap();

        let summary = upsert_fixtures(
            &db,
            &[fixture("2023-08-11", "Arsenal FC", "Chelsea FC", Some((3, 1)))],
            None,
        )
        .unwrap();
        assert_eq!(summary.updated, 1);

        let fixtures = db
            .fixtures_matching(
                &[NaiveDate::from_ymd_opt(2023, 8, 11).unwrap()],
                &[1, 2],
                &[1, 2],
            )
            .unwrap();
        let result = db.find_result(fixtures[0].id).unwrap().unwrap();
        assert_eq!(result.home_score, 3);
    }

    #[test]
    fn test_reversed_home_and_away_is_a_different_fixture() {
        let db = Database::open_in_memory().unwrap();
        let summary = upsert_fixtures(
            &db,
            &[
                fixture("2023-08-11", "Arsenal FC", "Chelsea FC", Some((2, 1))),
                fixture("2023-08-11", "Chelsea FC", "Arsenal FC", Some((0, 0))),
            ],
            None,
        )
        .unwrap();
        assert_eq!(summary.added, 2);
    }

    #[test]
    fn test_invalid_records_counted_as_skipped() {
        let db = Database::open_in_memory().unwrap();
        let records = vec![
            fixture("2023-08-11", "", "Chelsea FC", Some((2, 1))),
            fixture("2023-08-11", "Arsenal FC", "Chelsea FC", Some((25, 0))),
            // No date: passes validation, skipped at resolution.
            fixture("nodate", "Arsenal FC", "Chelsea FC", Some((1, 0))),
        ];
        let summary = upsert_fixtures(&db, &records, None).unwrap();
        assert_eq!(summary.added, 0);
        assert_eq!(summary.skipped, 3);
    }

    #[test]
    fn test_club_upsert_keeps_existing_detail() {
        let db = Database::open_in_memory().unwrap();
        let full = ClubRecord {
            name: "Arsenal FC".to_string(),
            founded_year: Some(1886),
            city: Some("London".to_string()),
            ..Default::default()
        };
        let sparse = ClubRecord {
            name: "Arsenal FC".to_string(),
            ..Default::default()
        };

        let summary = upsert_clubs(&db, &[full]).unwrap();
        assert_eq!(summary.added, 1);

        // A sparser file later must not blank out detail.
        let summary = upsert_clubs(&db, &[sparse]).unwrap();
        assert_eq!(summary.updated, 0);
        let club = db.find_club_by_name("Arsenal FC").unwrap().unwrap();
        assert_eq!(club.founded_year, Some(1886));
    }

    #[test]
    fn test_player_upsert_by_name() {
        let db = Database::open_in_memory().unwrap();
        let club_id = db.insert_club(&Club::new("Arsenal FC")).unwrap();
        let team_id = db.insert_team(&Team::for_club(club_id)).unwrap();
        let record = PlayerRecord {
            name: "Bukayo Saka".to_string(),
            position: Some("RW".to_string()),
            birth_year: Some(2001),
            ..Default::default()
        };

        let summary = upsert_players(&db, &[record.clone()], Some(club_id), Some(team_id)).unwrap();
        assert_eq!(summary.added, 1);

        let summary = upsert_players(&db, &[record], Some(club_id), Some(team_id)).unwrap();
        assert_eq!(summary.added, 0);
        assert_eq!(summary.updated, 0);

        let players = db
            .find_players_by_names(&["Bukayo Saka".to_string()])
            .unwrap();
        assert_eq!(players[0].club_id, Some(club_id));
    }
}
