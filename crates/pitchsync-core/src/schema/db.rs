use chrono::{DateTime, NaiveDate};
use rusqlite::{params_from_iter, Connection, Transaction, TransactionBehavior};
use std::path::Path;

use crate::error::Result;
use crate::model::{
    Club, Competition, CompetitionType, Fixture, IngestionAudit, MatchResult, Player, Season,
    Team, TeamType,
};

use super::migrations::MIGRATIONS;

/// A database connection with CRUD methods for the football entities.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

/// A fixture joined with its team names and competition, as the repair
/// pass sees it. Missing joins (placeholder teams without clubs,
/// fixtures without a season) come through as `None`/empty.
#[derive(Debug, Clone)]
pub struct FixtureDetail {
    pub fixture_id: i64,
    pub season_id: Option<i64>,
    pub match_date: Option<NaiveDate>,
    pub home_name: String,
    pub away_name: String,
    pub is_completed: bool,
    pub competition_id: Option<i64>,
    pub competition_name: Option<String>,
    pub competition_country: Option<String>,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        // Writers from parallel sync workers share this file; wait out
        // short lock contention instead of failing.
        conn.busy_timeout(std::time::Duration::from_secs(30))?;
        // WAL lets readers run under a writer. The pragma returns a
        // row, so it cannot go through execute.
        conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a transaction, committing on `Ok` and rolling back
    /// on `Err`. This is the per-file scope the sync driver uses: one
    /// bad file rolls back only its own writes.
    pub fn in_transaction<T, E>(
        &self,
        f: impl FnOnce(&Self) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<crate::error::Error>,
    {
        // Immediate: take the write lock at BEGIN, where the busy
        // handler can wait for it. A deferred transaction upgrading to
        // write mid-file fails with SQLITE_BUSY instead of waiting.
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)
            .map_err(crate::error::Error::from)?;
        match f(self) {
            Ok(value) => {
                tx.commit().map_err(crate::error::Error::from)?;
                Ok(value)
            }
            Err(err) => {
                // Dropping the transaction rolls it back.
                drop(tx);
                Err(err)
            }
        }
    }

    fn apply_migrations(&self) -> Result<()> {
        // Parallel workers opening a fresh database race to migrate it;
        // the immediate transaction lets exactly one connection apply
        // each version while the others wait and then see it applied.
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

/// `?,?,...` placeholder list for an IN clause.
fn placeholders(n: usize) -> String {
    let mut s = String::with_capacity(n * 2);
    for i in 0..n {
        if i > 0 {
            s.push(',');
        }
        s.push('?');
    }
    s
}

fn date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            }),
    }
}

// Club CRUD
impl Database {
    pub fn insert_club(&self, club: &Club) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO clubs (name, founded_year, stadium_name, city, country, alternative_names)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                club.name,
                club.founded_year,
                club.stadium_name,
                club.city,
                club.country,
                club.alternative_names,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_club(&self, club: &Club) -> Result<()> {
        self.conn.execute(
            "UPDATE clubs SET
                name = ?2, founded_year = ?3, stadium_name = ?4,
                city = ?5, country = ?6, alternative_names = ?7
             WHERE id = ?1",
            rusqlite::params![
                club.id,
                club.name,
                club.founded_year,
                club.stadium_name,
                club.city,
                club.country,
                club.alternative_names,
            ],
        )?;
        Ok(())
    }

    pub fn find_club_by_name(&self, name: &str) -> Result<Option<Club>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, founded_year, stadium_name, city, country, alternative_names
             FROM clubs WHERE name = ?1 LIMIT 1",
        )?;
        let mut rows = stmt.query_map([name], row_to_club)?;
        Ok(rows.next().transpose()?)
    }

    /// Batch fetch for the resolver's name prefetch step.
    pub fn find_clubs_by_names(&self, names: &[String]) -> Result<Vec<Club>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, name, founded_year, stadium_name, city, country, alternative_names
             FROM clubs WHERE name IN ({})",
            placeholders(names.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let clubs = stmt
            .query_map(params_from_iter(names.iter()), row_to_club)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(clubs)
    }

    pub fn list_clubs(&self) -> Result<Vec<Club>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, founded_year, stadium_name, city, country, alternative_names
             FROM clubs ORDER BY name",
        )?;
        let clubs = stmt
            .query_map([], row_to_club)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(clubs)
    }
}

fn row_to_club(row: &rusqlite::Row) -> rusqlite::Result<Club> {
    Ok(Club {
        id: row.get(0)?,
        name: row.get(1)?,
        founded_year: row.get(2)?,
        stadium_name: row.get(3)?,
        city: row.get(4)?,
        country: row.get(5)?,
        alternative_names: row.get(6)?,
    })
}

// Team CRUD
impl Database {
    pub fn insert_team(&self, team: &Team) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO teams (club_id, team_type) VALUES (?1, ?2)",
            rusqlite::params![team.club_id, team.team_type.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn find_team_for_club(&self, club_id: i64) -> Result<Option<Team>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, club_id, team_type FROM teams WHERE club_id = ?1 LIMIT 1")?;
        let mut rows = stmt.query_map([club_id], row_to_team)?;
        Ok(rows.next().transpose()?)
    }

    pub fn find_teams_for_clubs(&self, club_ids: &[i64]) -> Result<Vec<Team>> {
        if club_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, club_id, team_type FROM teams WHERE club_id IN ({})",
            placeholders(club_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let teams = stmt
            .query_map(params_from_iter(club_ids.iter()), row_to_team)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(teams)
    }
}

fn row_to_team(row: &rusqlite::Row) -> rusqlite::Result<Team> {
    let team_type: String = row.get(2)?;
    Ok(Team {
        id: row.get(0)?,
        club_id: row.get(1)?,
        team_type: TeamType::parse(&team_type),
    })
}

// Competition and season CRUD
impl Database {
    pub fn insert_competition(&self, competition: &Competition) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO competitions (name, country, competition_type) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                competition.name,
                competition.country,
                competition.competition_type.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Find a competition by its `(name, country)` identity key.
    pub fn find_competition(&self, name: &str, country: Option<&str>) -> Result<Option<Competition>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, country, competition_type FROM competitions
             WHERE name = ?1 AND (country = ?2 OR (country IS NULL AND ?2 IS NULL))
             LIMIT 1",
        )?;
        let mut rows = stmt.query_map(rusqlite::params![name, country], row_to_competition)?;
        Ok(rows.next().transpose()?)
    }

    /// All competitions in id order. Id order doubles as the priority
    /// index the repair pass falls back to when tie-breaking duplicates.
    pub fn list_competitions(&self) -> Result<Vec<Competition>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, country, competition_type FROM competitions ORDER BY id",
        )?;
        let comps = stmt
            .query_map([], row_to_competition)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(comps)
    }

    pub fn insert_season(&self, season: &Season) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO seasons (competition_id, season_name, year_start, year_end)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                season.competition_id,
                season.season_name,
                season.year_start,
                season.year_end,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn find_season(&self, competition_id: i64, season_name: &str) -> Result<Option<Season>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, competition_id, season_name, year_start, year_end FROM seasons
             WHERE competition_id = ?1 AND season_name = ?2 LIMIT 1",
        )?;
        let mut rows = stmt.query_map(
            rusqlite::params![competition_id, season_name],
            row_to_season,
        )?;
        Ok(rows.next().transpose()?)
    }
}

fn row_to_competition(row: &rusqlite::Row) -> rusqlite::Result<Competition> {
    let competition_type: String = row.get(3)?;
    Ok(Competition {
        id: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        competition_type: CompetitionType::parse(&competition_type),
    })
}

fn row_to_season(row: &rusqlite::Row) -> rusqlite::Result<Season> {
    Ok(Season {
        id: row.get(0)?,
        competition_id: row.get(1)?,
        season_name: row.get(2)?,
        year_start: row.get(3)?,
        year_end: row.get(4)?,
    })
}

// Fixture and result CRUD
impl Database {
    pub fn insert_fixture(&self, fixture: &Fixture) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO fixtures (
                season_id, match_date, match_time, home_team_id, away_team_id,
                stage, venue, is_completed, ground_id, group_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                fixture.season_id,
                fixture.match_date.map(|d| d.to_string()),
                fixture.match_time,
                fixture.home_team_id,
                fixture.away_team_id,
                fixture.stage,
                fixture.venue,
                fixture.is_completed,
                fixture.ground_id,
                fixture.group_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_fixture(&self, fixture: &Fixture) -> Result<()> {
        self.conn.execute(
            "UPDATE fixtures SET
                season_id = ?2, match_date = ?3, match_time = ?4,
                home_team_id = ?5, away_team_id = ?6, stage = ?7,
                venue = ?8, is_completed = ?9, ground_id = ?10, group_id = ?11
             WHERE id = ?1",
            rusqlite::params![
                fixture.id,
                fixture.season_id,
                fixture.match_date.map(|d| d.to_string()),
                fixture.match_time,
                fixture.home_team_id,
                fixture.away_team_id,
                fixture.stage,
                fixture.venue,
                fixture.is_completed,
                fixture.ground_id,
                fixture.group_id,
            ],
        )?;
        Ok(())
    }

    /// Candidate fixtures for the resolver's dedup check: anything whose
    /// date, home team, and away team each appear in the batch. The
    /// caller narrows to exact `(date, home, away)` triples in memory,
    /// mirroring the batch prefetch the upsert engine is built around.
    pub fn fixtures_matching(
        &self,
        dates: &[NaiveDate],
        home_ids: &[i64],
        away_ids: &[i64],
    ) -> Result<Vec<Fixture>> {
        if dates.is_empty() || home_ids.is_empty() || away_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, season_id, match_date, match_time, home_team_id, away_team_id,
                    stage, venue, is_completed, ground_id, group_id
             FROM fixtures
             WHERE match_date IN ({}) AND home_team_id IN ({}) AND away_team_id IN ({})",
            placeholders(dates.len()),
            placeholders(home_ids.len()),
            placeholders(away_ids.len()),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let params: Vec<rusqlite::types::Value> = dates
            .iter()
            .map(|d| rusqlite::types::Value::from(d.to_string()))
            .chain(home_ids.iter().map(|&id| rusqlite::types::Value::from(id)))
            .chain(away_ids.iter().map(|&id| rusqlite::types::Value::from(id)))
            .collect();
        let fixtures = stmt
            .query_map(params_from_iter(params), row_to_fixture)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(fixtures)
    }

    /// Delete a fixture and its result row, if any.
    pub fn delete_fixture(&self, fixture_id: i64) -> Result<()> {
        self.conn.execute(
            "DELETE FROM match_results WHERE fixture_id = ?1",
            [fixture_id],
        )?;
        self.conn
            .execute("DELETE FROM fixtures WHERE id = ?1", [fixture_id])?;
        Ok(())
    }

    pub fn find_result(&self, fixture_id: i64) -> Result<Option<MatchResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT fixture_id, home_score, away_score, extra_time, penalties
             FROM match_results WHERE fixture_id = ?1",
        )?;
        let mut rows = stmt.query_map([fixture_id], row_to_result)?;
        Ok(rows.next().transpose()?)
    }

    pub fn upsert_result(&self, result: &MatchResult) -> Result<()> {
        self.conn.execute(
            "INSERT INTO match_results (fixture_id, home_score, away_score, extra_time, penalties)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(fixture_id) DO UPDATE SET
                home_score = excluded.home_score,
                away_score = excluded.away_score,
                extra_time = excluded.extra_time,
                penalties = excluded.penalties",
            rusqlite::params![
                result.fixture_id,
                result.home_score,
                result.away_score,
                result.extra_time,
                result.penalties,
            ],
        )?;
        Ok(())
    }

    /// Every fixture joined with team names and competition context, for
    /// the repair pass.
    pub fn list_fixture_details(&self) -> Result<Vec<FixtureDetail>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.id, f.season_id, f.match_date, f.is_completed,
                    COALESCE(hc.name, ''), COALESCE(ac.name, ''),
                    c.id, c.name, c.country
             FROM fixtures f
             LEFT JOIN teams ht ON ht.id = f.home_team_id
             LEFT JOIN clubs hc ON hc.id = ht.club_id
             LEFT JOIN teams at ON at.id = f.away_team_id
             LEFT JOIN clubs ac ON ac.id = at.club_id
             LEFT JOIN seasons s ON s.id = f.season_id
             LEFT JOIN competitions c ON c.id = s.competition_id
             ORDER BY f.id",
        )?;
        let details = stmt
            .query_map([], |row| {
                Ok(FixtureDetail {
                    fixture_id: row.get(0)?,
                    season_id: row.get(1)?,
                    match_date: date_column(row, 2)?,
                    is_completed: row.get(3)?,
                    home_name: row.get(4)?,
                    away_name: row.get(5)?,
                    competition_id: row.get(6)?,
                    competition_name: row.get(7)?,
                    competition_country: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(details)
    }
}

fn row_to_fixture(row: &rusqlite::Row) -> rusqlite::Result<Fixture> {
    Ok(Fixture {
        id: row.get(0)?,
        season_id: row.get(1)?,
        match_date: date_column(row, 2)?,
        match_time: row.get(3)?,
        home_team_id: row.get(4)?,
        away_team_id: row.get(5)?,
        stage: row.get(6)?,
        venue: row.get(7)?,
        is_completed: row.get(8)?,
        ground_id: row.get(9)?,
        group_id: row.get(10)?,
    })
}

fn row_to_result(row: &rusqlite::Row) -> rusqlite::Result<MatchResult> {
    Ok(MatchResult {
        fixture_id: row.get(0)?,
        home_score: row.get(1)?,
        away_score: row.get(2)?,
        extra_time: row.get(3)?,
        penalties: row.get(4)?,
    })
}

// Player CRUD
impl Database {
    pub fn insert_player(&self, player: &Player) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO players (name, date_of_birth, nationality, position, team_id, club_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                player.name,
                player.date_of_birth.map(|d| d.to_string()),
                player.nationality,
                player.position,
                player.team_id,
                player.club_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_player(&self, player: &Player) -> Result<()> {
        self.conn.execute(
            "UPDATE players SET
                name = ?2, date_of_birth = ?3, nationality = ?4,
                position = ?5, team_id = ?6, club_id = ?7
             WHERE id = ?1",
            rusqlite::params![
                player.id,
                player.name,
                player.date_of_birth.map(|d| d.to_string()),
                player.nationality,
                player.position,
                player.team_id,
                player.club_id,
            ],
        )?;
        Ok(())
    }

    pub fn find_players_by_names(&self, names: &[String]) -> Result<Vec<Player>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, name, date_of_birth, nationality, position, team_id, club_id
             FROM players WHERE name IN ({})",
            placeholders(names.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let players = stmt
            .query_map(params_from_iter(names.iter()), |row| {
                Ok(Player {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    date_of_birth: date_column(row, 2)?,
                    nationality: row.get(3)?,
                    position: row.get(4)?,
                    team_id: row.get(5)?,
                    club_id: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(players)
    }
}

// Audit log
impl Database {
    pub fn insert_audit(&self, audit: &IngestionAudit) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO ingestion_audit (repo, file_path, ingested_at, records_added, records_updated, hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                audit.repo,
                audit.file_path,
                audit.ingested_at.to_rfc3339(),
                audit.records_added,
                audit.records_updated,
                audit.hash,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn recent_audits(&self, limit: i64) -> Result<Vec<IngestionAudit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, repo, file_path, ingested_at, records_added, records_updated, hash
             FROM ingestion_audit ORDER BY id DESC LIMIT ?1",
        )?;
        let audits = stmt
            .query_map([limit], |row| {
                let ingested_at: String = row.get(3)?;
                Ok(IngestionAudit {
                    id: row.get(0)?,
                    repo: row.get(1)?,
                    file_path: row.get(2)?,
                    ingested_at: DateTime::parse_from_rfc3339(&ingested_at)
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                3,
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })?
                        .into(),
                    records_added: row.get(4)?,
                    records_updated: row.get(5)?,
                    hash: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(audits)
    }

    pub fn count_audits(&self) -> Result<i64> {
        let count =
            self.conn
                .query_row("SELECT COUNT(*) FROM ingestion_audit", [], |row| row.get(0))?;
        Ok(count)
    }
}

// Entity counts for the status command and run summaries
impl Database {
    pub fn count_rows(&self, table: &'static str) -> Result<i64> {
        // Table names come from a fixed internal list, never user input.
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    /// `(table, row count)` for every entity table.
    pub fn entity_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        const TABLES: &[&str] = &[
            "clubs",
            "teams",
            "competitions",
            "seasons",
            "fixtures",
            "match_results",
            "players",
            "ingestion_audit",
        ];
        TABLES
            .iter()
            .map(|&table| Ok((table, self.count_rows(table)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_club_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let mut club = Club::new("Arsenal FC").with_country("England");
        club.founded_year = Some(1886);
        let id = db.insert_club(&club).unwrap();

        let found = db.find_club_by_name("Arsenal FC").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.founded_year, Some(1886));
        assert_eq!(found.country.as_deref(), Some("England"));
    }

    #[test]
    fn test_find_clubs_by_names_batch() {
        let db = Database::open_in_memory().unwrap();
        db.insert_club(&Club::new("Arsenal FC")).unwrap();
        db.insert_club(&Club::new("Chelsea FC")).unwrap();
        db.insert_club(&Club::new("Everton FC")).unwrap();

        let found = db
            .find_clubs_by_names(&["Arsenal FC".to_string(), "Chelsea FC".to_string()])
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_competition_identity_is_name_and_country() {
        let db = Database::open_in_memory().unwrap();
        db.insert_competition(
            &Competition::new("Premier League", CompetitionType::League).with_country("England"),
        )
        .unwrap();

        assert!(db
            .find_competition("Premier League", Some("England"))
            .unwrap()
            .is_some());
        assert!(db
            .find_competition("Premier League", Some("Wales"))
            .unwrap()
            .is_none());
        assert!(db.find_competition("Premier League", None).unwrap().is_none());
    }

    #[test]
    fn test_fixture_round_trip_with_result() {
        let db = Database::open_in_memory().unwrap();
        let home_club = db.insert_club(&Club::new("Arsenal FC")).unwrap();
        let away_club = db.insert_club(&Club::new("Chelsea FC")).unwrap();
        let home = db.insert_team(&Team::for_club(home_club)).unwrap();
        let away = db.insert_team(&Team::for_club(away_club)).unwrap();

        let mut fixture = Fixture::new(home, away);
        fixture.match_date = NaiveDate::from_ymd_opt(2023, 8, 11);
        fixture.is_completed = true;
        let fixture_id = db.insert_fixture(&fixture).unwrap();

        db.upsert_result(&MatchResult::new(fixture_id, 2, 1)).unwrap();
        let result = db.find_result(fixture_id).unwrap().unwrap();
        assert_eq!((result.home_score, result.away_score), (2, 1));

        let found = db
            .fixtures_matching(
                &[NaiveDate::from_ymd_opt(2023, 8, 11).unwrap()],
                &[home],
                &[away],
            )
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].is_completed);
    }

    #[test]
    fn test_delete_fixture_removes_result() {
        let db = Database::open_in_memory().unwrap();
        let home_club = db.insert_club(&Club::new("A")).unwrap();
        let away_club = db.insert_club(&Club::new("B")).unwrap();
        let home = db.insert_team(&Team::for_club(home_club)).unwrap();
        let away = db.insert_team(&Team::for_club(away_club)).unwrap();
        let fixture_id = db.insert_fixture(&Fixture::new(home, away)).unwrap();
        db.upsert_result(&MatchResult::new(fixture_id, 1, 0)).unwrap();

        db.delete_fixture(fixture_id).unwrap();
        assert!(db.find_result(fixture_id).unwrap().is_none());
        assert_eq!(db.count_rows("fixtures").unwrap(), 0);
    }

    #[test]
    fn test_in_transaction_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        let outcome: Result<()> = db.in_transaction(|db| {
            db.insert_club(&Club::new("Ghost FC"))?;
            Err(crate::Error::InvalidData("boom".to_string()))
        });
        assert!(outcome.is_err());
        assert_eq!(db.count_rows("clubs").unwrap(), 0);
    }

    #[test]
    fn test_audit_round_trip() {
        let db = Database::open_in_memory().unwrap();
        db.insert_audit(&IngestionAudit::new(
            "eng-england",
            "eng-england/2023-24/1-premierleague.txt",
            42,
            3,
            "abc123",
        ))
        .unwrap();

        let audits = db.recent_audits(10).unwrap();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].records_added, 42);
        assert_eq!(audits[0].hash, "abc123");
    }
}
