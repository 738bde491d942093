/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Clubs (real-world organizations; name is near-unique, placeholders
-- may be created speculatively during fixture ingestion)
CREATE TABLE IF NOT EXISTS clubs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    founded_year INTEGER,
    stadium_name TEXT,
    city TEXT,
    country TEXT,
    alternative_names TEXT
);

CREATE INDEX IF NOT EXISTS idx_clubs_name ON clubs(name);

-- Teams (playing units; club_id is null for national sides)
CREATE TABLE IF NOT EXISTS teams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    club_id INTEGER REFERENCES clubs(id),
    team_type TEXT NOT NULL DEFAULT 'club'
);

CREATE INDEX IF NOT EXISTS idx_teams_club_id ON teams(club_id);

-- Competitions, identified by (name, country)
CREATE TABLE IF NOT EXISTS competitions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    country TEXT,
    competition_type TEXT NOT NULL DEFAULT 'league'
);

CREATE INDEX IF NOT EXISTS idx_competitions_name_country
    ON competitions(name, country);

-- Seasons, identified by (competition_id, season_name); year bounds
-- are nullable because season labels are not always parsable
CREATE TABLE IF NOT EXISTS seasons (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    competition_id INTEGER REFERENCES competitions(id),
    season_name TEXT NOT NULL,
    year_start INTEGER,
    year_end INTEGER
);

CREATE INDEX IF NOT EXISTS idx_seasons_competition
    ON seasons(competition_id, season_name);

-- Grounds
CREATE TABLE IF NOT EXISTS grounds (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    city TEXT,
    country TEXT,
    capacity INTEGER
);

-- Groups within a season (cup group stages)
CREATE TABLE IF NOT EXISTS groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    season_id INTEGER REFERENCES seasons(id),
    name TEXT NOT NULL
);

-- Fixtures; dedup key is (match_date, home_team_id, away_team_id)
CREATE TABLE IF NOT EXISTS fixtures (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    season_id INTEGER REFERENCES seasons(id),
    match_date TEXT,
    match_time TEXT,
    home_team_id INTEGER NOT NULL REFERENCES teams(id),
    away_team_id INTEGER NOT NULL REFERENCES teams(id),
    stage TEXT,
    venue TEXT,
    is_completed INTEGER NOT NULL DEFAULT 0,
    ground_id INTEGER REFERENCES grounds(id),
    group_id INTEGER REFERENCES groups(id)
);

CREATE INDEX IF NOT EXISTS idx_fixtures_dedup
    ON fixtures(match_date, home_team_id, away_team_id);
CREATE INDEX IF NOT EXISTS idx_fixtures_season ON fixtures(season_id);

-- Match results, 1:1 with completed fixtures
CREATE TABLE IF NOT EXISTS match_results (
    fixture_id INTEGER PRIMARY KEY REFERENCES fixtures(id),
    home_score INTEGER NOT NULL,
    away_score INTEGER NOT NULL,
    extra_time INTEGER NOT NULL DEFAULT 0,
    penalties INTEGER NOT NULL DEFAULT 0
);

-- Players
CREATE TABLE IF NOT EXISTS players (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    date_of_birth TEXT,
    nationality TEXT,
    position TEXT,
    team_id INTEGER REFERENCES teams(id),
    club_id INTEGER REFERENCES clubs(id)
);

CREATE INDEX IF NOT EXISTS idx_players_name ON players(name);

-- Ingestion audit log, append-only
CREATE TABLE IF NOT EXISTS ingestion_audit (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repo TEXT NOT NULL,
    file_path TEXT NOT NULL,
    ingested_at TEXT NOT NULL,
    records_added INTEGER NOT NULL DEFAULT 0,
    records_updated INTEGER NOT NULL DEFAULT 0,
    hash TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_audit_repo_file
    ON ingestion_audit(repo, file_path);
"#;

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: MIGRATION_001,
}];
