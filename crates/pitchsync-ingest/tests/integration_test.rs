//! Integration tests for the full mapper → sync → repair pipeline,
//! driven over a small OpenFootball-style data tree on disk.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::TempDir;

use pitchsync_core::Database;
use pitchsync_ingest::{run_sync, Config, IngestError, SyncOptions, TeamMapper};

/// Lay out one league repository the way the raw data trees do.
fn write_data_tree(root: &Path) {
    let season_dir = root.join("eng-england").join("2023-24");
    fs::create_dir_all(season_dir.join("squads")).unwrap();

    fs::write(
        season_dir.join("clubs.txt"),
        "= Premier League Clubs\n\
         \n\
         Arsenal FC, 1886, @ Emirates Stadium, London (Greater London)\n\
         | Arsenal | The Gunners\n\
         Chelsea FC, 1905, @ Stamford Bridge, London\n",
    )
    .unwrap();

    fs::write(
        season_dir.join("1-premierleague.txt"),
        "= Premier League 2023/24\n\
         \n\
         Matchday 1\n\
         [Fri Aug/11]\n\
         \x20 20.00  Arsenal FC  2-1 (1-0)  Chelsea FC\n\
         [Sat Aug/12]\n\
         \x20 Fulham FC v Everton FC\n",
    )
    .unwrap();

    fs::write(
        season_dir.join("squads").join("arsenal_fc.txt"),
        "= Arsenal FC Squad\n\
         \x201,  Aaron Ramsdale,  GK,  b. 1998,  (ENG)\n\
         \x207,  Bukayo Saka,  RW,  b. 2001,  (ENG)\n",
    )
    .unwrap();
}

/// One minimal repository with a single scored fixture.
fn write_league_repo(root: &Path, repo: &str, home: &str, away: &str) {
    let season_dir = root.join(repo).join("2023-24");
    fs::create_dir_all(&season_dir).unwrap();
    fs::write(
        season_dir.join("1-league.txt"),
        format!("[Fri Aug/11]\n\x20 {home}  2-1  {away}\n"),
    )
    .unwrap();
}

fn test_config(temp: &TempDir) -> Config {
    let data_path = temp.path().join("data");
    fs::create_dir_all(&data_path).unwrap();
    write_data_tree(&data_path);

    Config {
        data_path,
        database_path: temp.path().join("pitchsync.db"),
        state_path: temp.path().join("ingestion_state.json"),
        mapper_path: temp.path().join("team_mapper.json"),
    }
}

fn build_and_save_mapper(config: &Config) {
    let mapper = TeamMapper::build(&config.data_path).unwrap();
    mapper.save(&config.mapper_path).unwrap();
}

#[test]
fn test_full_sync_ingests_the_tree() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    build_and_save_mapper(&config);

    let stats = run_sync(&config, &SyncOptions::default()).unwrap();

    assert_eq!(stats.files_processed, 3);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.fixtures.added, 2);
    assert_eq!(stats.players.added, 2);

    let db = Database::open(&config.database_path).unwrap();

    // Club details from clubs.txt land on the rows (which may have been
    // placeholder-created by the fixture file first).
    let arsenal = db.find_club_by_name("Arsenal FC").unwrap().unwrap();
    assert_eq!(arsenal.founded_year, Some(1886));
    assert_eq!(arsenal.stadium_name.as_deref(), Some("Emirates Stadium"));
    assert!(arsenal.alternative_name_list().contains(&"The Gunners"));

    // The scored fixture is completed with its result; the `v` fixture
    // is upcoming.
    let details = db.list_fixture_details().unwrap();
    assert_eq!(details.len(), 2);
    let played = details
        .iter()
        .find(|d| d.home_name == "Arsenal FC")
        .unwrap();
    assert_eq!(played.match_date, NaiveDate::from_ymd_opt(2023, 8, 11));
    assert!(played.is_completed);
    assert_eq!(played.competition_name.as_deref(), Some("eng-england"));
    assert_eq!(played.competition_country.as_deref(), Some("England"));
    let result = db.find_result(played.fixture_id).unwrap().unwrap();
    assert_eq!((result.home_score, result.away_score), (2, 1));

    let upcoming = details.iter().find(|d| d.home_name == "Fulham FC").unwrap();
    assert!(!upcoming.is_completed);
    assert!(db.find_result(upcoming.fixture_id).unwrap().is_none());

    // Squad players attach to the club the filename resolves to.
    let players = db
        .find_players_by_names(&["Bukayo Saka".to_string()])
        .unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].club_id, Some(arsenal.id));

    // One audit row per processed file.
    assert_eq!(db.count_audits().unwrap(), 3);
}

#[test]
fn test_second_run_is_incremental_and_idempotent() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    build_and_save_mapper(&config);

    run_sync(&config, &SyncOptions::default()).unwrap();
    let stats = run_sync(&config, &SyncOptions::default()).unwrap();

    // Nothing changed on disk, so nothing is reprocessed and no new
    // audit rows appear.
    assert_eq!(stats.files_processed, 0);
    assert_eq!(stats.files_unchanged, 3);
    assert_eq!(stats.fixtures.added, 0);

    let db = Database::open(&config.database_path).unwrap();
    assert_eq!(db.count_audits().unwrap(), 3);
    assert_eq!(db.count_rows("fixtures").unwrap(), 2);
}

#[test]
fn test_force_reprocesses_without_duplicating() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    build_and_save_mapper(&config);

    run_sync(&config, &SyncOptions::default()).unwrap();
    let options = SyncOptions {
        force: true,
        ..SyncOptions::default()
    };
    let stats = run_sync(&config, &options).unwrap();

    assert_eq!(stats.files_processed, 3);
    assert_eq!(stats.fixtures.added, 0);
    assert_eq!(stats.fixtures.updated, 0);

    let db = Database::open(&config.database_path).unwrap();
    assert_eq!(db.count_rows("fixtures").unwrap(), 2);
    assert_eq!(db.count_rows("clubs").unwrap(), 4);
    // Forced runs do write fresh audit rows.
    assert_eq!(db.count_audits().unwrap(), 6);
}

#[test]
fn test_changed_file_is_picked_up() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    build_and_save_mapper(&config);

    run_sync(&config, &SyncOptions::default()).unwrap();

    // A late score correction lands in the file; only that file should
    // be reprocessed.
    let fixture_file = config
        .data_path
        .join("eng-england")
        .join("2023-24")
        .join("1-premierleague.txt");
    fs::write(
        &fixture_file,
        "= Premier League 2023/24\n\
         \n\
         Matchday 1\n\
         [Fri Aug/11]\n\
         \x20 20.00  Arsenal FC  3-1 (1-0)  Chelsea FC\n\
         [Sat Aug/12]\n\
         \x20 Fulham FC v Everton FC\n",
    )
    .unwrap();

    let stats = run_sync(&config, &SyncOptions::default()).unwrap();
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.fixtures.updated, 1);

    let db = Database::open(&config.database_path).unwrap();
    assert_eq!(db.count_rows("fixtures").unwrap(), 2);
    let details = db.list_fixture_details().unwrap();
    let played = details
        .iter()
        .find(|d| d.home_name == "Arsenal FC")
        .unwrap();
    let result = db.find_result(played.fixture_id).unwrap().unwrap();
    assert_eq!(result.home_score, 3);
}

#[test]
fn test_league_filter_limits_the_run() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    build_and_save_mapper(&config);

    let options = SyncOptions {
        league: Some("nonexistent-league".to_string()),
        ..SyncOptions::default()
    };
    let stats = run_sync(&config, &options).unwrap();
    assert_eq!(stats.files_processed, 0);
}

#[test]
fn test_parallel_sync_processes_every_repo() {
    let temp = TempDir::new().unwrap();
    let data_path = temp.path().join("data");
    fs::create_dir_all(&data_path).unwrap();

    let repos = [
        ("de-deutschland", "Bayern München", "Borussia Dortmund"),
        ("eng-england", "Arsenal FC", "Chelsea FC"),
        ("es-espana", "Real Madrid", "FC Barcelona"),
        ("fr-france", "Paris SG", "Olympique Lyonnais"),
        ("it-italy", "Juventus", "AC Milan"),
        ("nl-netherlands", "Ajax", "Feyenoord"),
    ];
    for (repo, home, away) in repos {
        write_league_repo(&data_path, repo, home, away);
    }

    let config = Config {
        data_path,
        database_path: temp.path().join("pitchsync.db"),
        state_path: temp.path().join("ingestion_state.json"),
        mapper_path: temp.path().join("team_mapper.json"),
    };
    let options = SyncOptions {
        parallel: true,
        threads: 8,
        ..SyncOptions::default()
    };

    // Workers write to one database file concurrently; every file must
    // land, none may fail on lock contention.
    let stats = run_sync(&config, &options).unwrap();
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.files_processed, repos.len() as u64);
    assert_eq!(stats.fixtures.added, repos.len() as u64);

    let db = Database::open(&config.database_path).unwrap();
    assert_eq!(db.count_rows("fixtures").unwrap(), repos.len() as i64);
    assert_eq!(db.count_rows("competitions").unwrap(), repos.len() as i64);
    assert_eq!(db.count_audits().unwrap(), repos.len() as i64);
}

#[test]
fn test_unopenable_database_counts_parallel_repos_as_failed() {
    let temp = TempDir::new().unwrap();
    let data_path = temp.path().join("data");
    fs::create_dir_all(&data_path).unwrap();
    write_league_repo(&data_path, "eng-england", "Arsenal FC", "Chelsea FC");
    write_league_repo(&data_path, "es-espana", "Real Madrid", "FC Barcelona");

    let config = Config {
        data_path,
        // A directory is not an openable database file.
        database_path: temp.path().to_path_buf(),
        state_path: temp.path().join("ingestion_state.json"),
        mapper_path: temp.path().join("team_mapper.json"),
    };
    let options = SyncOptions {
        parallel: true,
        ..SyncOptions::default()
    };

    let stats = run_sync(&config, &options).unwrap();
    assert_eq!(stats.files_processed, 0);
    assert_eq!(stats.files_failed, 2);
}

#[test]
fn test_missing_data_root_is_fatal() {
    let temp = TempDir::new().unwrap();
    let mut config = test_config(&temp);
    config.data_path = temp.path().join("no-such-dir");

    let err = run_sync(&config, &SyncOptions::default()).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, IngestError::DataRootMissing(_)));
}

#[test]
fn test_mapper_canonicalizes_across_sources() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    let mapper = TeamMapper::build(&config.data_path).unwrap();
    // Registry alternative names map to the registry's canonical name,
    // and suffix-normalized spellings collapse onto it too.
    assert_eq!(mapper.canonical("The Gunners"), "Arsenal FC");
    assert_eq!(mapper.canonical("Arsenal"), "Arsenal FC");
    assert_eq!(mapper.canonical("Arsenal F.C."), "Arsenal FC");
}
