//! The incremental sync driver.
//!
//! A run walks every repository directory under the data root, hashes
//! each recognized file, and processes only the files whose content
//! changed since the last run (or everything under `--force`). Each
//! file is parsed and upserted inside its own transaction and gets one
//! audit row; a file that fails is logged, rolled back, and left out
//! of the state map so the next run retries it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

use pitchsync_core::model::{Competition, IngestionAudit, Season};
use pitchsync_core::Database;

use crate::classify::FileKind;
use crate::config::Config;
use crate::error::{IngestError, IngestResult};
use crate::mapper::TeamMapper;
use crate::parsers;
use crate::resolve::{self, BatchSummary};
use crate::state::{hash_file, StateMap};

/// Season directory segment, e.g. `2023-24`.
static SEASON_SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^\d{4}-\d{2}$").unwrap()
});

/// Country names recognized inside repository paths. Repo directories
/// follow the `xx-country` convention (`eng-england`), so both whole
/// segments and dash-separated segment parts are checked.
const COUNTRIES: &[&str] = &[
    "england",
    "france",
    "germany",
    "deutschland",
    "italy",
    "italia",
    "spain",
    "espana",
    "brazil",
    "portugal",
    "netherlands",
    "belgium",
    "scotland",
    "switzerland",
    "austria",
    "turkey",
    "greece",
    "denmark",
    "sweden",
    "norway",
    "finland",
    "poland",
    "romania",
    "serbia",
    "croatia",
    "hungary",
];

/// English display name for the country a path refers to, when one of
/// its segments names a recognized country.
#[must_use]
pub fn infer_country_from_path(path: &Path) -> Option<String> {
    let display = |raw: &str| {
        let canonical = match raw {
            "deutschland" => "germany",
            "italia" => "italy",
            "espana" => "spain",
            other => other,
        };
        let mut chars = canonical.chars();
        chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect::<String>())
    };

    for component in path.components() {
        let Some(segment) = component.as_os_str().to_str() else {
            continue;
        };
        let segment = segment.to_lowercase();
        if COUNTRIES.contains(&segment.as_str()) {
            return display(&segment);
        }
        for part in segment.split('-') {
            if COUNTRIES.contains(&part) {
                return display(part);
            }
        }
    }
    None
}

/// Season label from the first `YYYY-YY` path segment, if any.
#[must_use]
pub fn season_label_from_path(path: &Path) -> Option<String> {
    path.components().find_map(|component| {
        let segment = component.as_os_str().to_str()?;
        SEASON_SEGMENT_RE.is_match(segment).then(|| segment.to_string())
    })
}

/// Options for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Reprocess every file regardless of stored hashes.
    pub force: bool,
    /// Process only the repository directory with this exact name.
    pub league: Option<String>,
    /// Process repositories on a rayon pool, one worker connection each.
    pub parallel: bool,
    pub threads: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            force: false,
            league: None,
            parallel: false,
            threads: 4,
        }
    }
}

/// Counters accumulated over a sync run.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncStats {
    pub files_processed: u64,
    pub files_unchanged: u64,
    pub files_failed: u64,
    pub clubs: BatchSummary,
    pub fixtures: BatchSummary,
    pub players: BatchSummary,
}

impl SyncStats {
    pub fn absorb(&mut self, other: Self) {
        self.files_processed += other.files_processed;
        self.files_unchanged += other.files_unchanged;
        self.files_failed += other.files_failed;
        self.clubs.absorb(other.clubs);
        self.fixtures.absorb(other.fixtures);
        self.players.absorb(other.players);
    }

    pub fn log_summary(&self, elapsed_secs: f64) {
        log::info!("sync complete in {elapsed_secs:.2}s");
        log::info!(
            "files: {} processed, {} unchanged, {} failed",
            self.files_processed,
            self.files_unchanged,
            self.files_failed
        );
        log::info!(
            "clubs: {} added, {} updated, {} skipped",
            self.clubs.added,
            self.clubs.updated,
            self.clubs.skipped
        );
        log::info!(
            "fixtures: {} added, {} updated, {} skipped",
            self.fixtures.added,
            self.fixtures.updated,
            self.fixtures.skipped
        );
        log::info!(
            "players: {} added, {} updated, {} skipped",
            self.players.added,
            self.players.updated,
            self.players.skipped
        );
    }
}

/// Everything a worker needs to process one repository: a database
/// handle, the loaded team mapper, and the force flag. In parallel
/// mode each worker gets its own context with its own connection.
#[derive(Debug)]
pub struct SyncContext<'a> {
    pub db: &'a Database,
    pub mapper: &'a TeamMapper,
    pub force: bool,
}

/// Run a full sync over the configured data root.
///
/// The only fatal error is a missing data root; everything narrower is
/// logged and skipped at the file or repository level. State is saved
/// once, at the end of the run.
pub fn run_sync(config: &Config, options: &SyncOptions) -> IngestResult<SyncStats> {
    let started = Instant::now();

    if !config.data_path.is_dir() {
        return Err(IngestError::DataRootMissing(config.data_path.clone()));
    }

    let mapper = TeamMapper::load(&config.mapper_path);
    let mut state = StateMap::load(&config.state_path);

    let mut repos: Vec<(String, PathBuf)> = std::fs::read_dir(&config.data_path)?
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            Some((name, entry.path()))
        })
        .collect();
    repos.sort();

    if let Some(league) = &options.league {
        repos.retain(|(name, _)| name == league);
        if repos.is_empty() {
            log::warn!("no repository named {league:?} under {}", config.data_path.display());
        }
    }
    log::info!("syncing {} repositories", repos.len());

    let mut stats = SyncStats::default();

    if options.parallel && repos.len() > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()
            .map_err(|e| IngestError::InvalidData(e.to_string()))?;

        let shared_state = &state;
        let results: Vec<(HashMap<String, String>, SyncStats)> = pool.install(|| {
            repos
                .par_iter()
                .map(|(name, path)| {
                    let db = match Database::open(&config.database_path) {
                        Ok(db) => db,
                        Err(err) => {
                            log::error!("could not open database for repo {name}: {err}");
                            // The whole repo went unprocessed; make the
                            // run summary say so.
                            let failed = SyncStats {
                                files_failed: 1,
                                ..SyncStats::default()
                            };
                            return (HashMap::new(), failed);
                        }
                    };
                    let ctx = SyncContext {
                        db: &db,
                        mapper: &mapper,
                        force: options.force,
                    };
                    sync_repo(&ctx, path, name, shared_state)
                })
                .collect()
        });

        for (updates, repo_stats) in results {
            state.absorb(updates);
            stats.absorb(repo_stats);
        }
    } else {
        let db = Database::open(&config.database_path)?;
        let ctx = SyncContext {
            db: &db,
            mapper: &mapper,
            force: options.force,
        };
        for (name, path) in &repos {
            let (updates, repo_stats) = sync_repo(&ctx, path, name, &state);
            state.absorb(updates);
            stats.absorb(repo_stats);
        }
    }

    state.save(&config.state_path)?;
    stats.log_summary(started.elapsed().as_secs_f64());
    Ok(stats)
}

/// Process one repository directory. Returns the state-map updates for
/// successfully processed files along with per-repo counters; errors
/// never escape a single file.
pub fn sync_repo(
    ctx: &SyncContext,
    repo_root: &Path,
    repo_name: &str,
    state: &StateMap,
) -> (HashMap<String, String>, SyncStats) {
    log::info!("syncing repo {repo_name}");
    let mut updates = HashMap::new();
    let mut stats = SyncStats::default();

    for entry in walkdir::WalkDir::new(repo_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let kind = FileKind::classify(path);
        if kind == FileKind::Unrecognized {
            continue;
        }

        let hash = match hash_file(path) {
            Ok(hash) => hash,
            Err(err) => {
                log::error!("could not hash {}: {err}", path.display());
                stats.files_failed += 1;
                continue;
            }
        };

        let state_key = state_key(repo_name, repo_root, path);
        if !ctx.force && state.hash_for(&state_key) == Some(hash.as_str()) {
            stats.files_unchanged += 1;
            continue;
        }

        let outcome: IngestResult<BatchSummary> = ctx.db.in_transaction(|db| {
            let file_ctx = SyncContext {
                db,
                mapper: ctx.mapper,
                force: ctx.force,
            };
            let summary = process_file(&file_ctx, path, kind, repo_name)?;
            db.insert_audit(&IngestionAudit::new(
                repo_name,
                state_key.clone(),
                summary.added as i64,
                summary.updated as i64,
                hash.clone(),
            ))?;
            Ok(summary)
        });

        match outcome {
            Ok(summary) => {
                stats.files_processed += 1;
                match kind {
                    FileKind::ClubText | FileKind::ClubJson => stats.clubs.absorb(summary),
                    FileKind::FixtureText | FileKind::FixtureCsv => stats.fixtures.absorb(summary),
                    FileKind::SquadText => stats.players.absorb(summary),
                    FileKind::Unrecognized => {}
                }
                updates.insert(state_key, hash);
            }
            Err(err) => {
                log::error!("failed to process {}: {err}", path.display());
                stats.files_failed += 1;
            }
        }
    }

    (updates, stats)
}

/// State-map key: `repo_name/relative/path`, with forward slashes on
/// every platform.
fn state_key(repo_name: &str, repo_root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(repo_root).unwrap_or(path);
    let mut key = String::from(repo_name);
    for component in rel.components() {
        key.push('/');
        key.push_str(&component.as_os_str().to_string_lossy());
    }
    key
}

fn process_file(
    ctx: &SyncContext,
    path: &Path,
    kind: FileKind,
    repo_name: &str,
) -> IngestResult<BatchSummary> {
    match kind {
        FileKind::ClubText => {
            let country = infer_country_from_path(path);
            let clubs = parsers::club_text::parse(path, country.as_deref())?;
            resolve::upsert_clubs(ctx.db, &clubs)
        }
        FileKind::ClubJson => {
            let clubs = parsers::club_json::parse(path, ctx.mapper)?;
            resolve::upsert_clubs(ctx.db, &clubs)
        }
        FileKind::FixtureText | FileKind::FixtureCsv => {
            let season_label = season_label_from_path(path);
            let season = find_or_create_season(ctx.db, repo_name, path, season_label.as_deref())?;
            let (season_id, season_year) = match &season {
                Some(s) => (Some(s.id), s.year_start),
                None => (None, None),
            };
            let fixtures = if kind == FileKind::FixtureCsv {
                parsers::fixture_csv::parse(path, ctx.mapper, season_year)?
            } else {
                parsers::fixture_text::parse(path, ctx.mapper, season_year)?
            };
            resolve::upsert_fixtures(ctx.db, &fixtures, season_id)
        }
        FileKind::SquadText => {
            let (club_id, team_id) = squad_owner(ctx, path)?;
            let players = parsers::squad_text::parse(path)?;
            resolve::upsert_players(ctx.db, &players, club_id, team_id)
        }
        FileKind::Unrecognized => Ok(BatchSummary::default()),
    }
}

/// Resolve the club and team a squad file belongs to from its filename
/// (`arsenal_fc.txt` -> `Arsenal Fc` -> mapper -> club row). Unresolved
/// squads are still ingested, just unattached.
fn squad_owner(ctx: &SyncContext, path: &Path) -> IngestResult<(Option<i64>, Option<i64>)> {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return Ok((None, None));
    };
    let spaced = stem.replace('_', " ");
    let titled = spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let canonical = ctx.mapper.canonical(&titled);
    let Some(club) = ctx.db.find_club_by_name(canonical)? else {
        log::debug!("no club found for squad file {}", path.display());
        return Ok((None, None));
    };
    let team_id = ctx.db.find_team_for_club(club.id)?.map(|t| t.id);
    Ok((Some(club.id), team_id))
}

/// Find or create the Competition (named after the repository) and the
/// Season for a fixture file's `YYYY-YY` path segment. A file outside
/// any season directory belongs to no season.
fn find_or_create_season(
    db: &Database,
    repo_name: &str,
    path: &Path,
    season_label: Option<&str>,
) -> IngestResult<Option<Season>> {
    let Some(label) = season_label else {
        return Ok(None);
    };

    let country = infer_country_from_path(path);
    let competition = match db.find_competition(repo_name, country.as_deref())? {
        Some(competition) => competition,
        None => {
            let mut competition = Competition::new(
                repo_name,
                pitchsync_core::model::CompetitionType::League,
            );
            competition.country = country;
            competition.id = db.insert_competition(&competition)?;
            competition
        }
    };

    let season = match db.find_season(competition.id, label)? {
        Some(season) => season,
        None => {
            let mut season = Season::new(competition.id, label);
            if season.year_start.is_none() {
                log::warn!("season label {label:?} has no usable year bounds");
            }
            season.id = db.insert_season(&season)?;
            season
        }
    };

    Ok(Some(season))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_country_from_repo_segment() {
        assert_eq!(
            infer_country_from_path(Path::new("eng-england/2023-24/1-premierleague.txt")),
            Some("England".to_string())
        );
        assert_eq!(
            infer_country_from_path(Path::new("de-deutschland/2023-24/1-bundesliga.txt")),
            Some("Germany".to_string())
        );
        assert_eq!(
            infer_country_from_path(Path::new("somewhere/else.txt")),
            None
        );
    }

    #[test]
    fn test_season_label_from_path() {
        assert_eq!(
            season_label_from_path(Path::new("eng-england/2023-24/1-premierleague.txt")),
            Some("2023-24".to_string())
        );
        assert_eq!(
            season_label_from_path(Path::new("eng-england/clubs/england.txt")),
            None
        );
    }

    #[test]
    fn test_state_key_uses_forward_slashes() {
        let key = state_key(
            "eng-england",
            Path::new("/data/eng-england"),
            Path::new("/data/eng-england/2023-24/1-premierleague.txt"),
        );
        assert_eq!(key, "eng-england/2023-24/1-premierleague.txt");
    }
}
