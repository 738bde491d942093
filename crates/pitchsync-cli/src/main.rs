use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use pitchsync_ingest::{Config, SyncOptions};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "pitchsync", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/pitchsync/pitchsync.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Root directory holding the cloned data repositories
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Sync the raw data tree into the database
    ///
    /// Walks every repository directory under the data root, classifies
    /// each file (club registry, match list, squad), and parses and
    /// upserts its contents. The sync is incremental: a content hash is
    /// stored per file, and files whose hash is unchanged since the last
    /// run are skipped entirely.
    ///
    /// Each processed file runs in its own transaction and writes one
    /// audit row; a file that fails to parse or persist is rolled back
    /// and retried on the next run. Use 'pitchsync status' to inspect
    /// entity counts and recent audit rows afterwards.
    Sync {
        /// Reprocess every file, ignoring stored hashes
        #[arg(long)]
        force: bool,
        /// Process only the repository directory with this name
        #[arg(long)]
        league: Option<String>,
        /// Process repositories in parallel
        #[arg(long)]
        parallel: bool,
        /// Worker threads for --parallel
        #[arg(long, default_value_t = 4)]
        threads: usize,
    },
    /// Rebuild the team-name mapper from the data tree
    ///
    /// Harvests every team spelling the data tree contains (club
    /// registries, squad filenames, fixture team tokens) and writes the
    /// variant-to-canonical dictionary the sync uses. Rerun after
    /// adding new repositories.
    BuildMapper {
        /// Write the mapper here instead of the configured path
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Remove misassigned and duplicate fixtures
    Repair,
    /// Show entity counts and recent ingestion activity
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load_with_overrides(cli.db, cli.data_dir)?;

    // Ensure database directory exists
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match cli.command {
        Commands::Sync {
            force,
            league,
            parallel,
            threads,
        } => {
            let options = SyncOptions {
                force,
                league,
                parallel,
                threads,
            };
            commands::run_sync(&config, &options)?;
        }
        Commands::BuildMapper { output } => {
            let mut config = config;
            if let Some(path) = output {
                config.mapper_path = path;
            }
            commands::run_build_mapper(&config)?;
        }
        Commands::Repair => {
            commands::run_repair(&config)?;
        }
        Commands::Status => {
            commands::show_status(&config)?;
        }
    }

    Ok(())
}
