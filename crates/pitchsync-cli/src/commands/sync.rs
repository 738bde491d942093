use anyhow::Result;

use pitchsync_ingest::{Config, SyncOptions};

pub fn run_sync(config: &Config, options: &SyncOptions) -> Result<()> {
    println!("\n⚽ Syncing {}\n", config.data_path.display());

    let stats = pitchsync_ingest::run_sync(config, options)?;

    println!(
        "  Files: {} processed, {} unchanged, {} failed",
        stats.files_processed, stats.files_unchanged, stats.files_failed
    );
    println!(
        "  Clubs: {} added, {} updated",
        stats.clubs.added, stats.clubs.updated
    );
    println!(
        "  Fixtures: {} added, {} updated, {} skipped",
        stats.fixtures.added, stats.fixtures.updated, stats.fixtures.skipped
    );
    println!(
        "  Players: {} added, {} updated",
        stats.players.added, stats.players.updated
    );

    if stats.files_failed > 0 {
        println!("\n  Some files failed; they will be retried on the next run");
    }

    Ok(())
}
