use anyhow::Result;

use pitchsync_core::Database;
use pitchsync_ingest::Config;

pub fn run_repair(config: &Config) -> Result<()> {
    let db = Database::open(&config.database_path)?;

    println!("\n🩹 Repairing fixtures in {}\n", config.database_path.display());

    let report = pitchsync_ingest::run_repair(&db)?;

    if report.is_clean() {
        println!("  Nothing to repair");
    } else {
        println!("  Removed {} misassigned fixtures", report.misassigned_removed);
        println!("  Removed {} duplicate fixtures", report.duplicates_removed);
    }

    Ok(())
}
