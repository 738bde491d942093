use anyhow::Result;

use pitchsync_core::Database;
use pitchsync_ingest::Config;

pub fn show_status(config: &Config) -> Result<()> {
    let db = Database::open(&config.database_path)?;

    println!("\n📊 Pitchsync Status\n");
    println!("  Database: {}", config.database_path.display());
    println!("  Data root: {}", config.data_path.display());
    println!();

    for (table, count) in db.entity_counts()? {
        println!("  {table}: {count}");
    }

    let audits = db.recent_audits(10)?;
    if audits.is_empty() {
        println!("\n  No ingestion runs recorded yet; run `pitchsync sync`");
    } else {
        println!("\n  Recent ingestion activity:");
        for audit in audits {
            println!(
                "    {}  {}  (+{} / ~{})",
                audit.ingested_at.format("%Y-%m-%d %H:%M:%S"),
                audit.file_path,
                audit.records_added,
                audit.records_updated
            );
        }
    }

    Ok(())
}
