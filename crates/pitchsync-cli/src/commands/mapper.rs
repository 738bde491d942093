use anyhow::Result;

use pitchsync_ingest::{Config, TeamMapper};

pub fn run_build_mapper(config: &Config) -> Result<()> {
    println!("\n🔨 Building team mapper from {}\n", config.data_path.display());

    let mapper = TeamMapper::build(&config.data_path)?;
    mapper.save(&config.mapper_path)?;

    println!(
        "  Wrote {} entries to {}",
        mapper.len(),
        config.mapper_path.display()
    );

    Ok(())
}
