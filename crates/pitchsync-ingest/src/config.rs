use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for pitchsync.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (PITCH_* prefix)
/// 3. Config file (~/.config/pitchsync/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory holding the cloned league data repositories, one
    /// subdirectory per repository (e.g. `eng-england/`, `de-deutschland/`).
    ///
    /// Can be set via:
    /// - CLI: --data-dir /path/to/data
    /// - ENV: PITCH_DATA_PATH
    /// - Config: data_path = "/path/to/data"
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: PITCH_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/pitchsync/pitchsync.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Path to the ingestion state file (per-file content hashes from
    /// the previous run).
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Path to the team mapper JSON file.
    #[serde(default = "default_mapper_path")]
    pub mapper_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            database_path: default_db_path(),
            state_path: default_state_path(),
            mapper_path: default_mapper_path(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/pitchsync/config.toml
    /// Reads environment variables with PITCH_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("pitch");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Apply CLI overrides on top of the loaded configuration.
    pub fn load_with_overrides(
        db_path: Option<PathBuf>,
        data_path: Option<PathBuf>,
    ) -> Result<Self> {
        let mut config = Self::load()?;
        if let Some(path) = db_path {
            config.database_path = path;
        }
        if let Some(path) = data_path {
            config.data_path = path;
        }
        Ok(config)
    }
}

fn data_home() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pitchsync")
}

/// Returns: ~/.local/share/pitchsync/data (or platform equivalent)
fn default_data_path() -> PathBuf {
    data_home().join("data")
}

/// Returns: ~/.local/share/pitchsync/pitchsync.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    data_home().join("pitchsync.db")
}

fn default_state_path() -> PathBuf {
    data_home().join("ingestion_state.json")
}

fn default_mapper_path() -> PathBuf {
    data_home().join("team_mapper.json")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/pitchsync/config.toml
/// - macOS: ~/Library/Application Support/pitchsync/config.toml
/// - Windows: %APPDATA%\pitchsync\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pitchsync")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Pitchsync Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (PITCH_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Root directory holding the cloned league data repositories
#
# Can also be set via:
# - CLI: pitchsync --data-dir /path/to/data sync
# - Environment: PITCH_DATA_PATH=/path/to/data
#data_path = "/path/to/data"

# Path to the SQLite database
#
# Can also be set via:
# - CLI: pitchsync --db /custom/path.db sync
# - Environment: PITCH_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/pitchsync.db"

# Path to the ingestion state file (per-file hashes from the last run)
#state_path = "/path/to/ingestion_state.json"

# Path to the team mapper JSON file
#mapper_path = "/path/to/team_mapper.json"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.database_path.as_os_str().is_empty());
        assert!(!config.data_path.as_os_str().is_empty());
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_cli_overrides_win() {
        let db = PathBuf::from("/tmp/test.db");
        let data = PathBuf::from("/tmp/data");
        let config = Config::load_with_overrides(Some(db.clone()), Some(data.clone())).unwrap();
        assert_eq!(config.database_path, db);
        assert_eq!(config.data_path, data);
    }
}
