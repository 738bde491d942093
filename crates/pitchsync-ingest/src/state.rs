//! Incremental-sync state: one content hash per processed file.
//!
//! The state file is a flat JSON object mapping `"repo/relative/path"`
//! to the SHA-256 of the file's bytes at its last successful ingest.
//! It is loaded once at the start of a run and written once at the
//! end; a file whose hash is unchanged is skipped entirely, which is
//! what makes re-syncing a mostly-unchanged data tree cheap.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::IngestResult;

/// The per-file hash map carried between runs.
#[derive(Debug, Clone, Default)]
pub struct StateMap {
    entries: HashMap<String, String>,
}

impl StateMap {
    /// Load state from a JSON file. Missing or corrupt state degrades
    /// to empty with a warning, which just means a full re-ingest.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::info!(
                    "no ingestion state at {} ({err}); running a full sync",
                    path.display()
                );
                return Self::default();
            }
        };

        match serde_json::from_str::<HashMap<String, String>>(&text) {
            Ok(entries) => {
                log::info!("loaded ingestion state for {} files", entries.len());
                Self { entries }
            }
            Err(err) => {
                log::warn!(
                    "ingestion state at {} is corrupt ({err}); running a full sync",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Write state as JSON with sorted keys.
    pub fn save(&self, path: &Path) -> IngestResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let sorted: BTreeMap<&String, &String> = self.entries.iter().collect();
        let json = serde_json::to_string_pretty(&sorted)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    #[must_use]
    pub fn hash_for(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn record(&mut self, key: String, hash: String) {
        self.entries.insert(key, hash);
    }

    /// Fold another run's updates in (used after parallel workers).
    pub fn absorb(&mut self, updates: HashMap<String, String>) {
        self.entries.extend(updates);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// SHA-256 of a file's bytes, streamed, as lowercase hex.
pub fn hash_file(path: &Path) -> IngestResult<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "Arsenal FC 2-1 Chelsea FC\n").unwrap();
        std::fs::write(&b, "Arsenal FC 2-1 Chelsea FC\n").unwrap();

        assert_eq!(hash_file(&a).unwrap(), hash_file(&b).unwrap());

        std::fs::write(&b, "Arsenal FC 3-1 Chelsea FC\n").unwrap();
        assert_ne!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut state = StateMap::default();
        state.record("eng-england/2023-24/1-premierleague.txt".to_string(), "abc".to_string());
        state.save(&path).unwrap();

        let loaded = StateMap::load(&path);
        assert_eq!(
            loaded.hash_for("eng-england/2023-24/1-premierleague.txt"),
            Some("abc")
        );
    }

    #[test]
    fn test_missing_state_degrades_to_empty() {
        let state = StateMap::load(Path::new("/nonexistent/state.json"));
        assert!(state.is_empty());
    }
}
