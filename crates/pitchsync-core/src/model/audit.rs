use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only log row written once per (repo, file) ingestion attempt.
///
/// The recorded content hash doubles as the skip-if-unchanged signal for
/// the incremental sync driver's state map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionAudit {
    pub id: i64,
    pub repo: String,
    pub file_path: String,
    pub ingested_at: DateTime<Utc>,
    pub records_added: i64,
    pub records_updated: i64,
    pub hash: String,
}

impl IngestionAudit {
    #[must_use]
    pub fn new(
        repo: impl Into<String>,
        file_path: impl Into<String>,
        records_added: i64,
        records_updated: i64,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            repo: repo.into(),
            file_path: file_path.into(),
            ingested_at: Utc::now(),
            records_added,
            records_updated,
            hash: hash.into(),
        }
    }
}
