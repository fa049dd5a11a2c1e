//! Folder snapshot store configuration.

use serde::{Deserialize, Serialize};

/// Where the command-line tool keeps its folder snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the JSON snapshot of folder records.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    /// Owner whose folders are listed.
    #[serde(default = "default_owner_id")]
    pub owner_id: String,
    /// Simulated remote latency in milliseconds.
    #[serde(default)]
    pub latency_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            owner_id: default_owner_id(),
            latency_ms: 0,
        }
    }
}

fn default_snapshot_path() -> String {
    "data/folders.json".to_string()
}

fn default_owner_id() -> String {
    "local".to_string()
}
