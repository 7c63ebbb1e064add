use crate::error::{HodgeError, Result};
use crate::io;
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// RetryEntry
// ---------------------------------------------------------------------------

/// One failed PM operation, eligible for replay. Created on sync failure,
/// removed only when a replay succeeds — never partially applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryEntry {
    #[serde(rename = "type")]
    pub entry_type: String,
    pub feature: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decisions: Vec<String>,
    #[serde(default)]
    pub is_epic: bool,
    pub timestamp: DateTime<Utc>,
}

impl RetryEntry {
    pub fn create_issue(feature: &str, decisions: &[String], is_epic: bool) -> Self {
        Self {
            entry_type: "create_issue".to_string(),
            feature: feature.to_string(),
            decisions: decisions.to_vec(),
            is_epic,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// RetryQueue
// ---------------------------------------------------------------------------

/// Durable file-backed list of pending retries. An absent file is an empty
/// queue, not an error.
pub struct RetryQueue {
    path: PathBuf,
}

impl RetryQueue {
    pub fn new(root: &Path) -> Result<Self> {
        paths::validate_base_path(root)?;
        Ok(Self {
            path: paths::pm_queue_path(root),
        })
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<Vec<RetryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&self.path).map_err(|source| {
            HodgeError::ReadState {
                path: self.path.to_string_lossy().into_owned(),
                source,
            }
        })?;
        let entries: Vec<RetryEntry> = serde_json::from_str(&data)?;
        Ok(entries)
    }

    pub fn push(&self, entry: RetryEntry) -> Result<()> {
        let mut entries = self.load()?;
        entries.push(entry);
        self.replace(&entries)
    }

    pub fn replace(&self, entries: &[RetryEntry]) -> Result<()> {
        let data = serde_json::to_string_pretty(entries)?;
        io::atomic_write(&self.path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
