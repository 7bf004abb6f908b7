//! Persisted last-known transaction count.
//!
//! Written after every successful full refresh and read back at startup as a
//! cheap "has this wallet ever transacted" check. Never a source of truth;
//! the chain is re-queried on every session establishment.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const COUNT_FILE: &str = "transaction_count.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredCount {
    transaction_count: u64,
}

/// JSON-backed store for the cached transaction count.
#[derive(Debug, Clone)]
pub struct CountStore {
    path: PathBuf,
}

impl CountStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(COUNT_FILE),
        }
    }

    pub fn load(&self) -> Result<Option<u64>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let stored: StoredCount =
            serde_json::from_str(&contents).context("invalid transaction count file")?;
        Ok(Some(stored.transaction_count))
    }

    pub fn save(&self, transaction_count: u64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(&StoredCount { transaction_count })?;
        fs::write(&self.path, contents)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}
