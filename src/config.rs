//! Client configuration, stored as JSON under `~/.tokengram/`.

use std::fs;
use std::path::PathBuf;

use alloy_primitives::Address;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Address of the ledger contract for the current chain.
    pub contract_address: Address,
    /// Where persisted client state lives; defaults to `~/.tokengram`.
    pub state_dir: Option<PathBuf>,
}

impl ClientConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".tokengram").join("config.json"))
    }

    /// Load the saved configuration, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                if let Ok(data) = fs::read_to_string(&path) {
                    if let Ok(config) = serde_json::from_str(&data) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("could not determine home directory"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Effective state directory for persisted client state.
    pub fn state_dir(&self) -> Option<PathBuf> {
        self.state_dir
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".tokengram")))
    }
}
