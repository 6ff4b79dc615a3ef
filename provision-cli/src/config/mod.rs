//! Import configuration
//!
//! Named configurations live as TOML files in the platform config directory.
//! A configuration owns the header mapping and the set of action types that
//! are excluded from execution.

mod attributes;

pub use attributes::well_known_attributes;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::mapping::HeaderMapping;
use crate::template::DEFAULT_ACCOUNT_MAX_LEN;

/// One named import configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    pub name: String,
    pub backend_url: String,
    #[serde(default)]
    pub header_mapping: HeaderMapping,
    #[serde(default)]
    pub disabled_action_types: Vec<String>,
    /// OU where new objects land when the mapping does not say otherwise.
    #[serde(default)]
    pub default_ou: Option<String>,
    #[serde(default = "default_account_max_length")]
    pub account_max_length: usize,
}

fn default_account_max_length() -> usize {
    DEFAULT_ACCOUNT_MAX_LEN
}

impl ImportConfig {
    pub fn new(name: &str, backend_url: &str) -> Self {
        Self {
            name: name.to_string(),
            backend_url: backend_url.to_string(),
            header_mapping: HeaderMapping::new(),
            disabled_action_types: Vec::new(),
            default_ou: None,
            account_max_length: DEFAULT_ACCOUNT_MAX_LEN,
        }
    }

    /// Path of a named configuration inside the platform config directory.
    pub fn default_path(name: &str) -> Result<PathBuf> {
        let mut path = dirs::config_dir().context("no config directory on this platform")?;
        path.push("provision-cli");
        path.push(format!("{}.toml", name));
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        log::info!("saved configuration '{}' to {}", self.name, path.display());
        Ok(())
    }
}
