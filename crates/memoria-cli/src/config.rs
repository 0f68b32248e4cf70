//! CLI configuration file support
//!
//! Loads configuration from ~/.config/memoria/config.toml

use std::path::{Path, PathBuf};

use memoria_ai::ObservationalMemoryConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    /// Engine settings shared with library consumers
    #[serde(default)]
    pub memory: ObservationalMemoryConfig,
}

impl CliConfig {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load_from_path(Some(path.to_path_buf())),
            None => Self::load_from_path(Self::default_path()),
        }
    }

    /// Load configuration from a specific path
    ///
    /// A missing or malformed file yields the defaults.
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "Ignoring invalid config file");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("memoria").join("config.toml"))
    }
}
