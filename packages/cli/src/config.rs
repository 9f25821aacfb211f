//! Optional TOML configuration for the `road_safety` binary.
//!
//! ```toml
//! data_path = "data/acidentes2024.csv"
//! default_uf = "SP"
//! ```
//!
//! Every key is optional. Command-line flags and their environment
//! variables take precedence over the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "road_safety.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings loaded from `road_safety.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Accident CSV to load.
    pub data_path: Option<PathBuf>,
    /// UF selected when no `--uf` is passed.
    pub default_uf: Option<String>,
}

impl DashboardConfig {
    /// Loads `explicit`, or [`DEFAULT_CONFIG_FILE`] if it exists.
    ///
    /// An explicitly named file must exist; a missing default file yields
    /// the empty configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is not valid
    /// TOML for this structure.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = toml::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
