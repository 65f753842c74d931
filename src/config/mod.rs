//! config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order:
//! 1. `$PEON_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/peon/config.toml`
//! 3. `~/.config/peon/config.toml`
//!
//! A missing config file is not an error - defaults apply. A file that
//! exists but does not parse or validate is.

pub mod schema;

pub use schema::{BotConfig, ComputeConfig, WebhookConfig, DEFAULT_COMMAND};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_VAR: &str = "PEON_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

impl BotConfig {
    /// Load configuration.
    ///
    /// An explicit `path` is required to exist; discovered locations are
    /// optional and fall back to defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<BotConfig, ConfigError> {
        let path = match path {
            Some(explicit) => Some(explicit.to_path_buf()),
            None => discover_path().filter(|p| p.exists()),
        };

        let config = match path {
            Some(path) => Self::load_file(&path)?,
            None => BotConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and parse one config file.
    fn load_file(path: &Path) -> Result<BotConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// The default config file location for this environment.
fn discover_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_VAR) {
        return Some(PathBuf::from(explicit));
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg).join("peon").join("config.toml"));
    }
    dirs::config_dir().map(|dir| dir.join("peon").join("config.toml"))
}
