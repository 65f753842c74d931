//! config::schema
//!
//! Configuration schema types.
//!
//! # Layout
//!
//! ```toml
//! command = "/peon"
//!
//! [compute]
//! api_base = "https://compute.internal/api"
//!
//! [webhook]
//! url = "https://chat.example.com/api/chat.postMessage"
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing: the command marker must look like a
//! slash command, and endpoint URLs must be http(s). Tokens are not part of
//! the config file; see [`crate::auth`].

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default inbound command marker.
pub const DEFAULT_COMMAND: &str = "/peon";

/// Bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    /// Inbound command marker (e.g. "/peon")
    pub command: Option<String>,

    /// Compute API settings
    pub compute: Option<ComputeConfig>,

    /// Chat webhook settings
    pub webhook: Option<WebhookConfig>,
}

/// Compute API settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ComputeConfig {
    /// Base URL of the compute control plane
    pub api_base: Option<String>,
}

/// Chat webhook settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookConfig {
    /// Full `postMessage` endpoint URL
    pub url: Option<String>,
}

impl BotConfig {
    /// The inbound command marker, defaulted.
    pub fn command(&self) -> &str {
        self.command.as_deref().unwrap_or(DEFAULT_COMMAND)
    }

    /// The compute API base URL, if configured.
    pub fn compute_api_base(&self) -> Option<&str> {
        self.compute.as_ref().and_then(|c| c.api_base.as_deref())
    }

    /// The webhook endpoint URL, if configured.
    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook.as_ref().and_then(|w| w.url.as_deref())
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(command) = &self.command {
            if !command.starts_with('/') || command.len() < 2 {
                return Err(ConfigError::InvalidValue(format!(
                    "command marker '{}' must be a slash command",
                    command
                )));
            }
        }
        if let Some(api_base) = self.compute_api_base() {
            validate_url("compute.api_base", api_base)?;
        }
        if let Some(url) = self.webhook_url() {
            validate_url("webhook.url", url)?;
        }
        Ok(())
    }
}

/// Check that a configured endpoint is an http(s) URL.
fn validate_url(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "{} '{}' must be an http(s) URL",
            key, value
        )))
    }
}
