//! auth
//!
//! Inbound token validation and outbound token supply.
//!
//! # Design
//!
//! The chat integration sends an opaque app token with every command
//! envelope; the gateway validates it against the configured value before
//! the dispatcher runs. The bot token is what the webhook notifier staples
//! onto outbound posts. Both come from the environment - tokens never live
//! in the config file.

use thiserror::Error;

/// Environment variable holding the inbound app token.
pub const APP_TOKEN_VAR: &str = "PEON_APP_TOKEN";

/// Environment variable holding the outbound bot token.
pub const BOT_TOKEN_VAR: &str = "PEON_BOT_TOKEN";

/// Environment variable holding the compute API token, if the control
/// plane requires one.
pub const COMPUTE_TOKEN_VAR: &str = "PEON_COMPUTE_TOKEN";

/// Errors from authentication.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The inbound token does not match the configured app token.
    #[error("access denied")]
    AccessDenied,

    /// A required token variable is not set.
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
}

/// Token pair for one deployment.
#[derive(Clone)]
pub struct Auth {
    app_token: String,
    bot_token: String,
}

// Custom Debug to avoid exposing tokens
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth").finish_non_exhaustive()
    }
}

impl Auth {
    /// Create from explicit tokens.
    pub fn new(app_token: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Auth {
            app_token: app_token.into(),
            bot_token: bot_token.into(),
        }
    }

    /// Read tokens from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingEnv`] naming the first absent variable.
    pub fn from_env() -> Result<Self, AuthError> {
        let app_token =
            std::env::var(APP_TOKEN_VAR).map_err(|_| AuthError::MissingEnv(APP_TOKEN_VAR))?;
        let bot_token =
            std::env::var(BOT_TOKEN_VAR).map_err(|_| AuthError::MissingEnv(BOT_TOKEN_VAR))?;
        Ok(Auth::new(app_token, bot_token))
    }

    /// Validate an inbound token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AccessDenied`] on mismatch.
    pub fn validate(&self, token: &str) -> Result<(), AuthError> {
        if token == self.app_token {
            Ok(())
        } else {
            Err(AuthError::AccessDenied)
        }
    }

    /// The inbound app token.
    pub fn app_token(&self) -> &str {
        &self.app_token
    }

    /// The outbound bot token.
    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }
}
