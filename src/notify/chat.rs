//! notify::chat
//!
//! Chat webhook notifier.
//!
//! # Design
//!
//! Posts the message to the configured `postMessage` endpoint as a
//! form-encoded body (`channel`, `text`, `token`), the wire shape the chat
//! service expects. The bot token is stapled on from configuration; callers
//! never pass credentials per message.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{Notifier, NotifyError};

/// Per-request timeout for webhook delivery.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Notifier posting to a chat `postMessage` webhook.
pub struct ChatWebhook {
    /// HTTP client for making requests
    client: Client,
    /// Full endpoint URL
    url: String,
    /// Bot token stapled onto every post
    token: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for ChatWebhook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWebhook").field("url", &self.url).finish()
    }
}

impl ChatWebhook {
    /// Create a webhook notifier for the given endpoint and bot token.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        ChatWebhook {
            client: Client::new(),
            url: url.into(),
            token: token.into(),
        }
    }

    /// The configured endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for ChatWebhook {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .timeout(REQUEST_TIMEOUT)
            .form(&[
                ("channel", channel),
                ("text", text),
                ("token", self.token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
