//! notify
//!
//! Abstraction for the outbound chat notification collaborator.
//!
//! # Design
//!
//! Broadcast commands hand their composited public message to a
//! [`Notifier`]. Delivery is best-effort from the dispatch pipeline's point
//! of view: a failed post is warned about and dropped, never folded into
//! the dispatch result.
//!
//! - [`chat`] - the chat webhook implementation (`postMessage` over HTTP)
//! - [`mock`] - recording notifier for tests

pub mod chat;
pub mod mock;

pub use chat::ChatWebhook;
pub use mock::MockNotifier;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from notification delivery.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    /// The webhook endpoint answered with an error status.
    #[error("webhook error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the endpoint
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),
}

/// The outbound "post message" collaborator.
///
/// Implementations must be `Send + Sync`; the gateway shares one notifier
/// across concurrent dispatches.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post `text` to `channel`.
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), NotifyError>;
}
