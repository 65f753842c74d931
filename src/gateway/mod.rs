//! gateway
//!
//! Inbound envelope handling and outbound broadcast delivery.
//!
//! # Design
//!
//! The gateway is the boundary the chat integration talks to. It checks the
//! envelope's command discriminator against the configured marker,
//! validates the inbound app token, runs the dispatcher, and - for
//! broadcast results - composites and delivers the public message through
//! the [`Notifier`].
//!
//! Notification delivery is best-effort: a failed post is warned about and
//! dropped. The dispatch reply the caller receives is never affected by
//! webhook outcomes.

use std::sync::Arc;

use thiserror::Error;

use crate::auth::{Auth, AuthError};
use crate::dispatch::{DispatchContext, DispatchReply, Dispatcher};
use crate::notify::Notifier;
use crate::ui;
use crate::ui::Verbosity;

/// Errors from envelope handling.
///
/// These are the only failures that escape the gateway; everything past the
/// envelope boundary is shaped into a [`DispatchReply`] by the dispatcher.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The envelope's command discriminator does not match the configured
    /// marker.
    #[error("command {0} is unknown")]
    UnknownEnvelope(String),

    /// Inbound token validation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// The inbound context bundle from the chat integration.
#[derive(Debug, Clone)]
pub struct CommandEvent {
    /// Outer command discriminator (e.g. "/peon").
    pub command: String,
    /// The raw command text.
    pub text: String,
    /// Invoking user identity.
    pub user_name: String,
    /// Invoking channel identity.
    pub channel_id: String,
    /// Opaque auth token.
    pub token: String,
}

/// The assembled bot: dispatcher plus its collaborators.
pub struct Gateway {
    dispatcher: Dispatcher,
    notifier: Option<Arc<dyn Notifier>>,
    auth: Auth,
    marker: String,
    verbosity: Verbosity,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("marker", &self.marker)
            .field("has_notifier", &self.notifier.is_some())
            .finish()
    }
}

impl Gateway {
    /// Assemble a gateway.
    ///
    /// `notifier` is optional: a deployment without a webhook simply skips
    /// broadcast delivery.
    pub fn new(
        dispatcher: Dispatcher,
        notifier: Option<Arc<dyn Notifier>>,
        auth: Auth,
        marker: impl Into<String>,
        verbosity: Verbosity,
    ) -> Self {
        Gateway {
            dispatcher,
            notifier,
            auth,
            marker: marker.into(),
            verbosity,
        }
    }

    /// Handle one inbound command envelope.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::UnknownEnvelope`] when the discriminator does not
    ///   match the configured marker
    /// - [`GatewayError::Auth`] when the inbound token is rejected
    pub async fn handle(&self, event: &CommandEvent) -> Result<DispatchReply, GatewayError> {
        if event.command != self.marker {
            return Err(GatewayError::UnknownEnvelope(event.command.clone()));
        }
        self.auth.validate(&event.token)?;

        let ctx = DispatchContext::new(event.channel_id.as_str(), event.user_name.as_str());
        let reply = self.dispatcher.dispatch(&event.text, &ctx).await;

        if let Some(public) = reply.public() {
            self.deliver(event, public).await;
        }
        Ok(reply)
    }

    /// Composite and post the public half of a broadcast reply.
    async fn deliver(&self, event: &CommandEvent, public: &str) {
        let Some(notifier) = &self.notifier else {
            ui::debug("no notifier configured, skipping broadcast", self.verbosity);
            return;
        };
        let message = format!(
            "{} told peon to \"{}\".\n{}",
            event.user_name, event.text, public
        );
        if let Err(err) = notifier.post_message(&event.channel_id, &message).await {
            ui::warn(
                format!("notification delivery failed: {}", err),
                self.verbosity,
            );
        }
    }
}
