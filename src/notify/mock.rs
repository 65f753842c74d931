//! notify::mock
//!
//! Recording notifier for deterministic testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Notifier, NotifyError};

/// A delivered message, for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    /// Target channel.
    pub channel: String,
    /// Message text.
    pub text: String,
}

/// Mock notifier recording every post.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    inner: Arc<Mutex<MockNotifierInner>>,
}

#[derive(Debug, Default)]
struct MockNotifierInner {
    posted: Vec<PostedMessage>,
    fail_with: Option<NotifyError>,
}

impl MockNotifier {
    /// Create a mock notifier.
    pub fn new() -> Self {
        MockNotifier::default()
    }

    /// Configure every post to fail with the given error.
    pub fn with_failure(self, error: NotifyError) -> Self {
        self.inner.lock().unwrap().fail_with = Some(error);
        self
    }

    /// All recorded posts, in delivery order.
    pub fn posted(&self) -> Vec<PostedMessage> {
        self.inner.lock().unwrap().posted.clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        let mut inner = self.inner.lock().unwrap();
        inner.posted.push(PostedMessage {
            channel: channel.to_string(),
            text: text.to_string(),
        });
        match &inner.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
