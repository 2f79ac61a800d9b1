use std::sync::Arc;

use stand_model::{ActionToken, RequesterId};
use tracing::warn;

use crate::capability::Notifier;

/// Fire-and-log wrapper around a [`Notifier`].
///
/// Delivery failures are logged and swallowed: a lost message must never
/// leave the stand wedged.
#[derive(Clone)]
pub struct Messenger {
    inner: Arc<dyn Notifier>,
}

impl Messenger {
    pub fn new(inner: Arc<dyn Notifier>) -> Self {
        Self { inner }
    }

    pub async fn send(&self, to: &RequesterId, text: &str) {
        if let Err(e) = self.inner.send(to, text).await {
            warn!(recipient = %to, error = %e, "notification not delivered");
        }
    }

    pub async fn send_action(&self, to: &RequesterId, text: &str, label: &str, token: &ActionToken) {
        if let Err(e) = self
            .inner
            .send_with_action(to, text, label, &token.encode())
            .await
        {
            warn!(recipient = %to, error = %e, action = %token, "notification not delivered");
        }
    }
}
