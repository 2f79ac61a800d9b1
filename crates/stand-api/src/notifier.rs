//! [`Notifier`] implementations.

use async_trait::async_trait;
use serde::Serialize;
use stand_core::{NotifyError, Notifier};
use stand_model::RequesterId;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct Notification<'a> {
    recipient: &'a RequesterId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<ActionButton<'a>>,
}

#[derive(Debug, Serialize)]
struct ActionButton<'a> {
    label: &'a str,
    token: &'a str,
}

/// Posts every notification as JSON to a fixed URL (a chat bridge, usually).
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn post(&self, notification: &Notification<'_>) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .map_err(|e| NotifyError(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(NotifyError(format!("webhook answered {}", resp.status())));
        }
        debug!(recipient = %notification.recipient, "notification delivered");
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, recipient: &RequesterId, text: &str) -> Result<(), NotifyError> {
        self.post(&Notification {
            recipient,
            text,
            action: None,
        })
        .await
    }

    async fn send_with_action(
        &self,
        recipient: &RequesterId,
        text: &str,
        action_label: &str,
        action_token: &str,
    ) -> Result<(), NotifyError> {
        self.post(&Notification {
            recipient,
            text,
            action: Some(ActionButton {
                label: action_label,
                token: action_token,
            }),
        })
        .await
    }
}

/// Writes notifications to the log; used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &RequesterId, text: &str) -> Result<(), NotifyError> {
        info!(recipient = %recipient, text, "notification");
        Ok(())
    }

    async fn send_with_action(
        &self,
        recipient: &RequesterId,
        text: &str,
        action_label: &str,
        action_token: &str,
    ) -> Result<(), NotifyError> {
        info!(recipient = %recipient, text, action = action_label, token = action_token, "notification");
        Ok(())
    }
}
