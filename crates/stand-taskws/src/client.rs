use std::time::Duration;

use async_trait::async_trait;
use stand_core::{PollReport, TaskTransport, TransportError};
use stand_model::{RemoteStatus, TaskParam};
use tracing::{debug, instrument};

use crate::{config::TaskWsSettings, envelope};

/// [`TaskTransport`] over the task web service.
pub struct TaskWsClient {
    client: reqwest::Client,
    endpoint: String,
    username: String,
    password: String,
}

impl TaskWsClient {
    pub fn new(settings: &TaskWsSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint(),
            username: settings.username.clone(),
            password: settings.password.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, payload: String) -> Result<String, TransportError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .basic_auth(&self.username, Some(&self.password))
            .body(payload)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        resp.text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))
    }
}

#[async_trait]
impl TaskTransport for TaskWsClient {
    #[instrument(level = "debug", skip(self, params))]
    async fn submit(&self, name: &str, params: &[TaskParam]) -> Result<String, TransportError> {
        let body = self.call(envelope::execute_request(name, params)).await?;
        let id = envelope::execution_id(&body)
            .ok_or_else(|| TransportError::InvalidResponse("no execution id in response".into()))?;
        debug!(task = name, execution = %id, "task started");
        Ok(id)
    }

    #[instrument(level = "debug", skip(self))]
    async fn poll(&self, execution_id: &str) -> Result<PollReport, TransportError> {
        let body = self.call(envelope::status_request(execution_id)).await?;
        let state = envelope::state(&body)
            .ok_or_else(|| TransportError::InvalidResponse("no task state in response".into()))?;
        Ok(PollReport {
            status: RemoteStatus::parse(&state),
            description: envelope::description(&body).unwrap_or_default(),
        })
    }
}
