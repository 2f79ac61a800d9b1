use std::time::Duration;

use async_trait::async_trait;
use stand_core::HealthProbe;
use tracing::trace;

/// Ready iff a GET on the health URL answers 200.
pub struct HttpHealthProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpHealthProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn is_ready(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(resp) => {
                trace!(url = %self.url, status = %resp.status(), "health probe answered");
                resp.status() == reqwest::StatusCode::OK
            }
            Err(e) => {
                trace!(url = %self.url, error = %e, "health probe unreachable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_is_not_ready() {
        let probe = HttpHealthProbe::new("http://127.0.0.1:1/cdi/ui", Duration::from_millis(500)).unwrap();
        assert!(!probe.is_ready().await);
    }
}
