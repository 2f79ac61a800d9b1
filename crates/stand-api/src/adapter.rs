use std::sync::Arc;

use async_trait::async_trait;
use stand_core::{Dispatcher, ReleaseOutcome, SessionSnapshot};
use stand_model::{ActionToken, ArtifactReference, Requester, ResourceKey};
use tracing::debug;

use crate::error::ApiError;
use crate::handler::ApiHandler;

/// Adapter that bridges [`Dispatcher`] to [`ApiHandler`].
pub struct DispatcherAdapter {
    dispatcher: Arc<Dispatcher>,
}

impl DispatcherAdapter {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl ApiHandler for DispatcherAdapter {
    async fn session(&self, requester: Option<Requester>) -> SessionSnapshot {
        match requester {
            Some(r) => self.dispatcher.status(&r).await,
            None => self.dispatcher.session().snapshot(),
        }
    }

    async fn submit_artifact(
        &self,
        requester: Requester,
        reference: ArtifactReference,
    ) -> Result<(), ApiError> {
        // Detached: the pipeline reports its outcome to the requester itself.
        let _pipeline = self.dispatcher.submit_artifact(&requester, reference).await?;
        debug!(requester = %requester.id, "pipeline detached");
        Ok(())
    }

    async fn join_queue(&self, requester: Requester) -> Result<usize, ApiError> {
        Ok(self.dispatcher.join_queue(&requester).await?)
    }

    async fn leave_queue(&self, requester: Requester) -> Result<(), ApiError> {
        Ok(self.dispatcher.leave_queue(&requester).await?)
    }

    async fn advance_queue(&self, requester: Requester) -> Result<Option<Requester>, ApiError> {
        Ok(match self.dispatcher.advance_queue(&requester).await {
            ReleaseOutcome::HandedOff(next) => Some(next),
            ReleaseOutcome::Idle => None,
        })
    }

    async fn reset_session(&self, requester: Requester) -> Result<Option<ResourceKey>, ApiError> {
        Ok(self.dispatcher.reset_session(&requester).await)
    }

    async fn delete_resource(&self, requester: Requester, key: ResourceKey) -> Result<(), ApiError> {
        Ok(self.dispatcher.delete_resource(&requester, &key).await?)
    }

    async fn handle_action(&self, requester: Requester, token: ActionToken) -> Result<(), ApiError> {
        Ok(self.dispatcher.handle_action(&requester, token).await?)
    }
}
