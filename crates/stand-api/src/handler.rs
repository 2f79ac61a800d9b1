use async_trait::async_trait;
use stand_core::SessionSnapshot;
use stand_model::{ActionToken, ArtifactReference, Requester, ResourceKey};

use crate::error::ApiError;

/// Stand action API handler.
///
/// Transports call this trait; the provided [`DispatcherAdapter`](crate::DispatcherAdapter)
/// forwards to the core, custom handlers can add auth or auditing in front of it.
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Current session. With a requester, they are also greeted or told who is on the stand.
    async fn session(&self, requester: Option<Requester>) -> SessionSnapshot;

    /// Take the stand and start deploying the archive in the background.
    async fn submit_artifact(
        &self,
        requester: Requester,
        reference: ArtifactReference,
    ) -> Result<(), ApiError>;

    /// Returns the 1-based queue position.
    async fn join_queue(&self, requester: Requester) -> Result<usize, ApiError>;

    async fn leave_queue(&self, requester: Requester) -> Result<(), ApiError>;

    /// Returns whoever the stand was offered to, if anyone.
    async fn advance_queue(&self, requester: Requester) -> Result<Option<Requester>, ApiError>;

    /// Returns the resource key of the discarded session.
    async fn reset_session(&self, requester: Requester) -> Result<Option<ResourceKey>, ApiError>;

    async fn delete_resource(&self, requester: Requester, key: ResourceKey) -> Result<(), ApiError>;

    /// A pressed action button.
    async fn handle_action(&self, requester: Requester, token: ActionToken) -> Result<(), ApiError>;
}
