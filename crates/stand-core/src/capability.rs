//! Capabilities the core consumes but does not implement.
//!
//! Production implementations live in `stand-exec`, `stand-taskws` and
//! `stand-api`; tests use the doubles in `fakes`.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use stand_model::{ArtifactReference, RemoteStatus, RequesterId, TaskParam, VersionInfo};

use crate::error::{ArtifactError, NotifyError, RuntimeError, TransportError};

/// What to build an image from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    pub dockerfile: PathBuf,
    pub context_dir: PathBuf,
}

/// How to start a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub image: String,
    pub name: String,
    pub ports: Vec<String>,
    pub volumes: Vec<String>,
    pub env: Vec<String>,
}

#[async_trait]
pub trait ContainerRuntime: Send + Sync + 'static {
    async fn build(
        &self,
        spec: &BuildSpec,
        tags: &[String],
        args: &BTreeMap<String, String>,
    ) -> Result<(), RuntimeError>;

    /// Start a container. A taken name must surface as [`RuntimeError::NameConflict`].
    async fn run(&self, spec: &LaunchSpec) -> Result<(), RuntimeError>;

    /// Stop and remove a container; removing an already stopped one is not an error.
    async fn stop(&self, name: &str) -> Result<(), RuntimeError>;

    async fn is_running(&self, name: &str) -> Result<bool, RuntimeError>;

    /// Stop and remove every container, or only the one named `name_filter`.
    async fn kill_all(&self, name_filter: Option<&str>) -> Result<(), RuntimeError>;
}

/// A downloaded archive on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
}

#[async_trait]
pub trait ArtifactSource: Send + Sync + 'static {
    async fn fetch(&self, reference: &ArtifactReference) -> Result<FetchedArtifact, ArtifactError>;

    /// Both the version manifest and the payload must be present.
    async fn parse(&self, path: &Path) -> Result<VersionInfo, ArtifactError>;
}

/// One status poll of a remote execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub status: RemoteStatus,
    pub description: String,
}

#[async_trait]
pub trait TaskTransport: Send + Sync + 'static {
    /// Start the named operation, returning the remote execution id.
    async fn submit(&self, name: &str, params: &[TaskParam]) -> Result<String, TransportError>;

    async fn poll(&self, execution_id: &str) -> Result<PollReport, TransportError>;
}

#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send(&self, recipient: &RequesterId, text: &str) -> Result<(), NotifyError>;

    async fn send_with_action(
        &self,
        recipient: &RequesterId,
        text: &str,
        action_label: &str,
        action_token: &str,
    ) -> Result<(), NotifyError>;
}

/// Readiness check for the launched application.
#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    /// `true` only for a healthy (HTTP 200) answer; unreachable is `false`.
    async fn is_ready(&self) -> bool;
}

/// Every capability the core needs, wired once at startup.
#[derive(Clone)]
pub struct Capabilities {
    pub runtime: Arc<dyn ContainerRuntime>,
    pub artifacts: Arc<dyn ArtifactSource>,
    pub transport: Arc<dyn TaskTransport>,
    pub probe: Arc<dyn HealthProbe>,
    pub notifier: Arc<dyn Notifier>,
}
