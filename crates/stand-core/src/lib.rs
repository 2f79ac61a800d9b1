//! Single-stand reservation and deployment core.
//!
//! One [`SessionState`] guards the stand, an [`AdmissionQueue`] orders
//! everyone waiting for it and a [`DeploymentPipeline`] provisions the stand
//! for the current holder. Transports talk to the [`Dispatcher`]; all I/O
//! happens behind the traits in [`capability`].

pub mod capability;
pub use capability::{
    ArtifactSource, BuildSpec, Capabilities, ContainerRuntime, FetchedArtifact, HealthProbe,
    LaunchSpec, Notifier, PollReport, TaskTransport,
};

pub mod config;
pub use config::{AccessSettings, BuildSettings, LaunchSettings, Limits, StandConfig, TaskStep, Timings};

pub mod error;
pub use error::{
    ActionError, ArtifactError, ConfigError, InputRejection, NotifyError, PipelineError,
    QueueError, RuntimeError, TransportError,
};

pub mod event;
pub use event::{Event, EventBus, EventKind, Subscribe};

pub mod messages;

mod notify;
pub use notify::Messenger;

mod queue;
pub use queue::AdmissionQueue;

mod session;
pub use session::{Lease, ReleaseOutcome, SessionSnapshot, SessionState};

mod expiry;
pub use expiry::{ExpiryScheduler, spawn_reminder};

mod task;
pub use task::{TaskOutcome, TaskRunner};

pub mod pipeline;
pub use pipeline::{Deployment, DeploymentPipeline};

mod dispatch;
pub use dispatch::{Dispatcher, PipelineHandle};

#[cfg(test)]
pub(crate) mod fakes;
