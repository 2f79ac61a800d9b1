use thiserror::Error;

use stand_model::Stage;

/// Failure reported by a [`ContainerRuntime`](crate::ContainerRuntime).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A container with the requested name already exists.
    #[error("container name already in use: {0}")]
    NameConflict(String),
    #[error("container runtime failed: {0}")]
    Failed(String),
}

/// Failure reported by an [`ArtifactSource`](crate::ArtifactSource).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("archive exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("archive transfer failed: {0}")]
    Transfer(String),
    #[error("archive has no version manifest")]
    MissingManifest,
    #[error("archive has no payload data file")]
    MissingPayload,
    #[error("archive is corrupt: {0}")]
    Corrupt(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ArtifactError {
    fn from(e: std::io::Error) -> Self {
        ArtifactError::Io(e.to_string())
    }
}

/// Failure talking to the remote task service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("remote task request failed: {0}")]
    Request(String),
    #[error("remote task service returned {0}")]
    Status(u16),
    #[error("unexpected remote task response: {0}")]
    InvalidResponse(String),
}

/// Failure delivering a notification. Never fatal to the caller.
#[derive(Error, Debug, Clone)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Why a submission was rejected before or while fetching the archive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputRejection {
    #[error("archive must have the {0} extension")]
    WrongExtension(String),
    #[error("archive exceeds {limit} bytes")]
    TooLarge { limit: u64 },
}

/// Terminal failure of one pipeline run.
///
/// Every variant aborts the remaining stages and releases the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("rejected input: {0}")]
    UserInput(InputRejection),

    #[error("unusable archive: {0}")]
    Artifact(ArtifactError),

    /// Container name taken. Only surfaces between the first launch attempt
    /// and the remediation; a second conflict becomes `Infrastructure`.
    #[error("resource {0} already exists")]
    ResourceConflict(String),

    #[error("{stage:?} failed: {detail}")]
    Infrastructure { stage: Stage, detail: String },

    #[error("readiness not reached after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("remote task {task} failed: {description}")]
    RemoteTask {
        task: String,
        description: String,
        access_url: String,
    },
}

impl PipelineError {
    pub(crate) fn infra(stage: Stage, detail: impl ToString) -> Self {
        PipelineError::Infrastructure {
            stage,
            detail: detail.to_string(),
        }
    }

    /// Stage the run was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::UserInput(_) => Stage::AcquireArtifact,
            PipelineError::Artifact(_) => Stage::ExtractAndParse,
            PipelineError::ResourceConflict(_) => Stage::Launch,
            PipelineError::Infrastructure { stage, .. } => *stage,
            PipelineError::Timeout { .. } => Stage::WaitForReadiness,
            PipelineError::RemoteTask { .. } => Stage::RunRemoteTasks,
        }
    }

    /// Short label used in events and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::UserInput(_) => "user_input",
            PipelineError::Artifact(_) => "artifact",
            PipelineError::ResourceConflict(_) => "resource_conflict",
            PipelineError::Infrastructure { .. } => "infrastructure",
            PipelineError::Timeout { .. } => "timeout",
            PipelineError::RemoteTask { .. } => "remote_task",
        }
    }
}

/// Benign queue conditions. Reported to the requester, nothing mutates.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("requester is not queued")]
    NotQueued,
    #[error("requester is already queued at position {0}")]
    AlreadyQueued(usize),
}

/// Failure of a non-pipeline action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("stand is held by {holder}")]
    Busy { holder: String },
    #[error("requester already holds the stand")]
    AlreadyHolding,
    #[error("only the current holder may do this")]
    NotHolder,
    /// Nothing to wait for: the stand can be taken directly.
    #[error("stand is free")]
    StandFree,
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

/// Invalid [`StandConfig`](crate::StandConfig).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
