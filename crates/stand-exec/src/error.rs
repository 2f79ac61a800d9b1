use thiserror::Error;

use stand_core::{ArtifactError, RuntimeError};

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("spawn {program} failed: {reason}")]
    Spawn { program: String, reason: String },
    #[error("{program} exited with {code:?}: {stderr}")]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("io error: {0}")]
    Io(String),
}

pub type ExecResult<T> = Result<T, ExecError>;

impl ExecError {
    /// Captured stderr, empty for anything but a failed exit.
    pub fn stderr(&self) -> &str {
        match self {
            ExecError::NonZeroExit { stderr, .. } => stderr,
            _ => "",
        }
    }
}

impl From<std::io::Error> for ExecError {
    fn from(e: std::io::Error) -> Self {
        ExecError::Io(e.to_string())
    }
}

impl From<ExecError> for RuntimeError {
    fn from(e: ExecError) -> Self {
        RuntimeError::Failed(e.to_string())
    }
}

impl From<ExecError> for ArtifactError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::NonZeroExit { stderr, .. } => ArtifactError::Corrupt(stderr),
            other => ArtifactError::Io(other.to_string()),
        }
    }
}
