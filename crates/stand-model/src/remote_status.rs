use serde::{Deserialize, Serialize};

/// Status reported by the remote task service for one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RemoteStatus {
    Running,
    Finished,
    Skipped,
    Error,
    /// Anything the service reported that is not one of the above, including nothing.
    Unknown,
}

impl RemoteStatus {
    /// Parse the wire value (`RUNNING`, `FINISHED`, ...). Case-insensitive.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => RemoteStatus::Running,
            "FINISHED" => RemoteStatus::Finished,
            "SKIPPED" => RemoteStatus::Skipped,
            "ERROR" => RemoteStatus::Error,
            _ => RemoteStatus::Unknown,
        }
    }

    /// Returns `true` once polling should stop.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RemoteStatus::Running)
    }

    /// Terminal statuses that count as success.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, RemoteStatus::Finished | RemoteStatus::Skipped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteStatus::Running => "RUNNING",
            RemoteStatus::Finished => "FINISHED",
            RemoteStatus::Skipped => "SKIPPED",
            RemoteStatus::Error => "ERROR",
            RemoteStatus::Unknown => "UNKNOWN",
        }
    }
}
