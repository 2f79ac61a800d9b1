use serde::{Deserialize, Serialize};

/// Lifecycle phase of the single stand session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    /// Nobody holds the stand.
    #[default]
    Idle,
    /// A holder is deploying or using the stand.
    Active,
    /// The stand was offered to the next queued requester who has not started yet.
    HandoffPending,
}

impl SessionStatus {
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionStatus::Idle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Active => "active",
            SessionStatus::HandoffPending => "handoff-pending",
        }
    }
}
