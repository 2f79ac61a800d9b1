use std::fmt;

/// Payload carried by an action button and sent back when it is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionToken {
    JoinQueue,
    LeaveQueue,
    AdvanceQueue,
    ResetSession,
    DeleteResource(String),
}

const DELETE_PREFIX: &str = "delete-resource:";

impl ActionToken {
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Inverse of [`encode`](Self::encode). Returns `None` for anything unrecognized.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "join-queue" => Some(ActionToken::JoinQueue),
            "leave-queue" => Some(ActionToken::LeaveQueue),
            "advance-queue" => Some(ActionToken::AdvanceQueue),
            "reset-session" => Some(ActionToken::ResetSession),
            other => other
                .strip_prefix(DELETE_PREFIX)
                .filter(|key| !key.is_empty())
                .map(|key| ActionToken::DeleteResource(key.to_string())),
        }
    }
}

impl fmt::Display for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionToken::JoinQueue => f.write_str("join-queue"),
            ActionToken::LeaveQueue => f.write_str("leave-queue"),
            ActionToken::AdvanceQueue => f.write_str("advance-queue"),
            ActionToken::ResetSession => f.write_str("reset-session"),
            ActionToken::DeleteResource(key) => write!(f, "{DELETE_PREFIX}{key}"),
        }
    }
}
