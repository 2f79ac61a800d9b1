use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::RemoteStatus;

/// Named parameter passed to a remote task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskParam {
    pub name: String,
    pub value: String,
}

impl TaskParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// In-flight record of one remote task invocation.
///
/// Created when the task is submitted, refreshed on every poll, dropped once
/// the status is terminal.
#[derive(Debug, Clone)]
pub struct TaskExecution {
    pub name: String,
    pub params: Vec<TaskParam>,
    /// Identifier assigned by the remote service; empty until submitted.
    pub remote_id: String,
    pub status: RemoteStatus,
    pub description: String,
    pub last_polled_at: Option<SystemTime>,
}

impl TaskExecution {
    pub fn new(name: impl Into<String>, params: Vec<TaskParam>) -> Self {
        Self {
            name: name.into(),
            params,
            remote_id: String::new(),
            status: RemoteStatus::Running,
            description: String::new(),
            last_polled_at: None,
        }
    }

    /// Replace status and description with a fresh poll result.
    pub fn observe(&mut self, status: RemoteStatus, description: impl Into<String>) {
        self.status = status;
        self.description = description.into();
        self.last_polled_at = Some(SystemTime::now());
    }

    /// `STATUS: description`, the form reported back to the holder.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.status.as_str(), self.description)
    }
}
