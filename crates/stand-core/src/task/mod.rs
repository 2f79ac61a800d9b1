//! Remote task execution: submit once, poll until terminal.

use std::time::Duration;

use stand_model::{RemoteStatus, TaskExecution, TaskParam};
use tracing::{debug, info, instrument, warn};

use crate::capability::TaskTransport;

/// Terminal result of one remote task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    /// `STATUS: description` of the last poll, or the transport failure.
    pub description: String,
    pub success: bool,
}

/// Drives a single remote execution to a terminal status.
///
/// There is no attempt ceiling: a task that keeps reporting `RUNNING` is
/// polled for as long as the caller awaits.
#[derive(Debug, Clone, Copy)]
pub struct TaskRunner {
    poll_interval: Duration,
}

impl TaskRunner {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    #[instrument(level = "debug", skip(self, transport, params))]
    pub async fn run(
        &self,
        transport: &dyn TaskTransport,
        name: &str,
        params: &[TaskParam],
    ) -> TaskOutcome {
        let mut exec = TaskExecution::new(name, params.to_vec());

        match transport.submit(name, params).await {
            Ok(id) => exec.remote_id = id,
            Err(e) => {
                warn!(task = name, error = %e, "task submission failed");
                exec.observe(RemoteStatus::Unknown, e.to_string());
                return TaskOutcome {
                    description: exec.summary(),
                    success: false,
                };
            }
        }
        info!(task = name, execution = %exec.remote_id, "task submitted");

        loop {
            tokio::time::sleep(self.poll_interval).await;

            match transport.poll(&exec.remote_id).await {
                Ok(report) => exec.observe(report.status, report.description),
                // A broken poll is not retried: the status is unknowable.
                Err(e) => exec.observe(RemoteStatus::Unknown, e.to_string()),
            }
            debug!(task = name, status = exec.status.as_str(), "task polled");

            if exec.status.is_terminal() {
                let success = exec.status.is_success();
                info!(task = name, status = exec.status.as_str(), success, "task finished");
                return TaskOutcome {
                    description: exec.summary(),
                    success,
                };
            }
        }
    }
}
