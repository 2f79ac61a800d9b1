use serde::{Deserialize, Serialize};

/// Deployment pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    AcquireArtifact,
    ExtractAndParse,
    DeriveResourceKey,
    Build,
    Launch,
    WaitForReadiness,
    RunRemoteTasks,
    Complete,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::AcquireArtifact,
        Stage::ExtractAndParse,
        Stage::DeriveResourceKey,
        Stage::Build,
        Stage::Launch,
        Stage::WaitForReadiness,
        Stage::RunRemoteTasks,
        Stage::Complete,
    ];

    /// Short label for logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::AcquireArtifact => "acquire",
            Stage::ExtractAndParse => "parse",
            Stage::DeriveResourceKey => "derive-key",
            Stage::Build => "build",
            Stage::Launch => "launch",
            Stage::WaitForReadiness => "readiness",
            Stage::RunRemoteTasks => "tasks",
            Stage::Complete => "complete",
        }
    }
}
