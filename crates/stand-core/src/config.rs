use std::{collections::HashMap, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use stand_model::TaskParam;

use crate::error::ConfigError;

/// Immutable service configuration, built once at startup and shared by `Arc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StandConfig {
    pub limits: Limits,
    pub timings: Timings,
    pub build: BuildSettings,
    pub launch: LaunchSettings,
    pub access: AccessSettings,
    /// Remote tasks run after readiness, in order.
    pub tasks: Vec<TaskStep>,
    /// Lower-cased reported customer name -> repository name.
    pub customer_aliases: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Limits {
    pub max_archive_bytes: u64,
    pub accepted_extension: String,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_archive_bytes: 20 * 1024 * 1024,
            accepted_extension: ".zip".to_string(),
        }
    }
}

/// All waits, in seconds as they appear in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Timings {
    pub handoff_window_secs: u64,
    pub readiness_interval_secs: u64,
    pub readiness_attempts: u32,
    /// Emit a "still waiting" notification every N readiness attempts.
    pub readiness_progress_every: u32,
    pub task_poll_interval_secs: u64,
    pub reminder_interval_secs: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            handoff_window_secs: 600,
            readiness_interval_secs: 30,
            readiness_attempts: 30,
            readiness_progress_every: 6,
            task_poll_interval_secs: 5,
            reminder_interval_secs: 2 * 60 * 60,
        }
    }
}

impl Timings {
    pub fn handoff_window(&self) -> Duration {
        Duration::from_secs(self.handoff_window_secs)
    }
    pub fn readiness_interval(&self) -> Duration {
        Duration::from_secs(self.readiness_interval_secs)
    }
    pub fn task_poll_interval(&self) -> Duration {
        Duration::from_secs(self.task_poll_interval_secs)
    }
    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildSettings {
    pub dockerfile: PathBuf,
    pub context_dir: PathBuf,
    /// Database schema the application is built against.
    pub schema_name: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            dockerfile: PathBuf::from("Dockerfile"),
            context_dir: PathBuf::from("."),
            schema_name: "cdi_temp_user_1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LaunchSettings {
    /// `host:container` or a bare port published on both sides.
    pub ports: Vec<String>,
    /// `host_path:container_path` binds.
    pub volumes: Vec<String>,
    /// `NAME=value` entries.
    pub env: Vec<String>,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            ports: ["8080:8080", "18080:18080", "9990:9990", "19990:19990", "5005:5005"]
                .into_iter()
                .map(String::from)
                .collect(),
            volumes: vec!["/var/lib/stand/diag:/opt/diag".to_string()],
            env: Vec::new(),
        }
    }
}

/// Where the launched application is reachable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessSettings {
    /// Host announced to holders.
    pub public_host: String,
    pub port: u16,
    /// Path probed for readiness on localhost.
    pub health_path: String,
    /// Path announced to holders.
    pub ui_path: String,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            public_host: "127.0.0.1".to_string(),
            port: 8080,
            health_path: "/cdi/ui".to_string(),
            ui_path: "/cdi/ui/".to_string(),
        }
    }
}

impl AccessSettings {
    pub fn access_url(&self) -> String {
        format!("http://{}:{}{}", self.public_host, self.port, self.ui_path)
    }

    pub fn health_url(&self) -> String {
        format!("http://localhost:{}{}", self.port, self.health_path)
    }
}

/// One remote task in the post-readiness chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStep {
    pub name: String,
    #[serde(default)]
    pub params: Vec<TaskParam>,
    /// Reported to the holder when the task succeeds.
    pub message: String,
}

impl StandConfig {
    /// Configuration with the stock task chain and alias table.
    pub fn standard() -> Self {
        let build = BuildSettings::default();
        let tasks = vec![
            TaskStep {
                name: "importDataSetTask".to_string(),
                params: vec![
                    TaskParam::new("dataSetFile", "/opt/diag/sql.party.xls"),
                    TaskParam::new("schemaName", build.schema_name.clone()),
                ],
                message: "Diagnostic data imported".to_string(),
            },
            TaskStep {
                name: "enginesFullRebuild".to_string(),
                params: Vec::new(),
                message: "Search indexes rebuilt".to_string(),
            },
        ];
        let customer_aliases = [
            ("demo", "demo"),
            ("cdi test", "test"),
            ("bank", "bank"),
            ("long name", "name"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            build,
            tasks,
            customer_aliases,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.accepted_extension.trim().is_empty() {
            return Err(ConfigError::Invalid("acceptedExtension is empty".into()));
        }
        if self.limits.max_archive_bytes == 0 {
            return Err(ConfigError::Invalid("maxArchiveBytes must be > 0".into()));
        }
        if self.timings.readiness_attempts == 0 {
            return Err(ConfigError::Invalid("readinessAttempts must be > 0".into()));
        }
        if self.timings.readiness_progress_every == 0 {
            return Err(ConfigError::Invalid(
                "readinessProgressEvery must be > 0".into(),
            ));
        }
        if self.timings.handoff_window_secs == 0 {
            return Err(ConfigError::Invalid("handoffWindowSecs must be > 0".into()));
        }
        if let Some(step) = self.tasks.iter().find(|t| t.name.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "task step with empty name (message: {:?})",
                step.message
            )));
        }
        Ok(())
    }
}
