//! [`ContainerRuntime`] driving the `docker` command line.

use std::collections::BTreeMap;

use async_trait::async_trait;
use stand_core::{BuildSpec, ContainerRuntime, LaunchSpec, RuntimeError};
use tracing::{debug, info, warn};

use crate::{cmd, error::ExecError};

const NOFILE_LIMIT: &str = "nofile=65535:65535";
const NPROC_LIMIT: &str = "nproc=8192:8192";
const OOM_SCORE_ADJ: &str = "-1000";

#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerCli {
    pub fn new() -> Self {
        Self {
            program: "docker".to_string(),
        }
    }

    /// Use another docker-compatible binary (`podman`, a wrapper script).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn docker(&self, args: Vec<String>) -> Result<String, ExecError> {
        cmd::run(&self.program, &args).await.map(|out| out.stdout)
    }

    /// Names of all containers, running or not.
    async fn container_names(&self, all: bool) -> Result<Vec<String>, RuntimeError> {
        let mut args = cmd::args(["ps", "--format", "{{.Names}}"]);
        if all {
            args.push("-a".to_string());
        }
        let stdout = self.docker(args).await?;
        Ok(stdout
            .lines()
            .map(|l| l.trim().trim_start_matches('/').to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn build(
        &self,
        spec: &BuildSpec,
        tags: &[String],
        args: &BTreeMap<String, String>,
    ) -> Result<(), RuntimeError> {
        info!(?tags, dockerfile = %spec.dockerfile.display(), "building image");
        debug!(?args, "build arguments");
        self.docker(build_args(spec, tags, args)).await?;
        Ok(())
    }

    async fn run(&self, spec: &LaunchSpec) -> Result<(), RuntimeError> {
        match self.docker(run_args(spec)).await {
            Ok(id) => {
                info!(name = %spec.name, id = id.trim(), "container created");
                Ok(())
            }
            Err(e) if is_name_conflict(e.stderr()) => Err(RuntimeError::NameConflict(spec.name.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        if let Err(e) = self.docker(cmd::args(["stop", name])).await {
            warn!(name, error = %e, "unable to stop container");
        }
        match self.docker(cmd::args(["rm", "-f", "-v", name])).await {
            Ok(_) => {
                debug!(name, "container removed");
                Ok(())
            }
            Err(e) if is_missing(e.stderr()) => {
                debug!(name, "container already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn is_running(&self, name: &str) -> Result<bool, RuntimeError> {
        Ok(self.container_names(false).await?.iter().any(|n| n == name))
    }

    async fn kill_all(&self, name_filter: Option<&str>) -> Result<(), RuntimeError> {
        let mut failures = Vec::new();
        for name in self.container_names(true).await? {
            if name_filter.is_some_and(|f| f != name) {
                continue;
            }
            if let Err(e) = self.stop(&name).await {
                failures.push(e.to_string());
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(RuntimeError::Failed(failures.join("; ")))
        }
    }
}

fn build_args(spec: &BuildSpec, tags: &[String], build_args: &BTreeMap<String, String>) -> Vec<String> {
    let mut args = cmd::args(["build", "--rm", "-f"]);
    args.push(spec.dockerfile.display().to_string());
    for tag in tags {
        args.push("-t".to_string());
        args.push(tag.clone());
    }
    for (k, v) in build_args {
        args.push("--build-arg".to_string());
        args.push(format!("{k}={v}"));
    }
    args.push(spec.context_dir.display().to_string());
    args
}

fn run_args(spec: &LaunchSpec) -> Vec<String> {
    let mut args = cmd::args([
        "run",
        "-d",
        "--name",
        spec.name.as_str(),
        "--hostname",
        spec.image.as_str(),
        "--log-driver",
        "json-file",
        "--oom-score-adj",
        OOM_SCORE_ADJ,
        "--ulimit",
        NOFILE_LIMIT,
        "--ulimit",
        NPROC_LIMIT,
    ]);
    for port in &spec.ports {
        args.push("-p".to_string());
        args.push(publish(port));
    }
    for volume in &spec.volumes {
        args.push("-v".to_string());
        args.push(volume.clone());
    }
    for env in &spec.env {
        args.push("-e".to_string());
        args.push(env.clone());
    }
    args.push(spec.image.clone());
    args
}

/// `8080` publishes the same port on both sides.
fn publish(port: &str) -> String {
    if port.contains(':') {
        port.to_string()
    } else {
        format!("{port}:{port}")
    }
}

fn is_name_conflict(stderr: &str) -> bool {
    stderr.contains("is already in use by container") || stderr.contains("Conflict. The container name")
}

fn is_missing(stderr: &str) -> bool {
    stderr.contains("No such container")
}
