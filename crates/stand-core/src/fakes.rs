//! Scripted capability doubles for unit tests.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use stand_model::{ArtifactReference, RemoteStatus, RequesterId, TaskParam, VersionInfo};

use crate::{
    capability::{
        ArtifactSource, BuildSpec, ContainerRuntime, FetchedArtifact, HealthProbe, LaunchSpec,
        Notifier, PollReport, TaskTransport,
    },
    error::{ArtifactError, NotifyError, RuntimeError, TransportError},
};

#[derive(Default)]
pub struct FakeRuntime {
    pub build_result: Mutex<Option<RuntimeError>>,
    /// Results for successive `run` calls; empty means success.
    pub run_results: Mutex<VecDeque<Result<(), RuntimeError>>>,
    pub stop_result: Mutex<Option<RuntimeError>>,
    /// Results for successive `is_running` calls; empty means `Ok(true)`.
    pub running: Mutex<VecDeque<Result<bool, RuntimeError>>>,
    pub kill_result: Mutex<Option<RuntimeError>>,
    /// Virtual time every `kill_all` takes.
    pub kill_delay: Mutex<Option<Duration>>,

    pub builds: Mutex<Vec<(Vec<String>, BTreeMap<String, String>)>>,
    pub runs: Mutex<Vec<LaunchSpec>>,
    pub stops: Mutex<Vec<String>>,
    pub kills: Mutex<Vec<Option<String>>>,
    pub running_checks: AtomicUsize,
}

impl FakeRuntime {
    pub fn killed(&self) -> Vec<Option<String>> {
        self.kills.lock().unwrap().clone()
    }

    pub fn script_runs(&self, results: Vec<Result<(), RuntimeError>>) {
        *self.run_results.lock().unwrap() = results.into();
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn build(
        &self,
        _spec: &BuildSpec,
        tags: &[String],
        args: &BTreeMap<String, String>,
    ) -> Result<(), RuntimeError> {
        self.builds.lock().unwrap().push((tags.to_vec(), args.clone()));
        match self.build_result.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn run(&self, spec: &LaunchSpec) -> Result<(), RuntimeError> {
        self.runs.lock().unwrap().push(spec.clone());
        self.run_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        self.stops.lock().unwrap().push(name.to_string());
        match self.stop_result.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn is_running(&self, _name: &str) -> Result<bool, RuntimeError> {
        self.running_checks.fetch_add(1, Ordering::SeqCst);
        self.running.lock().unwrap().pop_front().unwrap_or(Ok(true))
    }

    async fn kill_all(&self, name_filter: Option<&str>) -> Result<(), RuntimeError> {
        self.kills.lock().unwrap().push(name_filter.map(String::from));
        let delay = *self.kill_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.kill_result.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

pub struct FakeArtifacts {
    pub fetch_result: Mutex<Result<FetchedArtifact, ArtifactError>>,
    pub parse_result: Mutex<Result<VersionInfo, ArtifactError>>,
    pub fetched: Mutex<Vec<ArtifactReference>>,
    pub panic_on_fetch: AtomicBool,
}

impl FakeArtifacts {
    pub fn ok(version: VersionInfo) -> Self {
        Self {
            fetch_result: Mutex::new(Ok(FetchedArtifact {
                path: PathBuf::from("/tmp/diag.zip"),
                size_bytes: 1024,
            })),
            parse_result: Mutex::new(Ok(version)),
            fetched: Mutex::new(Vec::new()),
            panic_on_fetch: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ArtifactSource for FakeArtifacts {
    async fn fetch(&self, reference: &ArtifactReference) -> Result<FetchedArtifact, ArtifactError> {
        self.fetched.lock().unwrap().push(reference.clone());
        if self.panic_on_fetch.load(Ordering::SeqCst) {
            panic!("artifact source blew up");
        }
        self.fetch_result.lock().unwrap().clone()
    }

    async fn parse(&self, _path: &Path) -> Result<VersionInfo, ArtifactError> {
        self.parse_result.lock().unwrap().clone()
    }
}

/// Submitted executions get their task name as id; polls pop from a per-task script.
#[derive(Default)]
pub struct FakeTransport {
    pub submit_error: Mutex<Option<TransportError>>,
    pub scripts: Mutex<HashMap<String, VecDeque<Result<PollReport, TransportError>>>>,
    pub submitted: Mutex<Vec<(String, Vec<TaskParam>)>>,
    pub polls: AtomicUsize,
}

impl FakeTransport {
    pub fn script(&self, task: &str, polls: Vec<(RemoteStatus, &str)>) {
        let script = polls
            .into_iter()
            .map(|(status, description)| {
                Ok(PollReport {
                    status,
                    description: description.to_string(),
                })
            })
            .collect();
        self.scripts.lock().unwrap().insert(task.to_string(), script);
    }
}

#[async_trait]
impl TaskTransport for FakeTransport {
    async fn submit(&self, name: &str, params: &[TaskParam]) -> Result<String, TransportError> {
        self.submitted
            .lock()
            .unwrap()
            .push((name.to_string(), params.to_vec()));
        match self.submit_error.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(name.to_string()),
        }
    }

    async fn poll(&self, execution_id: &str) -> Result<PollReport, TransportError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.scripts
            .lock()
            .unwrap()
            .get_mut(execution_id)
            .and_then(|s| s.pop_front())
            .unwrap_or(Ok(PollReport {
                status: RemoteStatus::Finished,
                description: "done".to_string(),
            }))
    }
}

/// Answers from a script, then repeats `fallback`.
pub struct FakeProbe {
    pub script: Mutex<VecDeque<bool>>,
    pub fallback: bool,
    pub calls: AtomicUsize,
}

impl FakeProbe {
    pub fn always(ready: bool) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: ready,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn ready_after(failures: usize) -> Self {
        Self {
            script: Mutex::new(std::iter::repeat_n(false, failures).collect()),
            fallback: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl HealthProbe for FakeProbe {
    async fn is_ready(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().unwrap().pop_front().unwrap_or(self.fallback)
    }
}

#[derive(Debug, Clone)]
pub struct Sent {
    pub to: String,
    pub text: String,
    pub action: Option<(String, String)>,
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Sent>>,
    /// Messages containing the text are delivered only after the delay.
    pub slow: Mutex<Option<(String, Duration)>>,
}

impl RecordingNotifier {
    async fn deliver(&self, sent: Sent) {
        let delay = self
            .slow
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(needle, _)| sent.text.contains(needle.as_str()))
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.sent.lock().unwrap().push(sent);
    }

    pub fn texts_for(&self, id: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.to == id)
            .map(|s| s.text.clone())
            .collect()
    }

    /// `(label, token)` of every action message sent to `id`.
    pub fn actions_for(&self, id: &str) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.to == id)
            .filter_map(|s| s.action.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &RequesterId, text: &str) -> Result<(), NotifyError> {
        self.deliver(Sent {
            to: recipient.to_string(),
            text: text.to_string(),
            action: None,
        })
        .await;
        Ok(())
    }

    async fn send_with_action(
        &self,
        recipient: &RequesterId,
        text: &str,
        action_label: &str,
        action_token: &str,
    ) -> Result<(), NotifyError> {
        self.deliver(Sent {
            to: recipient.to_string(),
            text: text.to_string(),
            action: Some((action_label.to_string(), action_token.to_string())),
        })
        .await;
        Ok(())
    }
}
