//! The deployment pipeline run on behalf of the current holder.
//!
//! Stages run strictly in order; the first failure aborts the rest, is
//! reported to the holder and releases the session. Nothing here takes the
//! session lock across an await: all writes go through the [`Lease`].

pub mod naming;

use std::sync::Arc;

use stand_model::{ActionToken, ArtifactReference, RequesterId, ResourceKey, Stage, VersionInfo};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    capability::{
        ArtifactSource, BuildSpec, Capabilities, ContainerRuntime, FetchedArtifact, HealthProbe,
        LaunchSpec, TaskTransport,
    },
    config::StandConfig,
    error::{ArtifactError, InputRejection, PipelineError, RuntimeError},
    event::{Event, EventBus, EventKind},
    expiry::spawn_reminder,
    messages,
    notify::Messenger,
    session::{Lease, SessionState},
    task::TaskRunner,
};

/// What a successful run leaves behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub resource_key: ResourceKey,
    pub version: VersionInfo,
    pub access_url: String,
}

pub struct DeploymentPipeline {
    config: Arc<StandConfig>,
    session: Arc<SessionState>,
    runtime: Arc<dyn ContainerRuntime>,
    artifacts: Arc<dyn ArtifactSource>,
    probe: Arc<dyn HealthProbe>,
    transport: Arc<dyn TaskTransport>,
    runner: TaskRunner,
    messenger: Messenger,
    events: EventBus,
}

impl DeploymentPipeline {
    pub fn new(
        config: Arc<StandConfig>,
        session: Arc<SessionState>,
        caps: &Capabilities,
        events: EventBus,
    ) -> Self {
        let runner = TaskRunner::new(config.timings.task_poll_interval());
        Self {
            config,
            session,
            runtime: Arc::clone(&caps.runtime),
            artifacts: Arc::clone(&caps.artifacts),
            probe: Arc::clone(&caps.probe),
            transport: Arc::clone(&caps.transport),
            runner,
            messenger: Messenger::new(Arc::clone(&caps.notifier)),
            events,
        }
    }

    /// Run every stage for `lease`, releasing the session on failure.
    pub async fn execute(
        &self,
        lease: Lease,
        reference: ArtifactReference,
    ) -> Result<Deployment, PipelineError> {
        match self.run(&lease, &reference).await {
            Ok(deployment) => Ok(deployment),
            Err(e) if !self.session.is_current(&lease) => {
                // Reset or deleted underneath the run; the session is already someone else's.
                info!(requester = %lease.holder().id, error = %e, "run abandoned");
                Err(e)
            }
            Err(e) => {
                self.report_failure(&lease, &e).await;
                self.session.release_lease(&lease).await;
                Err(e)
            }
        }
    }

    #[instrument(level = "debug", skip_all, fields(requester = %lease.holder().id))]
    async fn run(
        &self,
        lease: &Lease,
        reference: &ArtifactReference,
    ) -> Result<Deployment, PipelineError> {
        let holder = &lease.holder().id;

        self.ensure_current(lease, Stage::AcquireArtifact)?;
        let fetched = self.acquire(lease, reference).await?;

        self.ensure_current(lease, Stage::ExtractAndParse)?;
        let parsed = self
            .artifacts
            .parse(&fetched.path)
            .await
            .map_err(PipelineError::Artifact)?;

        self.ensure_current(lease, Stage::DeriveResourceKey)?;
        let canonical = naming::canonical_customer(&self.config.customer_aliases, &parsed.customer_name);
        let version = parsed.with_customer_name(canonical);
        let key = naming::resource_key(&version, holder);
        if !self.session.record_deployment(lease, key.clone(), version.clone()) {
            return Err(stale(Stage::DeriveResourceKey));
        }
        info!(resource = %key, version = %version.display_string(), "resource key derived");

        self.ensure_current(lease, Stage::Build)?;
        self.build(holder, &key, &version).await?;

        self.ensure_current(lease, Stage::Launch)?;
        self.launch(holder, &key).await?;

        self.wait_for_readiness(lease, &key).await?;

        let access_url = self.config.access.access_url();
        self.run_tasks(lease, &access_url).await?;

        self.ensure_current(lease, Stage::Complete)?;
        self.complete(lease, &key, &access_url).await;

        Ok(Deployment {
            resource_key: key,
            version,
            access_url,
        })
    }

    fn ensure_current(&self, lease: &Lease, stage: Stage) -> Result<(), PipelineError> {
        if self.session.enter_stage(lease, stage) {
            debug!(stage = stage.as_str(), "stage started");
            Ok(())
        } else {
            Err(stale(stage))
        }
    }

    async fn acquire(
        &self,
        lease: &Lease,
        reference: &ArtifactReference,
    ) -> Result<FetchedArtifact, PipelineError> {
        let limits = &self.config.limits;
        if !reference.has_extension(&limits.accepted_extension) {
            return Err(PipelineError::UserInput(InputRejection::WrongExtension(
                limits.accepted_extension.clone(),
            )));
        }

        let fetched = self.artifacts.fetch(reference).await.map_err(|e| match e {
            ArtifactError::TooLarge { limit } => {
                PipelineError::UserInput(InputRejection::TooLarge { limit })
            }
            other => PipelineError::infra(Stage::AcquireArtifact, other),
        })?;
        if fetched.size_bytes > limits.max_archive_bytes {
            return Err(PipelineError::UserInput(InputRejection::TooLarge {
                limit: limits.max_archive_bytes,
            }));
        }

        if !self.session.record_artifact(lease, fetched.path.clone()) {
            return Err(stale(Stage::AcquireArtifact));
        }
        self.messenger.send(&lease.holder().id, messages::DOWNLOADED).await;
        Ok(fetched)
    }

    async fn build(
        &self,
        holder: &RequesterId,
        key: &ResourceKey,
        version: &VersionInfo,
    ) -> Result<(), PipelineError> {
        let version_text = version.display_string();
        self.messenger
            .send(
                holder,
                &messages::render(messages::START_DEPLOY, &[("version", &version_text)]),
            )
            .await;

        let spec = BuildSpec {
            dockerfile: self.config.build.dockerfile.clone(),
            context_dir: self.config.build.context_dir.clone(),
        };
        let args = naming::build_args(version, &self.config.build.schema_name);
        self.runtime
            .build(&spec, std::slice::from_ref(key), &args)
            .await
            .map_err(|e| PipelineError::infra(Stage::Build, e))?;

        info!(resource = %key, "image built");
        self.messenger.send(holder, messages::IMAGE_BUILT).await;
        Ok(())
    }

    async fn launch(&self, holder: &RequesterId, key: &ResourceKey) -> Result<(), PipelineError> {
        let launch = &self.config.launch;
        let spec = LaunchSpec {
            image: key.clone(),
            name: key.clone(),
            ports: launch.ports.clone(),
            volumes: launch.volumes.clone(),
            env: launch.env.clone(),
        };

        match self.launch_once(&spec).await {
            Err(PipelineError::ResourceConflict(name)) => {
                warn!(resource = %name, "container name taken, removing the old one");
                self.messenger.send(holder, messages::CONTAINER_EXISTS).await;
                self.runtime
                    .stop(&name)
                    .await
                    .map_err(|e| PipelineError::infra(Stage::Launch, e))?;
                // One remediation only: a second conflict is no longer recoverable.
                self.runtime
                    .run(&spec)
                    .await
                    .map_err(|e| PipelineError::infra(Stage::Launch, format!("after removing {name}: {e}")))?;
            }
            other => other?,
        }

        info!(resource = %key, "container started");
        self.messenger
            .send_action(
                holder,
                messages::CONTAINER_UP,
                messages::LABEL_DELETE,
                &ActionToken::DeleteResource(key.clone()),
            )
            .await;
        Ok(())
    }

    async fn launch_once(&self, spec: &LaunchSpec) -> Result<(), PipelineError> {
        self.runtime.run(spec).await.map_err(|e| match e {
            RuntimeError::NameConflict(name) => PipelineError::ResourceConflict(name),
            other => PipelineError::infra(Stage::Launch, other),
        })
    }

    async fn wait_for_readiness(&self, lease: &Lease, key: &ResourceKey) -> Result<(), PipelineError> {
        let timings = &self.config.timings;
        let holder = &lease.holder().id;

        for attempt in 1..=timings.readiness_attempts {
            tokio::time::sleep(timings.readiness_interval()).await;
            self.ensure_current(lease, Stage::WaitForReadiness)?;

            match self.runtime.is_running(key).await {
                Ok(true) => {}
                Ok(false) => {
                    return Err(PipelineError::infra(
                        Stage::WaitForReadiness,
                        format!("container {key} is no longer running"),
                    ));
                }
                Err(e) => return Err(PipelineError::infra(Stage::WaitForReadiness, e)),
            }

            if self.probe.is_ready().await {
                info!(resource = %key, attempt, "application is ready");
                self.messenger.send(holder, messages::APP_ALIVE).await;
                return Ok(());
            }
            debug!(resource = %key, attempt, "application not ready yet");

            if attempt % timings.readiness_progress_every == 0 {
                self.messenger.send(holder, messages::STILL_WAITING).await;
                self.events.publish(
                    Event::new(EventKind::ReadinessWaiting)
                        .with_requester(lease.holder())
                        .with_resource(key.clone())
                        .with_attempt(attempt),
                );
            }
        }

        Err(PipelineError::Timeout {
            attempts: timings.readiness_attempts,
        })
    }

    async fn run_tasks(&self, lease: &Lease, access_url: &str) -> Result<(), PipelineError> {
        for step in &self.config.tasks {
            self.ensure_current(lease, Stage::RunRemoteTasks)?;

            let outcome = self
                .runner
                .run(self.transport.as_ref(), &step.name, &step.params)
                .await;
            if !outcome.success {
                return Err(PipelineError::RemoteTask {
                    task: step.name.clone(),
                    description: outcome.description,
                    access_url: access_url.to_string(),
                });
            }

            self.messenger
                .send(
                    &lease.holder().id,
                    &format!("{}: {}", step.message, outcome.description),
                )
                .await;
            self.events.publish(
                Event::new(EventKind::TaskFinished)
                    .with_requester(lease.holder())
                    .with_reason(step.name.clone()),
            );
        }
        Ok(())
    }

    async fn complete(&self, lease: &Lease, key: &ResourceKey, access_url: &str) {
        info!(resource = %key, url = access_url, "deployment ready");
        self.messenger
            .send_action(
                &lease.holder().id,
                &messages::render(messages::ALL_DONE, &[("url", access_url)]),
                messages::LABEL_DELETE,
                &ActionToken::DeleteResource(key.clone()),
            )
            .await;
        self.events.publish(
            Event::new(EventKind::DeploymentReady)
                .with_requester(lease.holder())
                .with_resource(key.clone()),
        );

        spawn_reminder(
            Arc::clone(&self.session),
            lease.clone(),
            key.clone(),
            self.config.timings.reminder_interval(),
            self.messenger.clone(),
            self.events.clone(),
        );
    }

    async fn report_failure(&self, lease: &Lease, err: &PipelineError) {
        let stage = err.stage();
        match err {
            PipelineError::UserInput(_) | PipelineError::Artifact(_) => {
                warn!(stage = stage.as_str(), error = %err, "deployment rejected");
            }
            _ => error!(stage = stage.as_str(), error = %err, "deployment failed"),
        }

        self.messenger
            .send(&lease.holder().id, &failure_message(err))
            .await;
        self.events.publish(
            Event::new(EventKind::StageFailed)
                .with_requester(lease.holder())
                .with_stage(stage)
                .with_reason(err.kind()),
        );
    }
}

fn stale(stage: Stage) -> PipelineError {
    PipelineError::infra(stage, "session no longer belongs to this run")
}

/// What the holder is told. Infrastructure detail stays in the logs.
fn failure_message(err: &PipelineError) -> String {
    match err {
        PipelineError::UserInput(InputRejection::WrongExtension(ext)) => {
            messages::render(messages::WRONG_EXTENSION, &[("extension", ext)])
        }
        PipelineError::UserInput(InputRejection::TooLarge { limit }) => {
            let mib = (limit / (1024 * 1024)).to_string();
            messages::render(messages::TOO_BIG, &[("limit_mib", &mib)])
        }
        PipelineError::Artifact(_) => messages::CANNOT_PARSE.to_string(),
        PipelineError::ResourceConflict(_) => messages::CONTAINER_FAILED.to_string(),
        PipelineError::Infrastructure { stage, .. } => match stage {
            Stage::AcquireArtifact => messages::CANNOT_DOWNLOAD,
            Stage::Build => messages::IMAGE_FAILED,
            Stage::Launch => messages::CONTAINER_FAILED,
            Stage::WaitForReadiness => messages::CONTAINER_DEAD,
            _ => messages::SOMETHING_WRONG,
        }
        .to_string(),
        PipelineError::Timeout { .. } => messages::READINESS_TIMEOUT.to_string(),
        PipelineError::RemoteTask {
            description,
            access_url,
            ..
        } => messages::render(
            messages::TASK_FAILED,
            &[("url", access_url), ("description", description)],
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::atomic::Ordering, time::Duration};

    use stand_model::{RemoteStatus, Requester, SessionStatus};

    use super::*;
    use crate::fakes::{FakeArtifacts, FakeProbe, FakeRuntime, FakeTransport, RecordingNotifier};

    struct Harness {
        session: Arc<SessionState>,
        pipeline: DeploymentPipeline,
        runtime: Arc<FakeRuntime>,
        artifacts: Arc<FakeArtifacts>,
        transport: Arc<FakeTransport>,
        probe: Arc<FakeProbe>,
        notifier: Arc<RecordingNotifier>,
    }

    fn version() -> VersionInfo {
        VersionInfo {
            core_revision: "2c980808".into(),
            customer_revision: "01fbd6f4".into(),
            customer_name: "Demo".into(),
            factor_version: "21.19".into(),
        }
    }

    fn harness_with(probe: FakeProbe) -> Harness {
        let config = Arc::new(StandConfig::standard());
        let runtime = Arc::new(FakeRuntime::default());
        let artifacts = Arc::new(FakeArtifacts::ok(version()));
        let transport = Arc::new(FakeTransport::default());
        let probe = Arc::new(probe);
        let notifier = Arc::new(RecordingNotifier::default());
        let caps = Capabilities {
            runtime: runtime.clone(),
            artifacts: artifacts.clone(),
            transport: transport.clone(),
            probe: probe.clone(),
            notifier: notifier.clone(),
        };
        let session = SessionState::new(
            runtime.clone(),
            Messenger::new(notifier.clone()),
            EventBus::default(),
            config.timings.handoff_window(),
        );
        let pipeline = DeploymentPipeline::new(config, Arc::clone(&session), &caps, EventBus::default());
        Harness {
            session,
            pipeline,
            runtime,
            artifacts,
            transport,
            probe,
            notifier,
        }
    }

    fn harness() -> Harness {
        harness_with(FakeProbe::ready_after(2))
    }

    fn holder() -> Requester {
        Requester::new("1", "one")
    }

    fn archive() -> ArtifactReference {
        ArtifactReference::new("diag.zip", "http://files/diag.zip")
    }

    async fn execute(h: &Harness) -> Result<Deployment, PipelineError> {
        let lease = h.session.try_acquire(&holder()).expect("idle stand");
        h.pipeline.execute(lease, archive()).await
    }

    #[tokio::test(start_paused = true)]
    async fn full_run_deploys_and_keeps_the_stand() {
        let h = harness();

        let deployment = execute(&h).await.expect("deployment");

        assert_eq!(deployment.resource_key, "demo-21.19-1");
        assert_eq!(deployment.version.customer_name, "demo");
        assert_eq!(deployment.access_url, "http://127.0.0.1:8080/cdi/ui/");

        let builds = h.runtime.builds.lock().unwrap().clone();
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].0, vec!["demo-21.19-1".to_string()]);
        assert_eq!(builds[0].1["CUSTOMER_NAME"], "demo");
        let runs = h.runtime.runs.lock().unwrap().clone();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].name, "demo-21.19-1");
        assert_eq!(runs[0].image, "demo-21.19-1");
        assert_eq!(h.probe.calls.load(Ordering::SeqCst), 3);

        let submitted: Vec<String> = h
            .transport
            .submitted
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        assert_eq!(submitted, ["importDataSetTask", "enginesFullRebuild"]);

        assert_eq!(h.session.status(), SessionStatus::Active);
        assert_eq!(h.session.resource_key().as_deref(), Some("demo-21.19-1"));
        let texts = h.notifier.texts_for("1");
        assert!(texts.iter().any(|t| t.starts_with("Diagnostic data imported: FINISHED")));
        assert!(texts.last().unwrap().contains("http://127.0.0.1:8080/cdi/ui/"));
        assert!(
            h.notifier
                .actions_for("1")
                .iter()
                .all(|(_, token)| token == "delete-resource:demo-21.19-1")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn missing_manifest_releases_and_advances_queue() {
        let h = harness();
        *h.artifacts.parse_result.lock().unwrap() = Err(ArtifactError::MissingManifest);
        let lease = h.session.try_acquire(&holder()).unwrap();
        h.session.queue().join(Requester::new("2", "two"));

        let err = h.pipeline.execute(lease, archive()).await.unwrap_err();

        assert_eq!(err, PipelineError::Artifact(ArtifactError::MissingManifest));
        assert_eq!(h.session.status(), SessionStatus::HandoffPending);
        assert_eq!(h.session.holder().map(|r| r.id.to_string()).as_deref(), Some("2"));
        assert!(h.session.queue().is_empty());
        assert!(h.notifier.texts_for("1").contains(&messages::CANNOT_PARSE.to_string()));
        assert!(h.runtime.builds.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_extension_is_rejected_before_fetch() {
        let h = harness();
        let lease = h.session.try_acquire(&holder()).unwrap();

        let err = h
            .pipeline
            .execute(lease, ArtifactReference::new("diag.rar", "http://files/diag.rar"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PipelineError::UserInput(InputRejection::WrongExtension(".zip".into()))
        );
        assert!(h.artifacts.fetched.lock().unwrap().is_empty());
        assert_eq!(h.session.status(), SessionStatus::Idle);
        assert!(h.notifier.texts_for("1")[0].contains(".zip"));
    }

    #[tokio::test]
    async fn oversized_archive_is_user_error() {
        let h = harness();
        *h.artifacts.fetch_result.lock().unwrap() = Ok(FetchedArtifact {
            path: "/tmp/big.zip".into(),
            size_bytes: 21 * 1024 * 1024,
        });

        let err = execute(&h).await.unwrap_err();

        assert_eq!(
            err,
            PipelineError::UserInput(InputRejection::TooLarge {
                limit: 20 * 1024 * 1024
            })
        );
        assert!(h.notifier.texts_for("1")[0].contains("20 MiB"));
        assert_eq!(h.session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn transfer_failure_is_infrastructure() {
        let h = harness();
        *h.artifacts.fetch_result.lock().unwrap() = Err(ArtifactError::Transfer("reset".into()));

        let err = execute(&h).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Infrastructure {
                stage: Stage::AcquireArtifact,
                ..
            }
        ));
        assert_eq!(h.notifier.texts_for("1"), [messages::CANNOT_DOWNLOAD]);
    }

    #[tokio::test(start_paused = true)]
    async fn name_conflict_is_remediated_once() {
        let h = harness();
        h.runtime.script_runs(vec![
            Err(RuntimeError::NameConflict("demo-21.19-1".into())),
            Ok(()),
        ]);

        let deployment = execute(&h).await.expect("deployment after remediation");

        assert_eq!(*h.runtime.stops.lock().unwrap(), ["demo-21.19-1"]);
        assert_eq!(h.runtime.runs.lock().unwrap().len(), 2);
        assert!(h.runtime.running_checks.load(Ordering::SeqCst) > 0);
        assert_eq!(deployment.resource_key, "demo-21.19-1");
    }

    #[tokio::test]
    async fn second_conflict_is_infrastructure() {
        let h = harness();
        h.runtime.script_runs(vec![
            Err(RuntimeError::NameConflict("demo-21.19-1".into())),
            Err(RuntimeError::NameConflict("demo-21.19-1".into())),
        ]);

        let err = execute(&h).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Infrastructure {
                stage: Stage::Launch,
                ..
            }
        ));
        assert_eq!(h.runtime.stops.lock().unwrap().len(), 1);
        assert_eq!(h.runtime.runs.lock().unwrap().len(), 2);
        assert_eq!(h.runtime.running_checks.load(Ordering::SeqCst), 0);
        assert_eq!(h.runtime.killed(), vec![Some("demo-21.19-1".to_string())]);
        assert_eq!(h.session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn other_launch_failure_is_not_retried() {
        let h = harness();
        h.runtime
            .script_runs(vec![Err(RuntimeError::Failed("no space left".into()))]);

        let err = execute(&h).await.unwrap_err();

        assert_eq!(err.kind(), "infrastructure");
        assert!(h.runtime.stops.lock().unwrap().is_empty());
        assert_eq!(h.runtime.runs.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn readiness_times_out_after_ceiling() {
        let h = harness_with(FakeProbe::always(false));

        let err = execute(&h).await.unwrap_err();

        assert_eq!(err, PipelineError::Timeout { attempts: 30 });
        assert_eq!(h.probe.calls.load(Ordering::SeqCst), 30);
        let waiting = h
            .notifier
            .texts_for("1")
            .iter()
            .filter(|t| *t == messages::STILL_WAITING)
            .count();
        assert_eq!(waiting, 5);
        assert_eq!(h.session.status(), SessionStatus::Idle);
        assert!(h.transport.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn vanished_container_aborts_readiness() {
        let h = harness_with(FakeProbe::always(false));
        *h.runtime.running.lock().unwrap() = VecDeque::from([Ok(true), Ok(false)]);

        let err = execute(&h).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Infrastructure {
                stage: Stage::WaitForReadiness,
                ..
            }
        ));
        assert_eq!(h.probe.calls.load(Ordering::SeqCst), 1);
        assert!(h.notifier.texts_for("1").contains(&messages::CONTAINER_DEAD.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_task_stops_the_chain() {
        let h = harness();
        h.transport.script(
            "importDataSetTask",
            vec![
                (RemoteStatus::Running, "reading"),
                (RemoteStatus::Error, "sheet not found"),
            ],
        );

        let err = execute(&h).await.unwrap_err();

        assert_eq!(
            err,
            PipelineError::RemoteTask {
                task: "importDataSetTask".into(),
                description: "ERROR: sheet not found".into(),
                access_url: "http://127.0.0.1:8080/cdi/ui/".into(),
            }
        );
        assert_eq!(h.transport.submitted.lock().unwrap().len(), 1);
        let last = h.notifier.texts_for("1").pop().unwrap();
        assert!(last.contains("ERROR: sheet not found"));
        assert!(last.contains("http://127.0.0.1:8080/cdi/ui/"));
        assert_eq!(h.session.status(), SessionStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_mid_run_stops_at_next_stage() {
        let h = harness_with(FakeProbe::always(false));
        let lease = h.session.try_acquire(&holder()).unwrap();
        let session = Arc::clone(&h.session);

        let resetter = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(45)).await;
            session.force_reset();
            session.try_acquire(&Requester::new("2", "two"))
        });

        let err = h.pipeline.execute(lease, archive()).await.unwrap_err();

        assert_eq!(err.stage(), Stage::WaitForReadiness);
        let new_lease = resetter.await.unwrap().expect("second holder");
        assert!(h.session.is_current(&new_lease));
        assert_eq!(h.probe.calls.load(Ordering::SeqCst), 1);
    }
}
