//! Requester-facing actions.
//!
//! Every transport (HTTP, chat buttons) funnels into [`Dispatcher`]. Actions
//! answer the requester through the notifier and return a typed result for
//! the transport to map onto its own status codes.

use std::sync::Arc;

use stand_model::{ActionToken, ArtifactReference, Requester, ResourceKey, Stage};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{
    capability::{Capabilities, ContainerRuntime},
    config::StandConfig,
    error::{ActionError, PipelineError, QueueError},
    event::{Event, EventBus, EventKind},
    messages,
    notify::Messenger,
    pipeline::{Deployment, DeploymentPipeline},
    session::{Lease, ReleaseOutcome, SessionSnapshot, SessionState},
};

/// Handle to a pipeline started by [`Dispatcher::submit_artifact`].
pub type PipelineHandle = JoinHandle<Result<Deployment, PipelineError>>;

pub struct Dispatcher {
    session: Arc<SessionState>,
    pipeline: Arc<DeploymentPipeline>,
    runtime: Arc<dyn ContainerRuntime>,
    messenger: Messenger,
    events: EventBus,
}

impl Dispatcher {
    pub fn new(config: Arc<StandConfig>, caps: Capabilities, events: EventBus) -> Arc<Self> {
        let messenger = Messenger::new(Arc::clone(&caps.notifier));
        let session = SessionState::new(
            Arc::clone(&caps.runtime),
            messenger.clone(),
            events.clone(),
            config.timings.handoff_window(),
        );
        let pipeline = Arc::new(DeploymentPipeline::new(
            config,
            Arc::clone(&session),
            &caps,
            events.clone(),
        ));

        Arc::new(Self {
            session,
            pipeline,
            runtime: caps.runtime,
            messenger,
            events,
        })
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    fn is_holder(&self, requester: &Requester) -> bool {
        self.session
            .holder()
            .is_some_and(|h| h.same_identity(requester))
    }

    /// Greet an idle stand, or describe who is on it.
    pub async fn status(&self, requester: &Requester) -> SessionSnapshot {
        let snapshot = self.session.snapshot();
        if self.session.is_blocking(&requester.id) {
            self.notify_busy(requester, &snapshot).await;
        } else if snapshot.status.is_idle() {
            self.messenger.send(&requester.id, messages::HELLO).await;
        }
        snapshot
    }

    /// Take the stand and start a deployment in the background.
    pub async fn submit_artifact(
        &self,
        requester: &Requester,
        reference: ArtifactReference,
    ) -> Result<PipelineHandle, ActionError> {
        if self.session.is_blocking(&requester.id) {
            let snapshot = self.session.snapshot();
            return Err(self.notify_busy(requester, &snapshot).await);
        }

        // Leftovers from a crashed run; never while someone holds the stand.
        if self.session.status().is_idle()
            && let Err(e) = self.runtime.kill_all(None).await
        {
            warn!(requester = %requester.id, error = %e, "cannot clear stale containers");
            self.messenger.send(&requester.id, messages::BUSY_STALE).await;
            return Err(ActionError::Infrastructure(e.to_string()));
        }

        let Some(lease) = self.session.try_acquire(requester) else {
            if self.is_holder(requester) {
                self.messenger
                    .send(&requester.id, messages::ALREADY_HOLDING)
                    .await;
                return Err(ActionError::AlreadyHolding);
            }
            let snapshot = self.session.snapshot();
            return Err(self.notify_busy(requester, &snapshot).await);
        };

        info!(requester = %requester.id, file = %reference.file_name, "deployment accepted");
        let pipeline = Arc::clone(&self.pipeline);
        let run_lease = lease.clone();
        let run = tokio::spawn(async move { pipeline.execute(run_lease, reference).await });
        Ok(tokio::spawn(watch_pipeline(
            run,
            lease,
            Arc::clone(&self.session),
            self.messenger.clone(),
            self.events.clone(),
        )))
    }

    /// Returns the 1-based queue position.
    pub async fn join_queue(&self, requester: &Requester) -> Result<usize, ActionError> {
        if self.is_holder(requester) {
            self.messenger
                .send(&requester.id, messages::ALREADY_HOLDING)
                .await;
            return Err(ActionError::AlreadyHolding);
        }
        if self.session.status().is_idle() {
            self.messenger.send(&requester.id, messages::HELLO).await;
            return Err(ActionError::StandFree);
        }

        let (position, already) = self.session.queue().join(requester.clone());
        let template = if already {
            messages::ALREADY_IN_QUEUE
        } else {
            messages::ADDED_TO_QUEUE
        };
        let pos = position.to_string();
        self.messenger
            .send_action(
                &requester.id,
                &messages::render(template, &[("position", &pos)]),
                messages::LABEL_LEAVE_QUEUE,
                &ActionToken::LeaveQueue,
            )
            .await;

        if already {
            return Err(QueueError::AlreadyQueued(position).into());
        }
        info!(requester = %requester.id, position, "joined queue");
        self.events.publish(
            Event::new(EventKind::QueueJoined)
                .with_requester(requester)
                .with_queue_len(self.session.queue().len()),
        );
        Ok(position)
    }

    pub async fn leave_queue(&self, requester: &Requester) -> Result<(), ActionError> {
        if !self.session.queue().leave(&requester.id) {
            self.messenger.send(&requester.id, messages::NOT_IN_QUEUE).await;
            return Err(QueueError::NotQueued.into());
        }

        info!(requester = %requester.id, "left queue");
        self.messenger.send(&requester.id, messages::LEFT_QUEUE).await;
        self.events.publish(
            Event::new(EventKind::QueueLeft)
                .with_requester(requester)
                .with_queue_len(self.session.queue().len()),
        );
        Ok(())
    }

    /// Operator action: end the current phase and move to the next in line.
    pub async fn advance_queue(&self, requester: &Requester) -> ReleaseOutcome {
        let outcome = self.session.release().await;
        info!(operator = %requester.id, ?outcome, "queue advanced");
        self.messenger
            .send(&requester.id, messages::QUEUE_ADVANCED)
            .await;
        outcome
    }

    /// Operator action: forget the session and the queue, then remove the stale resource.
    pub async fn reset_session(&self, requester: &Requester) -> Option<ResourceKey> {
        let stale = self.session.force_reset();
        if let Some(key) = stale.as_deref()
            && let Err(e) = self.runtime.kill_all(Some(key)).await
        {
            warn!(resource = key, error = %e, "failed to remove resource after reset");
        }
        info!(operator = %requester.id, resource = ?stale, "session reset");
        self.messenger
            .send(&requester.id, messages::SESSION_RESET)
            .await;
        stale
    }

    /// Stop and remove `key`; when it is the live resource, also free the stand.
    pub async fn delete_resource(&self, requester: &Requester, key: &str) -> Result<(), ActionError> {
        let live = self.session.resource_key().as_deref() == Some(key);
        if live && !self.is_holder(requester) {
            warn!(requester = %requester.id, resource = key, "delete refused, not the holder");
            return Err(ActionError::NotHolder);
        }

        self.messenger.send(&requester.id, messages::TRY_TO_STOP).await;
        if let Err(e) = self.runtime.stop(key).await {
            warn!(resource = key, error = %e, "failed to stop resource");
            self.messenger
                .send(&requester.id, messages::SOMETHING_WRONG)
                .await;
            return Err(ActionError::Infrastructure(e.to_string()));
        }

        if live {
            self.session.release_resource(key).await;
        }
        info!(requester = %requester.id, resource = key, live, "resource deleted");
        self.messenger
            .send(&requester.id, messages::RESOURCE_DELETED)
            .await;
        Ok(())
    }

    /// Route an action button press.
    pub async fn handle_action(
        &self,
        requester: &Requester,
        token: ActionToken,
    ) -> Result<(), ActionError> {
        match token {
            ActionToken::JoinQueue => self.join_queue(requester).await.map(|_| ()),
            ActionToken::LeaveQueue => self.leave_queue(requester).await,
            ActionToken::AdvanceQueue => {
                self.advance_queue(requester).await;
                Ok(())
            }
            ActionToken::ResetSession => {
                self.reset_session(requester).await;
                Ok(())
            }
            ActionToken::DeleteResource(key) => self.delete_resource(requester, &key).await,
        }
    }

    async fn notify_busy(&self, requester: &Requester, snapshot: &SessionSnapshot) -> ActionError {
        let holder = snapshot
            .holder
            .as_ref()
            .map(|h| h.name.clone())
            .unwrap_or_default();
        let text = messages::busy(
            &holder,
            snapshot.resource_key.as_deref().unwrap_or("a deployment"),
            snapshot.started_at.as_deref().unwrap_or("just now"),
        );
        self.messenger
            .send_action(
                &requester.id,
                &text,
                messages::LABEL_JOIN_QUEUE,
                &ActionToken::JoinQueue,
            )
            .await;
        ActionError::Busy { holder }
    }
}

/// Await a pipeline run; a run that died without reporting still frees the stand.
async fn watch_pipeline(
    run: PipelineHandle,
    lease: Lease,
    session: Arc<SessionState>,
    messenger: Messenger,
    events: EventBus,
) -> Result<Deployment, PipelineError> {
    let join_err = match run.await {
        Ok(result) => return result,
        Err(e) => e,
    };

    let stage = session.snapshot().stage.unwrap_or(Stage::AcquireArtifact);
    let err = PipelineError::infra(stage, format!("pipeline aborted: {join_err}"));
    if !session.is_current(&lease) {
        warn!(requester = %lease.holder().id, error = %join_err, "stale pipeline aborted");
        return Err(err);
    }

    error!(requester = %lease.holder().id, stage = stage.as_str(), error = %join_err, "pipeline aborted");
    messenger
        .send(&lease.holder().id, messages::SOMETHING_WRONG)
        .await;
    events.publish(
        Event::new(EventKind::StageFailed)
            .with_requester(lease.holder())
            .with_stage(stage)
            .with_reason(err.kind()),
    );
    session.release_lease(&lease).await;
    Err(err)
}
