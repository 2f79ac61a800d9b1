//! The single stand session and its lifecycle.
//!
//! ```text
//! Idle --try_acquire--> Active --release--> HandoffPending --try_acquire(holder)--> Active
//!                         |                      |
//!                         +--release(empty q)----+--expiry / release(empty q)--> Idle
//! ```
//!
//! Every transition starts a new *generation* and cancels the timers of the
//! previous one, so a late expiry or reminder is a checked no-op.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, SystemTime},
};

use serde::Serialize;
use stand_model::{Requester, RequesterId, ResourceKey, SessionStatus, Stage, VersionInfo};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{
    capability::ContainerRuntime,
    event::{Event, EventBus, EventKind},
    expiry::ExpiryScheduler,
    messages,
    notify::Messenger,
    queue::AdmissionQueue,
};

/// Proof of holding the stand for one generation.
///
/// Handed out by [`SessionState::try_acquire`]; every later write from the
/// holder's pipeline is checked against it.
#[derive(Debug, Clone)]
pub struct Lease {
    holder: Requester,
    generation: u64,
    token: CancellationToken,
}

impl Lease {
    pub fn holder(&self) -> &Requester {
        &self.holder
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancelled as soon as the session leaves this generation.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Result of a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Queue was empty; nobody holds the stand.
    Idle,
    /// Stand offered to the former head of the queue.
    HandedOff(Requester),
}

/// Read-only view of the session for status queries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub holder: Option<Requester>,
    pub resource_key: Option<ResourceKey>,
    pub started_at: Option<String>,
    pub version: Option<VersionInfo>,
    pub artifact_path: Option<PathBuf>,
    pub handoff_deadline: Option<String>,
    /// Last pipeline stage entered by the active holder.
    pub stage: Option<Stage>,
    pub generation: u64,
    pub queue: Vec<Requester>,
}

/// A transition committed under the record lock whose side effects are still due.
struct Handover {
    previous: Option<Requester>,
    stale_key: Option<ResourceKey>,
    offer: Option<(Requester, u64, CancellationToken)>,
}

struct SessionRecord {
    status: SessionStatus,
    holder: Option<Requester>,
    resource_key: Option<ResourceKey>,
    started_at: Option<SystemTime>,
    version: Option<VersionInfo>,
    artifact_path: Option<PathBuf>,
    handoff_deadline: Option<SystemTime>,
    stage: Option<Stage>,
    generation: u64,
    timers: CancellationToken,
}

impl SessionRecord {
    fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            holder: None,
            resource_key: None,
            started_at: None,
            version: None,
            artifact_path: None,
            handoff_deadline: None,
            stage: None,
            generation: 0,
            timers: CancellationToken::new(),
        }
    }

    /// Cancel timers of the current generation and open the next one.
    fn advance(&mut self) {
        self.timers.cancel();
        self.timers = CancellationToken::new();
        self.generation += 1;
    }

    fn clear_deployment(&mut self) -> Option<ResourceKey> {
        self.version = None;
        self.artifact_path = None;
        self.stage = None;
        self.resource_key.take()
    }

    fn set_idle(&mut self) {
        self.advance();
        self.clear_deployment();
        self.status = SessionStatus::Idle;
        self.holder = None;
        self.started_at = None;
        self.handoff_deadline = None;
    }

    fn is_blocking(&self, id: &RequesterId) -> bool {
        !self.status.is_idle() && self.holder.as_ref().is_some_and(|h| &h.id != id)
    }
}

pub struct SessionState {
    record: Mutex<SessionRecord>,
    queue: AdmissionQueue,
    /// Serialises releases; never taken while `record` is held.
    release_guard: tokio::sync::Mutex<()>,
    runtime: Arc<dyn ContainerRuntime>,
    messenger: Messenger,
    events: EventBus,
    expiry: ExpiryScheduler,
}

impl SessionState {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        messenger: Messenger,
        events: EventBus,
        handoff_window: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            record: Mutex::new(SessionRecord::new()),
            queue: AdmissionQueue::new(),
            release_guard: tokio::sync::Mutex::new(()),
            runtime,
            messenger,
            events,
            expiry: ExpiryScheduler::new(handoff_window),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SessionRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn queue(&self) -> &AdmissionQueue {
        &self.queue
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().status
    }

    pub fn holder(&self) -> Option<Requester> {
        self.lock().holder.clone()
    }

    pub fn resource_key(&self) -> Option<ResourceKey> {
        self.lock().resource_key.clone()
    }

    /// `true` iff someone other than `id` holds or is being offered the stand.
    pub fn is_blocking(&self, id: &RequesterId) -> bool {
        self.lock().is_blocking(id)
    }

    /// Atomically take the stand.
    ///
    /// Succeeds from `Idle`, or from `HandoffPending` for the requester the
    /// stand was offered to. Concurrent callers serialise on the record lock,
    /// so exactly one of them wins an idle stand.
    pub fn try_acquire(&self, requester: &Requester) -> Option<Lease> {
        let lease = {
            let mut rec = self.lock();
            let confirming = rec.status == SessionStatus::HandoffPending
                && rec.holder.as_ref().is_some_and(|h| h.same_identity(requester));
            if !rec.status.is_idle() && !confirming {
                return None;
            }

            rec.advance();
            rec.status = SessionStatus::Active;
            rec.holder = Some(requester.clone());
            rec.started_at = Some(SystemTime::now());
            rec.handoff_deadline = None;
            rec.stage = None;
            // A holder does not wait in line for itself.
            self.queue.leave(&requester.id);

            Lease {
                holder: requester.clone(),
                generation: rec.generation,
                token: rec.timers.clone(),
            }
        };

        info!(requester = %requester.id, generation = lease.generation, "stand acquired");
        self.events.publish(
            Event::new(EventKind::SessionAcquired)
                .with_requester(requester)
                .with_queue_len(self.queue.len()),
        );
        Some(lease)
    }

    /// `true` while the lease's generation is the active one.
    pub fn is_current(&self, lease: &Lease) -> bool {
        let rec = self.lock();
        rec.status == SessionStatus::Active && rec.generation == lease.generation
    }

    /// Mark the holder's run as entering `stage`; `false` once the lease is stale.
    pub fn enter_stage(&self, lease: &Lease, stage: Stage) -> bool {
        let mut rec = self.lock();
        if rec.status != SessionStatus::Active || rec.generation != lease.generation {
            return false;
        }
        rec.stage = Some(stage);
        true
    }

    pub fn record_artifact(&self, lease: &Lease, path: PathBuf) -> bool {
        let mut rec = self.lock();
        if rec.generation != lease.generation {
            return false;
        }
        rec.artifact_path = Some(path);
        true
    }

    pub fn record_deployment(&self, lease: &Lease, key: ResourceKey, version: VersionInfo) -> bool {
        let mut rec = self.lock();
        if rec.generation != lease.generation {
            return false;
        }
        rec.resource_key = Some(key);
        rec.version = Some(version);
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let rec = self.lock();
        SessionSnapshot {
            status: rec.status,
            holder: rec.holder.clone(),
            resource_key: rec.resource_key.clone(),
            started_at: rec.started_at.map(format_time),
            version: rec.version.clone(),
            artifact_path: rec.artifact_path.clone(),
            handoff_deadline: rec.handoff_deadline.map(format_time),
            stage: rec.stage,
            generation: rec.generation,
            queue: self.queue.snapshot(),
        }
    }

    /// End the current phase and hand the stand to the next in line.
    ///
    /// Either offers the stand to the head of the queue (arming the handoff
    /// expiry) or goes idle, then reclaims the released resource.
    pub async fn release(self: &Arc<Self>) -> ReleaseOutcome {
        let _guard = self.release_guard.lock().await;
        let handover = self.hand_over(&mut self.lock());
        self.finish_release(handover).await
    }

    /// Release only if `lease` is still the active generation.
    pub async fn release_lease(self: &Arc<Self>, lease: &Lease) -> Option<ReleaseOutcome> {
        let _guard = self.release_guard.lock().await;
        let handover = {
            let mut rec = self.lock();
            if rec.generation != lease.generation {
                debug!(requester = %lease.holder.id, "stale lease, release skipped");
                return None;
            }
            self.hand_over(&mut rec)
        };
        Some(self.finish_release(handover).await)
    }

    /// Release only if `key` is still the live resource.
    pub async fn release_resource(self: &Arc<Self>, key: &str) -> Option<ReleaseOutcome> {
        let _guard = self.release_guard.lock().await;
        let handover = {
            let mut rec = self.lock();
            if rec.resource_key.as_deref() != Some(key) {
                debug!(resource = key, "resource no longer live, release skipped");
                return None;
            }
            self.hand_over(&mut rec)
        };
        Some(self.finish_release(handover).await)
    }

    /// Handoff window elapsed. No-op unless still pending in `generation`.
    pub async fn expire_handoff(self: &Arc<Self>, generation: u64) -> Option<ReleaseOutcome> {
        let _guard = self.release_guard.lock().await;
        let handover = {
            let mut rec = self.lock();
            if rec.status != SessionStatus::HandoffPending || rec.generation != generation {
                return None;
            }
            self.hand_over(&mut rec)
        };

        if let Some(holder) = &handover.previous {
            info!(requester = %holder.id, "handoff window elapsed");
            self.messenger.send(&holder.id, messages::HANDOFF_EXPIRED).await;
            self.events
                .publish(Event::new(EventKind::HandoffExpired).with_requester(holder));
        }
        Some(self.finish_release(handover).await)
    }

    /// Move to the next phase. Runs in the same critical section as the
    /// caller's validity check, so no other transition can slip in between.
    fn hand_over(&self, rec: &mut SessionRecord) -> Handover {
        let previous = rec.holder.clone();
        let stale_key = rec.clear_deployment();
        let offer = match self.queue.pop_front() {
            Some(next) => {
                rec.advance();
                rec.status = SessionStatus::HandoffPending;
                rec.holder = Some(next.clone());
                rec.started_at = Some(SystemTime::now());
                rec.handoff_deadline = Some(SystemTime::now() + self.expiry.window());
                Some((next, rec.generation, rec.timers.clone()))
            }
            None => {
                rec.set_idle();
                None
            }
        };
        Handover {
            previous,
            stale_key,
            offer,
        }
    }

    /// Side effects of a committed [`hand_over`](Self::hand_over).
    #[instrument(level = "debug", skip(self, handover))]
    async fn finish_release(self: &Arc<Self>, handover: Handover) -> ReleaseOutcome {
        let Handover {
            previous,
            stale_key,
            offer,
        } = handover;

        let mut released = Event::new(EventKind::SessionReleased).with_queue_len(self.queue.len());
        if let Some(prev) = &previous {
            released = released.with_requester(prev);
        }
        if let Some(key) = &stale_key {
            released = released.with_resource(key.clone());
        }
        self.events.publish(released);

        if let Some(key) = stale_key.as_deref()
            && let Err(e) = self.runtime.kill_all(Some(key)).await
        {
            warn!(resource = key, error = %e, "failed to reclaim released resource");
        }

        match offer {
            Some((next, generation, token)) => {
                info!(requester = %next.id, generation, "stand offered to next in queue");
                self.expiry.arm(Arc::clone(self), generation, token);
                let minutes = (self.expiry.window().as_secs() / 60).to_string();
                self.messenger
                    .send(
                        &next.id,
                        &messages::render(messages::HANDOFF_OFFER, &[("minutes", &minutes)]),
                    )
                    .await;
                self.events.publish(
                    Event::new(EventKind::HandoffOffered)
                        .with_requester(&next)
                        .with_queue_len(self.queue.len()),
                );
                ReleaseOutcome::HandedOff(next)
            }
            None => {
                info!("stand is idle");
                ReleaseOutcome::Idle
            }
        }
    }

    /// Clear everything regardless of state and empty the queue.
    ///
    /// Returns the resource key that was live, so the caller can reclaim it.
    pub fn force_reset(&self) -> Option<ResourceKey> {
        let stale = {
            let mut rec = self.lock();
            let stale = rec.resource_key.clone();
            rec.set_idle();
            self.queue.clear();
            stale
        };
        warn!(resource = ?stale, "session force-reset");
        self.events
            .publish(Event::new(EventKind::SessionReset).with_queue_len(0));
        stale
    }
}

fn format_time(t: SystemTime) -> String {
    OffsetDateTime::from(t)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}
