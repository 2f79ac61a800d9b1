//! Background waits bound to a session generation.
//!
//! Both timers here race a sleep against the generation's cancellation token
//! and re-check the generation before acting.

use std::{sync::Arc, time::Duration};

use stand_model::{ActionToken, ResourceKey};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    event::{Event, EventBus, EventKind},
    messages,
    notify::Messenger,
    session::{Lease, SessionState},
};

/// Reclaims a handed-off stand the next holder never started on.
#[derive(Debug, Clone, Copy)]
pub struct ExpiryScheduler {
    window: Duration,
}

impl ExpiryScheduler {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Single-shot timer for the pending handoff of `generation`.
    pub fn arm(
        &self,
        session: Arc<SessionState>,
        generation: u64,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        let window = self.window;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!(generation, "handoff expiry cancelled");
                }
                _ = tokio::time::sleep(window) => {
                    if session.expire_handoff(generation).await.is_none() {
                        debug!(generation, "handoff expiry fired for a stale generation");
                    }
                }
            }
        })
    }
}

/// Periodically nudges a finished holder to free the stand.
///
/// Stops as soon as the lease is no longer the active generation.
pub fn spawn_reminder(
    session: Arc<SessionState>,
    lease: Lease,
    resource_key: ResourceKey,
    interval: Duration,
    messenger: Messenger,
    events: EventBus,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let token = lease.token().clone();
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
            if !session.is_current(&lease) {
                break;
            }
            messenger
                .send_action(
                    &lease.holder().id,
                    messages::REMINDER,
                    messages::LABEL_DELETE,
                    &ActionToken::DeleteResource(resource_key.clone()),
                )
                .await;
            events.publish(
                Event::new(EventKind::ReminderSent)
                    .with_requester(lease.holder())
                    .with_resource(resource_key.clone()),
            );
        }
        trace!(requester = %lease.holder().id, "reminder stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeRuntime, RecordingNotifier};
    use stand_model::Requester;

    fn setup() -> (Arc<SessionState>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let session = SessionState::new(
            Arc::new(FakeRuntime::default()),
            Messenger::new(notifier.clone()),
            EventBus::default(),
            Duration::from_secs(600),
        );
        (session, notifier)
    }

    #[tokio::test(start_paused = true)]
    async fn reminder_repeats_while_holder_is_active() {
        let (session, notifier) = setup();
        let lease = session.try_acquire(&Requester::new("1", "one")).unwrap();

        let handle = spawn_reminder(
            Arc::clone(&session),
            lease,
            "demo-1".into(),
            Duration::from_secs(7200),
            Messenger::new(notifier.clone()),
            EventBus::default(),
        );

        tokio::time::sleep(Duration::from_secs(7200 * 2 + 10)).await;
        let reminders = notifier.actions_for("1");
        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].1, "delete-resource:demo-1");

        session.release().await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(handle.is_finished());
        assert_eq!(notifier.actions_for("1").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_expiry_never_fires() {
        let (session, notifier) = setup();
        session.try_acquire(&Requester::new("1", "one")).unwrap();
        session.queue().join(Requester::new("2", "two"));
        session.release().await;

        let token = CancellationToken::new();
        let sched = ExpiryScheduler::new(Duration::from_secs(5));
        let handle = sched.arm(Arc::clone(&session), 0, token.clone());
        token.cancel();
        handle.await.unwrap();

        assert_eq!(session.holder(), Some(Requester::new("2", "two")));
        assert!(notifier.texts_for("2").iter().all(|t| !t.contains("did not start")));
    }
}
