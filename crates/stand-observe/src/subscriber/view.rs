use std::borrow::Borrow;

use stand_core::{Event, EventKind};
use tracing::{debug, error, info, warn};

/// Accessors with placeholders for fields an event kind does not carry.
trait View {
    fn requester(&self) -> &str;
    fn resource(&self) -> &str;
    fn stage(&self) -> &str;
    fn reason(&self) -> &str;
    fn attempt(&self) -> u32;
    fn queue_len(&self) -> usize;
    fn kind(&self) -> EventKind;
}

impl<T> View for T
where
    T: Borrow<Event>,
{
    #[inline]
    fn requester(&self) -> &str {
        self.borrow().requester.as_deref().unwrap_or("none")
    }
    #[inline]
    fn resource(&self) -> &str {
        self.borrow().resource.as_deref().unwrap_or("none")
    }
    #[inline]
    fn stage(&self) -> &str {
        self.borrow().stage.map(|s| s.as_str()).unwrap_or("none")
    }
    #[inline]
    fn reason(&self) -> &str {
        self.borrow().reason.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn attempt(&self) -> u32 {
        self.borrow().attempt.unwrap_or(0)
    }
    #[inline]
    fn queue_len(&self) -> usize {
        self.borrow().queue_len.unwrap_or(0)
    }
    #[inline]
    fn kind(&self) -> EventKind {
        self.borrow().kind
    }
}

#[inline]
pub fn message_for(kind: EventKind) -> &'static str {
    match kind {
        // queue
        EventKind::QueueJoined => "requester joined the queue",
        EventKind::QueueLeft => "requester left the queue",

        // session
        EventKind::SessionAcquired => "stand acquired",
        EventKind::HandoffOffered => "stand offered to the head of the queue",
        EventKind::HandoffExpired => "handoff window elapsed without confirmation",
        EventKind::SessionReleased => "stand released",
        EventKind::SessionReset => "session force-reset",

        // pipeline
        EventKind::StageFailed => "deployment stage failed",
        EventKind::ReadinessWaiting => "still waiting for the application",
        EventKind::TaskFinished => "remote task finished",
        EventKind::DeploymentReady => "deployment ready",
        EventKind::ReminderSent => "holder reminded to free the stand",
    }
}

#[inline]
pub fn log_event<E: Borrow<Event>>(e: E) {
    let msg = message_for(e.kind());

    match e.kind() {
        EventKind::QueueJoined | EventKind::QueueLeft => {
            debug!(requester = e.requester(), queue_len = e.queue_len(), "{msg}")
        }

        EventKind::SessionAcquired | EventKind::HandoffOffered => {
            info!(requester = e.requester(), queue_len = e.queue_len(), "{msg}")
        }
        EventKind::HandoffExpired => warn!(requester = e.requester(), "{msg}"),
        EventKind::SessionReleased => info!(
            requester = e.requester(),
            resource = e.resource(),
            queue_len = e.queue_len(),
            "{msg}"
        ),
        EventKind::SessionReset => warn!("{msg}"),

        EventKind::StageFailed => error!(
            requester = e.requester(),
            stage = e.stage(),
            reason = e.reason(),
            "{msg}"
        ),
        EventKind::ReadinessWaiting => {
            info!(resource = e.resource(), attempt = e.attempt(), "{msg}")
        }
        EventKind::TaskFinished => info!(requester = e.requester(), task = e.reason(), "{msg}"),
        EventKind::DeploymentReady => {
            info!(requester = e.requester(), resource = e.resource(), "{msg}")
        }
        EventKind::ReminderSent => {
            debug!(requester = e.requester(), resource = e.resource(), "{msg}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stand_model::{Requester, Stage};

    #[test]
    fn placeholders_for_missing_fields() {
        let e = Event::new(EventKind::SessionReset);
        assert_eq!(e.requester(), "none");
        assert_eq!(e.stage(), "none");
        assert_eq!(e.reason(), "unknown");
        assert_eq!(e.attempt(), 0);
    }

    #[test]
    fn view_reads_populated_fields() {
        let e = Event::new(EventKind::StageFailed)
            .with_requester(&Requester::new("7", "seven"))
            .with_stage(Stage::Build)
            .with_reason("infrastructure");
        assert_eq!(e.requester(), "7");
        assert_eq!(e.stage(), "build");
        assert_eq!(e.reason(), "infrastructure");
        log_event(&e);
    }
}
