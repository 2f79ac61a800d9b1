//! Session lifecycle events and their subscribers.
//!
//! The core publishes an [`Event`] for every state change it makes; logging
//! (`stand-observe`) and metrics (`stand-prometheus`) hang off the bus.

use std::sync::Arc;

use stand_model::{Requester, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // queue
    QueueJoined,
    QueueLeft,

    // session
    SessionAcquired,
    HandoffOffered,
    HandoffExpired,
    SessionReleased,
    SessionReset,

    // pipeline
    StageFailed,
    ReadinessWaiting,
    TaskFinished,
    DeploymentReady,
    ReminderSent,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::QueueJoined => "queue_joined",
            EventKind::QueueLeft => "queue_left",
            EventKind::SessionAcquired => "session_acquired",
            EventKind::HandoffOffered => "handoff_offered",
            EventKind::HandoffExpired => "handoff_expired",
            EventKind::SessionReleased => "session_released",
            EventKind::SessionReset => "session_reset",
            EventKind::StageFailed => "stage_failed",
            EventKind::ReadinessWaiting => "readiness_waiting",
            EventKind::TaskFinished => "task_finished",
            EventKind::DeploymentReady => "deployment_ready",
            EventKind::ReminderSent => "reminder_sent",
        }
    }
}

/// Something that happened to the session. Optional fields depend on the kind.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub requester: Option<String>,
    pub resource: Option<String>,
    pub stage: Option<Stage>,
    pub reason: Option<String>,
    pub attempt: Option<u32>,
    /// Queue length right after the event, when the event touched the queue.
    pub queue_len: Option<usize>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            requester: None,
            resource: None,
            stage: None,
            reason: None,
            attempt: None,
            queue_len: None,
        }
    }

    pub fn with_requester(mut self, r: &Requester) -> Self {
        self.requester = Some(r.id.to_string());
        self
    }

    pub fn with_resource(mut self, key: impl Into<String>) -> Self {
        self.resource = Some(key.into());
        self
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    pub fn with_queue_len(mut self, len: usize) -> Self {
        self.queue_len = Some(len);
        self
    }
}

/// Receives every published event. Must not block.
pub trait Subscribe: Send + Sync + 'static {
    fn on_event(&self, event: &Event);
    fn name(&self) -> &'static str;
}

/// Synchronous fan-out to all subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl EventBus {
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subscribers }
    }

    pub fn publish(&self, event: Event) {
        for s in &self.subscribers {
            s.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Collect(Mutex<Vec<EventKind>>);

    impl Subscribe for Collect {
        fn on_event(&self, event: &Event) {
            self.0.lock().unwrap().push(event.kind);
        }
        fn name(&self) -> &'static str {
            "collect"
        }
    }

    #[test]
    fn bus_fans_out_to_every_subscriber() {
        let a = Arc::new(Collect(Mutex::new(Vec::new())));
        let b = Arc::new(Collect(Mutex::new(Vec::new())));
        let bus = EventBus::new(vec![a.clone(), b.clone()]);

        bus.publish(Event::new(EventKind::QueueJoined).with_queue_len(1));
        bus.publish(Event::new(EventKind::SessionReset));

        assert_eq!(
            *a.0.lock().unwrap(),
            vec![EventKind::QueueJoined, EventKind::SessionReset]
        );
        assert_eq!(a.0.lock().unwrap().len(), b.0.lock().unwrap().len());
    }
}
