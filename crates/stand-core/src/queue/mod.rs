use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use stand_model::{Requester, RequesterId};

/// FIFO waiting list for the stand.
///
/// Identities are unique: joining twice reports the existing position.
/// Positions are 1-based.
#[derive(Default)]
pub struct AdmissionQueue {
    inner: Mutex<VecDeque<Requester>>,
}

impl AdmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Requester>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `requester` unless already present.
    ///
    /// Returns the 1-based position and whether the identity was already queued.
    pub fn join(&self, requester: Requester) -> (usize, bool) {
        let mut q = self.lock();
        if let Some(idx) = q.iter().position(|r| r.id == requester.id) {
            return (idx + 1, true);
        }
        q.push_back(requester);
        (q.len(), false)
    }

    /// Remove the entry with this identity. `false` if it was not queued.
    pub fn leave(&self, id: &RequesterId) -> bool {
        let mut q = self.lock();
        match q.iter().position(|r| &r.id == id) {
            Some(idx) => {
                q.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn pop_front(&self) -> Option<Requester> {
        self.lock().pop_front()
    }

    /// 1-based position of this identity, if queued.
    pub fn position(&self, id: &RequesterId) -> Option<usize> {
        self.lock().iter().position(|r| &r.id == id).map(|i| i + 1)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Copy of the current order, head first.
    pub fn snapshot(&self) -> Vec<Requester> {
        self.lock().iter().cloned().collect()
    }
}
