use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokenfeed_sdk::objects::EnrichedEvent;

/// Unbounded FIFO of enriched events waiting for the pacer.
///
/// Cloning yields another handle to the same queue. There is no capacity
/// limit: if upstream outpaces the pacer the queue simply grows.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<VecDeque<EnrichedEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. Never fails.
    pub fn push(&self, event: EnrichedEvent) {
        self.lock().push_back(event);
    }

    /// Remove the oldest event.
    pub fn pop_front(&self) -> Option<EnrichedEvent> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the deque half-modified,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<EnrichedEvent>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
