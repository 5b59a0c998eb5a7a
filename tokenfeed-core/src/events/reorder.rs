use std::collections::BTreeMap;

use tokenfeed_sdk::objects::EnrichedEvent;
use tracing::warn;

/// Restores upstream arrival order after concurrent enrichment.
///
/// `coin_id`s are handed out in arrival order before enrichment starts.
/// Enrichments finish in any order; this buffer holds early finishers
/// until every lower id has been released.
#[derive(Debug)]
pub struct ReorderBuffer {
    next: u64,
    held: BTreeMap<u64, EnrichedEvent>,
}

impl ReorderBuffer {
    /// `first` is the first `coin_id` the enricher will hand out.
    pub fn new(first: u64) -> Self {
        Self {
            next: first,
            held: BTreeMap::new(),
        }
    }

    /// Accept a finished event and return every event that is now ready,
    /// in arrival order.
    pub fn accept(&mut self, event: EnrichedEvent) -> Vec<EnrichedEvent> {
        if event.coin_id < self.next {
            // Already past this id; releasing it late beats losing it.
            warn!(coin_id = event.coin_id, next = self.next, "Late event released out of order");
            return vec![event];
        }

        self.held.insert(event.coin_id, event);
        let mut ready = Vec::new();
        while let Some(event) = self.held.remove(&self.next) {
            ready.push(event);
            self.next += 1;
        }
        ready
    }

    /// Next id the buffer is waiting for.
    pub fn next_expected(&self) -> u64 {
        self.next
    }

    /// Number of events waiting on a lower id.
    pub fn held(&self) -> usize {
        self.held.len()
    }
}
