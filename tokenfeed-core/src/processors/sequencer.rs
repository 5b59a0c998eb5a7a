//! ArrivalSequencer processor.
//!
//! Receives finished enrichments (in completion order), restores upstream
//! arrival order with a [`ReorderBuffer`] and pushes the events into the
//! [`EventQueue`].

use tokenfeed_sdk::objects::EnrichedEvent;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::events::{EnrichedEventReceiver, EventQueue, ReorderBuffer};
use crate::utils::shutdown::wait_for_shutdown;

pub struct ArrivalSequencer {
    queue: EventQueue,
    buffer: ReorderBuffer,
}

impl ArrivalSequencer {
    /// `first_coin_id` must match the enricher's first id.
    pub fn new(queue: EventQueue, first_coin_id: u64) -> Self {
        Self {
            queue,
            buffer: ReorderBuffer::new(first_coin_id),
        }
    }

    /// Accept one finished event. Returns how many events were released
    /// into the queue.
    pub fn accept(&mut self, event: EnrichedEvent) -> usize {
        let coin_id = event.coin_id;
        let ready = self.buffer.accept(event);
        let released = ready.len();
        for event in ready {
            self.queue.push(event);
        }
        debug!(
            coin_id,
            released,
            held = self.buffer.held(),
            queue_depth = self.queue.len(),
            "Sequenced enriched event"
        );
        released
    }

    /// Run until shutdown or until every enrichment sender is gone.
    pub async fn run(
        mut self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut event_rx: EnrichedEventReceiver,
    ) {
        info!("ArrivalSequencer started");

        loop {
            tokio::select! {
                biased;

                _ = wait_for_shutdown(&mut shutdown_rx) => {
                    info!("ArrivalSequencer received shutdown signal");
                    break;
                }

                Some(event) = event_rx.recv() => {
                    self.accept(event);
                }

                else => {
                    info!("Enriched event channel closed");
                    break;
                }
            }
        }

        info!(held = self.buffer.held(), "ArrivalSequencer shutdown complete");
    }
}
