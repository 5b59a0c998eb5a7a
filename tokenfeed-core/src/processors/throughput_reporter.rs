//! Periodic throughput log.
//!
//! Every reporting period the broadcaster's counters are read and reset and
//! a single `info` line is emitted with the totals, the number of connected
//! clients and the current queue depth.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

use crate::events::EventQueue;
use crate::processors::broadcaster::{BandwidthSnapshot, Broadcaster};
use crate::utils::shutdown::wait_for_shutdown;

pub struct ThroughputReporter {
    broadcaster: Broadcaster,
    queue: EventQueue,
    interval: Duration,
}

impl ThroughputReporter {
    pub fn new(broadcaster: Broadcaster, queue: EventQueue, interval: Duration) -> Self {
        Self {
            broadcaster,
            queue,
            interval: interval.max(Duration::from_secs(1)),
        }
    }

    /// Log and reset the counters. Returns what was logged.
    pub fn report(&self) -> BandwidthSnapshot {
        let snapshot = self.broadcaster.counters().take();
        info!(
            bytes_sent = snapshot.bytes_sent,
            messages_sent = snapshot.messages_sent,
            clients = self.broadcaster.client_count(),
            queue_depth = self.queue.len(),
            period_secs = self.interval.as_secs(),
            "Throughput report"
        );
        snapshot
    }

    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = wait_for_shutdown(&mut shutdown_rx) => break,

                _ = ticker.tick() => {
                    self.report();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::queue::tests::event;

    #[test]
    fn test_report_resets_counters() {
        let broadcaster = Broadcaster::new(8);
        let _client = broadcaster.subscribe();
        broadcaster.broadcast(&event(1));
        broadcaster.broadcast(&event(2));

        let reporter = ThroughputReporter::new(broadcaster.clone(), EventQueue::new(), Duration::from_secs(60));
        let first = reporter.report();
        assert_eq!(first.messages_sent, 2);
        assert!(first.bytes_sent > 0);
        assert_eq!(reporter.report(), BandwidthSnapshot::default());
    }
}
