//! Pacer processor.
//!
//! The Pacer is responsible for:
//! - Ticking on a fixed wall-clock period
//! - Popping at most one event from the [`EventQueue`] per tick and handing
//!   it to the [`Broadcaster`]
//! - Rebuilding its interval when the period is changed at runtime, with
//!   the first new tick one full period after the last forwarded event
//!
//! Inbound bursts are absorbed by the queue; outbound rate never exceeds
//! one event per period.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::PacerConfig;
use crate::events::EventQueue;
use crate::processors::broadcaster::Broadcaster;
use crate::utils::shutdown::wait_for_shutdown;
use tokenfeed_sdk::objects::FrameStyle;

pub struct Pacer {
    queue: EventQueue,
    broadcaster: Broadcaster,
}

impl Pacer {
    pub fn new(queue: EventQueue, broadcaster: Broadcaster) -> Self {
        Self { queue, broadcaster }
    }

    /// Forward the oldest queued event, if any. Returns its `coin_id`.
    pub fn tick(&self, frame_style: FrameStyle) -> Option<u64> {
        let event = self.queue.pop_front()?;
        let coin_id = event.coin_id;
        let delivered = self.broadcaster.broadcast(&frame_style.frame(event));
        debug!(
            coin_id,
            delivered,
            queue_depth = self.queue.len(),
            "Paced event out"
        );
        Some(coin_id)
    }

    /// Run until shutdown. `config_rx` carries the current period and frame
    /// style; a change takes effect immediately.
    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut config_rx: watch::Receiver<PacerConfig>,
    ) {
        let mut config = config_rx.borrow_and_update().clone();
        let mut interval = pacing_interval(Instant::now(), config.period);
        let mut last_forwarded: Option<Instant> = None;
        info!(period_ms = config.period.as_millis() as u64, "Pacer started");

        loop {
            tokio::select! {
                biased;

                _ = wait_for_shutdown(&mut shutdown_rx) => {
                    info!("Pacer received shutdown signal");
                    break;
                }

                Ok(()) = config_rx.changed() => {
                    let new_config = config_rx.borrow_and_update().clone();
                    if new_config.period != config.period {
                        let start = last_forwarded
                            .map(|at| at + new_config.period)
                            .unwrap_or_else(Instant::now);
                        interval = pacing_interval(start, new_config.period);
                    }
                    config = new_config;
                    info!(
                        period_ms = config.period.as_millis() as u64,
                        frame_style = ?config.frame_style,
                        "Pacer reconfigured"
                    );
                }

                _ = interval.tick() => {
                    if self.tick(config.frame_style).is_some() {
                        last_forwarded = Some(Instant::now());
                    }
                }
            }
        }

        info!(queue_depth = self.queue.len(), "Pacer shutdown complete");
    }
}

/// Interval whose first tick is at `start` (immediately if already past)
/// and that delays, rather than bursts, after a stall.
fn pacing_interval(start: Instant, period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(start, period.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::queue::tests::event;
    use crate::events::shutdown_channel;
    use tokenfeed_sdk::objects::FeedFrame;
    use tokio::sync::broadcast;

    fn drain(rx: &mut broadcast::Receiver<crate::processors::broadcaster::Payload>) -> Vec<u64> {
        let mut ids = Vec::new();
        while let Ok(payload) = rx.try_recv() {
            let frame: FeedFrame = serde_json::from_str(&payload).unwrap();
            ids.push(frame.event().unwrap().coin_id);
        }
        ids
    }

    #[test]
    fn test_tick_forwards_exactly_one_event() {
        let queue = EventQueue::new();
        let broadcaster = Broadcaster::new(16);
        let mut rx = broadcaster.subscribe();
        for id in 1..=10 {
            queue.push(event(id));
        }

        let pacer = Pacer::new(queue.clone(), broadcaster);
        assert_eq!(pacer.tick(FrameStyle::Plain), Some(1));

        assert_eq!(drain(&mut rx), vec![1]);
        assert_eq!(queue.len(), 9);
    }

    #[test]
    fn test_tick_on_empty_queue_is_noop() {
        let broadcaster = Broadcaster::new(16);
        let mut rx = broadcaster.subscribe();
        let pacer = Pacer::new(EventQueue::new(), broadcaster.clone());

        assert_eq!(pacer.tick(FrameStyle::Plain), None);
        assert!(drain(&mut rx).is_empty());
        assert_eq!(broadcaster.counters().snapshot().messages_sent, 0);
    }

    #[test]
    fn test_head_is_first_arrival() {
        let queue = EventQueue::new();
        let broadcaster = Broadcaster::new(16);
        let mut rx = broadcaster.subscribe();
        queue.push(event(1)); // A
        queue.push(event(2)); // B, 0.1 s later

        Pacer::new(queue.clone(), broadcaster).tick(FrameStyle::Tagged);
        assert_eq!(drain(&mut rx), vec![1]);
        assert_eq!(queue.pop_front().map(|e| e.coin_id), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_spread_one_per_period() {
        let queue = EventQueue::new();
        let broadcaster = Broadcaster::new(16);
        let mut rx = broadcaster.subscribe();
        for id in 1..=5 {
            queue.push(event(id));
        }

        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let (_config_tx, config_rx) = watch::channel(PacerConfig {
            period: Duration::from_secs(1),
            frame_style: FrameStyle::Plain,
        });
        let handle = tokio::spawn(Pacer::new(queue.clone(), broadcaster).run(shutdown_rx, config_rx));

        // Ticks at 0 s, 1 s and 2 s.
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(drain(&mut rx), vec![1, 2, 3]);
        assert_eq!(queue.len(), 2);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_period_change_waits_a_full_period_after_last_event() {
        let queue = EventQueue::new();
        let broadcaster = Broadcaster::new(16);
        let mut rx = broadcaster.subscribe();
        for id in 1..=10 {
            queue.push(event(id));
        }

        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let (config_tx, config_rx) = watch::channel(PacerConfig {
            period: Duration::from_secs(10),
            frame_style: FrameStyle::Plain,
        });
        let handle = tokio::spawn(Pacer::new(queue.clone(), broadcaster).run(shutdown_rx, config_rx));

        // First tick fires immediately with the slow period.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(drain(&mut rx), vec![1]);

        config_tx
            .send(PacerConfig {
                period: Duration::from_secs(1),
                frame_style: FrameStyle::Plain,
            })
            .unwrap();

        // Nothing before 1 s after event 1, then one per second.
        tokio::time::sleep(Duration::from_millis(800)).await;
        assert!(drain(&mut rx).is_empty());
        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(drain(&mut rx), vec![2, 3]);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_reloads_do_not_burst() {
        let queue = EventQueue::new();
        let broadcaster = Broadcaster::new(32);
        let mut rx = broadcaster.subscribe();
        for id in 1..=20 {
            queue.push(event(id));
        }

        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let (config_tx, config_rx) = watch::channel(PacerConfig {
            period: Duration::from_millis(1000),
            frame_style: FrameStyle::Plain,
        });
        let handle = tokio::spawn(Pacer::new(queue.clone(), broadcaster).run(shutdown_rx, config_rx));

        for period_ms in 1001..=1005 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            config_tx
                .send(PacerConfig {
                    period: Duration::from_millis(period_ms),
                    frame_style: FrameStyle::Plain,
                })
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(drain(&mut rx), vec![1]);

        // Next event one (latest) period after the first.
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(drain(&mut rx), vec![2]);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
