//! Application state shared across all request handlers.

use std::sync::Arc;
use tokenfeed_core::config::PacerConfig;
use tokenfeed_core::events::EventQueue;
use tokenfeed_core::processors::{Broadcaster, ListenerState};
use tokio::sync::watch;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Fan-out to connected `/ws` clients.
    pub broadcaster: Broadcaster,
    /// Events waiting for the pacer.
    pub queue: EventQueue,
    /// Upstream connection state, published by the listener.
    pub upstream: watch::Receiver<ListenerState>,
    /// Pacer settings (can be reloaded via SIGHUP).
    pub pacer_config: Arc<watch::Sender<PacerConfig>>,
}

impl AppState {
    pub fn new(
        broadcaster: Broadcaster,
        queue: EventQueue,
        upstream: watch::Receiver<ListenerState>,
        pacer_config: watch::Sender<PacerConfig>,
    ) -> Self {
        Self {
            broadcaster,
            queue,
            upstream,
            pacer_config: Arc::new(pacer_config),
        }
    }

    /// Update the pacer settings (used during SIGHUP reload).
    ///
    /// Returns `false` when nothing changed.
    pub fn update_pacer_config(&self, new_config: PacerConfig) -> bool {
        self.pacer_config.send_if_modified(|current| {
            if *current == new_config {
                false
            } else {
                *current = new_config;
                true
            }
        })
    }
}
