//! Channel factories for the pipeline tasks.

use tokenfeed_sdk::objects::EnrichedEvent;
use tokio::sync::{mpsc, watch};

/// Default buffer size for event channels.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for finished enrichments.
pub type EnrichedEventSender = mpsc::Sender<EnrichedEvent>;
/// Receiver handle for finished enrichments.
pub type EnrichedEventReceiver = mpsc::Receiver<EnrichedEvent>;

/// Create the channel between enrichment tasks and the sequencer.
///
/// Enrichment tasks are spawned per event, so the sender is cloned once
/// per in-flight enrichment.
pub fn enriched_event_channel() -> (EnrichedEventSender, EnrichedEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create the shutdown flag shared by every processor. Send `true` to stop.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}
