//! Event buffering for the relay pipeline.
//!
//! # Event Flow
//!
//! 1. `UpstreamListener` admits a creation event and spawns its enrichment
//! 2. Enrichment tasks send `EnrichedEvent`s -> `ArrivalSequencer`
//! 3. `ArrivalSequencer` restores arrival order via [`ReorderBuffer`] and
//!    pushes into the [`EventQueue`]
//! 4. `Pacer` pops at most one event per period -> `Broadcaster`

pub mod channels;
pub mod queue;
pub mod reorder;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, EnrichedEventReceiver, EnrichedEventSender, enriched_event_channel,
    shutdown_channel,
};
pub use queue::EventQueue;
pub use reorder::ReorderBuffer;
