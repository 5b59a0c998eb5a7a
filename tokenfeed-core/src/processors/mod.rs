//! Processors of the relay pipeline:
//!
//! - `UpstreamListener`: reads the upstream feed, admits creation events
//!   and spawns their enrichment
//! - `MetadataEnricher`: turns a raw event into an `EnrichedEvent`
//! - `ArrivalSequencer`: restores arrival order, feeds the `EventQueue`
//! - `Pacer`: pops one event per period, hands it to the `Broadcaster`
//! - `Broadcaster`: fans frames out to every client
//! - `ThroughputReporter`: logs outbound traffic periodically

pub mod broadcaster;
pub mod enricher;
pub mod pacer;
pub mod sequencer;
pub mod throughput_reporter;
pub mod upstream_listener;

pub use broadcaster::{BandwidthCounters, BandwidthSnapshot, Broadcaster, Payload};
pub use enricher::{
    EnrichError, FIRST_COIN_ID, HttpMetadataFetcher, MetadataEnricher, MetadataFetcher,
    PendingEvent,
};
pub use pacer::Pacer;
pub use sequencer::ArrivalSequencer;
pub use throughput_reporter::ThroughputReporter;
pub use upstream_listener::{
    FixedDelay, FrameKind, ListenerError, ListenerState, ReconnectPolicy, UpstreamListener,
    classify_frame,
};
