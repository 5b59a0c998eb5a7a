//! Runtime configuration types for the relay pipeline.
//!
//! These are the validated, typed settings handed to processors. Parsing
//! the TOML file is handled by the server crate.

mod broadcast;
mod enricher;
mod pacer;
mod upstream;

pub use broadcast::BroadcastConfig;
pub use enricher::EnricherConfig;
pub use pacer::PacerConfig;
pub use upstream::UpstreamConfig;
