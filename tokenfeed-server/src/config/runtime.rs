//! Runtime configuration types.
//!
//! Processor settings live in `tokenfeed_core::config`; only the HTTP
//! listener settings are specific to the server.

use std::net::SocketAddr;

pub use tokenfeed_core::config::{BroadcastConfig, EnricherConfig, PacerConfig, UpstreamConfig};

/// HTTP server settings. Not reloadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}
