//! TOML file configuration structures.
//!
//! These structs directly map to the `tokenfeed-config.toml` file format.
//! Every section and field is optional; missing values take the defaults
//! of the runtime config types.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use tokenfeed_core::config::{
    BroadcastConfig, EnricherConfig, PacerConfig, UpstreamConfig,
};
use tokenfeed_sdk::objects::FrameStyle;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamSection,
    pub pacer: PacerSection,
    pub enricher: EnricherSection,
    pub broadcast: BroadcastSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

/// Upstream feed section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSection {
    /// WebSocket URL of the new-token feed.
    pub url: String,
    pub reconnect_delay_secs: u64,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            url: UpstreamConfig::DEFAULT_URL.to_string(),
            reconnect_delay_secs: UpstreamConfig::DEFAULT_RECONNECT_DELAY.as_secs(),
        }
    }
}

/// Pacer section. Reloadable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacerSection {
    /// Minimum time between two outbound events, in milliseconds.
    pub period_ms: u64,
}

impl Default for PacerSection {
    fn default() -> Self {
        Self {
            period_ms: PacerConfig::DEFAULT_PERIOD.as_millis() as u64,
        }
    }
}

/// Metadata enrichment section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnricherSection {
    /// Gateway prefixes, tried in order.
    pub gateways: Vec<String>,
    pub canonical_image_base: String,
    /// Description length cap in characters.
    pub description_cap: usize,
    pub fetch_timeout_secs: u64,
}

impl Default for EnricherSection {
    fn default() -> Self {
        let defaults = EnricherConfig::default();
        Self {
            gateways: defaults.gateways,
            canonical_image_base: defaults.canonical_image_base,
            description_cap: defaults.description_cap,
            fetch_timeout_secs: defaults.fetch_timeout.as_secs(),
        }
    }
}

/// Client fan-out section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastSection {
    /// `plain` or `tagged`. Reloadable.
    pub frame_style: FrameStyle,
    pub report_interval_secs: u64,
    pub channel_capacity: usize,
}

impl Default for BroadcastSection {
    fn default() -> Self {
        let defaults = BroadcastConfig::default();
        Self {
            frame_style: FrameStyle::default(),
            report_interval_secs: defaults.report_interval.as_secs(),
            channel_capacity: defaults.channel_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[upstream]
url = "wss://feed.example.com/api/data"
reconnect_delay_secs = 2

[pacer]
period_ms = 250

[enricher]
gateways = ["https://gw.example.com/ipfs/"]
canonical_image_base = "https://img.example.com/ipfs"
description_cap = 50
fetch_timeout_secs = 3

[broadcast]
frame_style = "tagged"
report_interval_secs = 30
channel_capacity = 16
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.upstream.url, "wss://feed.example.com/api/data");
        assert_eq!(config.upstream.reconnect_delay_secs, 2);
        assert_eq!(config.pacer.period_ms, 250);
        assert_eq!(config.enricher.gateways.len(), 1);
        assert_eq!(config.enricher.description_cap, 50);
        assert_eq!(config.broadcast.frame_style, FrameStyle::Tagged);
        assert_eq!(config.broadcast.channel_capacity, 16);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.upstream.url, UpstreamConfig::DEFAULT_URL);
        assert_eq!(config.upstream.reconnect_delay_secs, 5);
        assert_eq!(config.pacer.period_ms, 1000);
        assert_eq!(config.enricher.gateways.len(), 4);
        assert_eq!(config.enricher.description_cap, 35);
        assert_eq!(config.broadcast.frame_style, FrameStyle::Plain);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: FileConfig = toml::from_str("[pacer]\n[enricher]\ndescription_cap = 10\n").unwrap();
        assert_eq!(config.pacer.period_ms, 1000);
        assert_eq!(config.enricher.description_cap, 10);
        assert_eq!(config.enricher.fetch_timeout_secs, 10);
    }

    #[test]
    fn test_unknown_frame_style_rejected() {
        assert!(toml::from_str::<FileConfig>("[broadcast]\nframe_style = \"binary\"\n").is_err());
    }
}
