use std::time::Duration;

/// Connection settings for the upstream new-token feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// WebSocket URL of the feed.
    pub url: String,
    /// Pause between a disconnect and the next connection attempt.
    pub reconnect_delay: Duration,
}

impl UpstreamConfig {
    pub const DEFAULT_URL: &str = "wss://pumpportal.fun/api/data";
    pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: Self::DEFAULT_URL.to_string(),
            reconnect_delay: Self::DEFAULT_RECONNECT_DELAY,
        }
    }
}
