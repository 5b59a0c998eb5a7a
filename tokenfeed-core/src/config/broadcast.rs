use std::time::Duration;

/// Fan-out and throughput reporting settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastConfig {
    /// Frames buffered per client before a slow client starts skipping.
    pub channel_capacity: usize,
    /// How often the throughput counters are logged and reset.
    pub report_interval: Duration,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            report_interval: Duration::from_secs(60),
        }
    }
}
