use std::time::Duration;

use tokenfeed_sdk::objects::FrameStyle;

/// Pacer settings. Can be swapped at runtime through a `watch` channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacerConfig {
    /// At most one event leaves the queue per period.
    pub period: Duration,
    /// Outbound frame shape.
    pub frame_style: FrameStyle,
}

impl PacerConfig {
    pub const DEFAULT_PERIOD: Duration = Duration::from_millis(1000);
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            period: Self::DEFAULT_PERIOD,
            frame_style: FrameStyle::default(),
        }
    }
}
