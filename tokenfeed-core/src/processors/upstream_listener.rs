//! UpstreamListener processor.
//!
//! The UpstreamListener is responsible for:
//! - Keeping a WebSocket connection to the upstream feed open
//! - Sending the new-token subscription on every (re)connect
//! - Parsing inbound frames and routing creation events to the enricher
//! - Reconnecting after a delay chosen by a [`ReconnectPolicy`], forever
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> (close / error) -> Disconnected -> ...
//! ```
//!
//! Enrichment runs in its own task per event; finished events are sent to
//! the `ArrivalSequencer`, which restores arrival order.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use kanau::processor::Processor;
use serde::Serialize;
use thiserror::Error;
use tokenfeed_sdk::objects::{RawEvent, SubscribeRequest};
use tokio::sync::watch;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, trace, warn};

use crate::config::UpstreamConfig;
use crate::events::EnrichedEventSender;
use crate::processors::enricher::MetadataEnricher;
use crate::utils::shutdown::wait_for_shutdown;

/// Longest frame excerpt written to logs.
const LOG_EXCERPT_CHARS: usize = 120;

/// Connection state, published on a `watch` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerState {
    Disconnected,
    Connecting,
    Connected,
}

/// Decides how long to wait before reconnect attempt `attempt`
/// (0 for the first retry after a disconnect).
pub trait ReconnectPolicy: Send + Sync {
    fn delay(&self, attempt: u32) -> Duration;
}

/// Same delay for every attempt.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl ReconnectPolicy for FixedDelay {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

/// Errors that end one upstream session.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Handshake, read or write failure
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The subscription request could not be encoded
    #[error("subscription encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What an inbound frame turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    Creation(RawEvent),
    Ignored,
}

/// Parse one inbound text frame.
pub fn classify_frame(text: &str) -> Result<FrameKind, serde_json::Error> {
    let event: RawEvent = serde_json::from_str(text)?;
    Ok(if event.is_creation() {
        FrameKind::Creation(event)
    } else {
        FrameKind::Ignored
    })
}

pub struct UpstreamListener {
    config: UpstreamConfig,
    policy: Arc<dyn ReconnectPolicy>,
    enricher: Arc<MetadataEnricher>,
    enriched_tx: EnrichedEventSender,
    state_tx: watch::Sender<ListenerState>,
}

impl UpstreamListener {
    pub fn new(
        config: UpstreamConfig,
        enricher: Arc<MetadataEnricher>,
        enriched_tx: EnrichedEventSender,
    ) -> Self {
        let (state_tx, _) = watch::channel(ListenerState::Disconnected);
        Self {
            policy: Arc::new(FixedDelay(config.reconnect_delay)),
            config,
            enricher,
            enriched_tx,
            state_tx,
        }
    }

    /// Replace the default [`FixedDelay`] policy.
    pub fn with_reconnect_policy(mut self, policy: Arc<dyn ReconnectPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Watch the connection state.
    pub fn state(&self) -> watch::Receiver<ListenerState> {
        self.state_tx.subscribe()
    }

    /// Run until shutdown. Never gives up on the upstream.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(url = %self.config.url, "UpstreamListener started");
        let mut attempt = 0u32;

        loop {
            self.set_state(ListenerState::Connecting);

            let outcome = tokio::select! {
                biased;

                _ = wait_for_shutdown(&mut shutdown_rx) => {
                    info!("UpstreamListener received shutdown signal");
                    break;
                }

                outcome = self.run_session() => outcome,
            };

            match outcome {
                Ok(()) => {
                    info!("Upstream connection closed");
                    attempt = 0;
                }
                Err(e) => {
                    warn!(error = %e, attempt, "Upstream connection failed");
                }
            }
            self.set_state(ListenerState::Disconnected);

            let delay = self.policy.delay(attempt);
            attempt = attempt.saturating_add(1);
            info!(delay_ms = delay.as_millis() as u64, "Reconnecting to upstream");

            tokio::select! {
                biased;

                _ = wait_for_shutdown(&mut shutdown_rx) => {
                    info!("UpstreamListener received shutdown signal");
                    break;
                }

                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.set_state(ListenerState::Disconnected);
        info!("UpstreamListener shutdown complete");
    }

    /// One connection, from handshake to close. `Ok` means the connection
    /// was established and later closed.
    async fn run_session(&self) -> Result<(), ListenerError> {
        let (stream, _response) = connect_async(self.config.url.as_str()).await?;
        let (mut write, mut read) = stream.split();
        self.set_state(ListenerState::Connected);
        info!(url = %self.config.url, "Connected to upstream feed");

        let request = serde_json::to_string(&SubscribeRequest::new_token())?;
        write.send(Message::Text(request.into())).await?;

        while let Some(message) = read.next().await {
            match message? {
                Message::Text(text) => self.handle_frame(text.as_str()),
                Message::Ping(data) => write.send(Message::Pong(data)).await?,
                Message::Close(frame) => {
                    info!(?frame, "Upstream sent close frame");
                    break;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn handle_frame(&self, text: &str) {
        match classify_frame(text) {
            Ok(FrameKind::Creation(raw)) => self.dispatch(raw),
            Ok(FrameKind::Ignored) => trace!("Ignoring non-creation frame"),
            Err(e) => {
                let excerpt: String = text.chars().take(LOG_EXCERPT_CHARS).collect();
                warn!(error = %e, frame = %excerpt, "Discarding malformed upstream frame");
            }
        }
    }

    /// Assign the arrival id now, enrich in the background.
    ///
    /// Every admitted id is reported to the sequencer exactly once; if the
    /// enrichment task dies, the raw fields are sent in its place.
    fn dispatch(&self, raw: RawEvent) {
        let pending = self.enricher.admit(raw);
        let coin_id = pending.coin_id;
        debug!(coin_id, mint = ?pending.raw.mint, "Creation event received");

        let enricher = Arc::clone(&self.enricher);
        let enriched_tx = self.enriched_tx.clone();
        tokio::spawn(async move {
            let fallback = pending.clone();
            let worker = Arc::clone(&enricher);
            let event = match tokio::spawn(async move { worker.process(pending).await }).await {
                Ok(Ok(event)) => event,
                Err(e) => {
                    error!(coin_id, error = %e, "Enrichment task failed, passing through");
                    enricher.passthrough(fallback)
                }
            };
            if enriched_tx.send(event).await.is_err() {
                warn!("Enriched event channel closed, event dropped");
            }
        });
    }

    fn set_state(&self, state: ListenerState) {
        self.state_tx.send_replace(state);
    }
}
