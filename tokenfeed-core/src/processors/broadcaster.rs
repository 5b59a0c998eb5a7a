//! Fan-out of paced frames to every connected client.
//!
//! Each client connection holds a receiver of the internal broadcast
//! channel. A message is serialized once and the same payload is handed to
//! every receiver; clients that have gone away simply no longer hold a
//! receiver and are skipped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error};

/// Serialized frame shared by every client.
pub type Payload = Arc<str>;

/// Aggregate outbound traffic since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandwidthSnapshot {
    /// Bytes written, summed over all clients.
    pub bytes_sent: u64,
    /// Broadcasts that reached at least one client.
    pub messages_sent: u64,
}

/// Process-wide outbound counters.
#[derive(Debug, Default)]
pub struct BandwidthCounters {
    bytes_sent: AtomicU64,
    messages_sent: AtomicU64,
}

impl BandwidthCounters {
    fn record(&self, payload_len: usize, receivers: usize) {
        let bytes = (payload_len as u64).saturating_mul(receivers as u64);
        self.bytes_sent.fetch_add(bytes, Ordering::Relaxed);
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BandwidthSnapshot {
        BandwidthSnapshot {
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
        }
    }

    /// Read and zero both counters.
    pub fn take(&self) -> BandwidthSnapshot {
        BandwidthSnapshot {
            bytes_sent: self.bytes_sent.swap(0, Ordering::Relaxed),
            messages_sent: self.messages_sent.swap(0, Ordering::Relaxed),
        }
    }
}

/// Cloneable handle to the client fan-out.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<Payload>,
    counters: Arc<BandwidthCounters>,
}

impl Broadcaster {
    /// `capacity` is how many frames a slow client may fall behind before
    /// it starts skipping.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            counters: Arc::new(BandwidthCounters::default()),
        }
    }

    /// Register a new client.
    pub fn subscribe(&self) -> broadcast::Receiver<Payload> {
        self.tx.subscribe()
    }

    /// Number of currently registered clients.
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn counters(&self) -> &BandwidthCounters {
        &self.counters
    }

    /// Serialize `message` once and hand it to every client.
    ///
    /// Returns the number of clients reached. Having no clients is not an
    /// error; the message is dropped.
    pub fn broadcast<T: Serialize>(&self, message: &T) -> usize {
        let payload: Payload = match serde_json::to_string(message) {
            Ok(json) => json.into(),
            Err(e) => {
                error!(error = %e, "Failed to serialize broadcast message");
                return 0;
            }
        };

        let payload_len = payload.len();
        match self.tx.send(payload) {
            Ok(receivers) => {
                self.counters.record(payload_len, receivers);
                receivers
            }
            Err(_) => {
                debug!("No connected clients, broadcast dropped");
                0
            }
        }
    }
}
