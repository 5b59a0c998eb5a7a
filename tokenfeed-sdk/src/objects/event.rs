use serde::{Deserialize, Serialize};

/// A creation event after enrichment, ready to be paced out to clients.
///
/// Created once by the enricher and never mutated afterwards.
/// `coin_id` is unique and increases in upstream arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedEvent {
    pub coin_id: u64,
    pub name: String,
    pub symbol: String,
    /// Single line, at most the configured cap plus a `...` marker.
    pub description: String,
    /// Canonical gateway URL, the producer's URL, or empty.
    pub image: String,
    pub mint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}
