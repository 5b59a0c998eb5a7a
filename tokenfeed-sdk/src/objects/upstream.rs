//! Frames exchanged with the upstream new-token feed.
//!
//! The upstream protocol is treated as opaque apart from two things: the
//! subscription request sent right after connecting, and the `txType`
//! discriminator that marks creation events.

use serde::{Deserialize, Serialize};

/// Value of `txType` carried by creation events.
pub const CREATE_TX_TYPE: &str = "create";

/// Subscription request sent once per connection.
///
/// ```json
/// {"method":"subscribeNewToken"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub method: String,
}

impl SubscribeRequest {
    pub const NEW_TOKEN: &str = "subscribeNewToken";

    pub fn new_token() -> Self {
        Self {
            method: Self::NEW_TOKEN.to_string(),
        }
    }
}

/// A frame pushed by the upstream feed.
///
/// Only the fields the relay cares about are modelled; anything else in the
/// frame is ignored. Every field is optional because the feed also pushes
/// acknowledgements and trade frames that share none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub tx_type: Option<String>,
    #[serde(default)]
    pub mint: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    /// Pointer to the off-band metadata document.
    #[serde(default)]
    pub uri: Option<String>,
}

impl RawEvent {
    /// Returns `true` if this frame announces a newly created token.
    pub fn is_creation(&self) -> bool {
        self.tx_type.as_deref() == Some(CREATE_TX_TYPE)
    }
}
