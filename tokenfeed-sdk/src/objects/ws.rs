//! Push protocol between the relay server and browser clients.
//!
//! The `GET /ws` endpoint pushes one JSON text frame per paced event.
//! Depending on deployment the frame is either the bare event or an
//! internally-tagged envelope:
//!
//! ```json
//! {"coinId":7,"name":"Cat Coin","symbol":"CAT","description":"","image":"","mint":"7GC..."}
//! {"type":"newToken","coinId":7,"name":"Cat Coin", ...}
//! {"type":"decisionBundle","decisions":{"7":"yes","8":"no"}}
//! ```
//!
//! Clients must accept all three shapes, which is what [`FeedFrame`]'s
//! `Deserialize` impl does.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::event::EnrichedEvent;

/// Verdict attached to a card by a decision bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Yes,
    No,
}

/// Tagged envelope, dispatched on the `"type"` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TaggedFrame {
    NewToken(EnrichedEvent),
    /// Keys are `coinId`s rendered as JSON object keys (strings).
    DecisionBundle {
        decisions: BTreeMap<String, Decision>,
    },
}

/// Any frame a client may receive.
///
/// Tagged shapes are tried first; a frame without a recognised `"type"`
/// falls back to the bare event shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedFrame {
    Tagged(TaggedFrame),
    Plain(EnrichedEvent),
}

impl FeedFrame {
    /// The event carried by this frame, if any.
    pub fn event(&self) -> Option<&EnrichedEvent> {
        match self {
            FeedFrame::Plain(event) | FeedFrame::Tagged(TaggedFrame::NewToken(event)) => {
                Some(event)
            }
            FeedFrame::Tagged(TaggedFrame::DecisionBundle { .. }) => None,
        }
    }

    /// Decisions keyed by numeric `coinId`. Keys that are not integers are
    /// skipped.
    pub fn decisions(&self) -> Vec<(u64, Decision)> {
        match self {
            FeedFrame::Tagged(TaggedFrame::DecisionBundle { decisions }) => decisions
                .iter()
                .filter_map(|(id, decision)| id.parse().ok().map(|id| (id, *decision)))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Which outbound shape the server emits for new events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStyle {
    /// Bare `{coinId, name, ...}` objects.
    #[default]
    Plain,
    /// `{"type":"newToken", ...}` envelopes.
    Tagged,
}

impl FrameStyle {
    /// Wrap an event in the configured outbound shape.
    pub fn frame(self, event: EnrichedEvent) -> FeedFrame {
        match self {
            FrameStyle::Plain => FeedFrame::Plain(event),
            FrameStyle::Tagged => FeedFrame::Tagged(TaggedFrame::NewToken(event)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> EnrichedEvent {
        EnrichedEvent {
            coin_id: 7,
            name: "Cat Coin".into(),
            symbol: "CAT".into(),
            description: "meow".into(),
            image: String::new(),
            mint: "7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr".into(),
            twitter: None,
            website: None,
        }
    }

    #[test]
    fn test_plain_frame_is_bare_event() {
        let json = serde_json::to_value(FrameStyle::Plain.frame(sample_event())).unwrap();
        assert_eq!(json["coinId"], 7);
        assert!(json.get("type").is_none());
        assert!(json.get("twitter").is_none());
    }

    #[test]
    fn test_tagged_frame_carries_type() {
        let json = serde_json::to_value(FrameStyle::Tagged.frame(sample_event())).unwrap();
        assert_eq!(json["type"], "newToken");
        assert_eq!(json["symbol"], "CAT");
    }

    #[test]
    fn test_client_accepts_both_event_shapes() {
        let plain = r#"{"coinId":7,"name":"Cat Coin","symbol":"CAT","description":"meow","image":"","mint":"7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr"}"#;
        let tagged = r#"{"type":"newToken","coinId":7,"name":"Cat Coin","symbol":"CAT","description":"meow","image":"","mint":"7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr"}"#;

        let plain: FeedFrame = serde_json::from_str(plain).unwrap();
        let tagged: FeedFrame = serde_json::from_str(tagged).unwrap();

        assert!(matches!(plain, FeedFrame::Plain(_)));
        assert!(matches!(tagged, FeedFrame::Tagged(TaggedFrame::NewToken(_))));
        assert_eq!(plain.event(), tagged.event());
        assert_eq!(plain.event(), Some(&sample_event()));
    }

    #[test]
    fn test_decision_bundle_parsing() {
        let json = r#"{"type":"decisionBundle","decisions":{"7":"yes","8":"no","x":"yes"}}"#;
        let frame: FeedFrame = serde_json::from_str(json).unwrap();
        assert!(frame.event().is_none());
        assert_eq!(frame.decisions(), vec![(7, Decision::Yes), (8, Decision::No)]);
    }

    #[test]
    fn test_garbage_frame_is_rejected() {
        assert!(serde_json::from_str::<FeedFrame>(r#"{"type":"somethingElse"}"#).is_err());
        assert!(serde_json::from_str::<FeedFrame>("not json").is_err());
    }
}
