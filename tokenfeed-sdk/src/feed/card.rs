use std::collections::VecDeque;

use crate::objects::Decision;

/// Layout constants for one feed column. Units are pixels and seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedGeometry {
    /// Downward speed of every card.
    pub flow_speed: f64,
    /// Minimum gap between a card and the older card below it.
    pub spacing: f64,
    /// Height of the visible area. A card whose top edge passes this
    /// value is evicted.
    pub viewport_height: f64,
}

impl Default for FeedGeometry {
    fn default() -> Self {
        Self {
            flow_speed: 100.0,
            spacing: 10.0,
            viewport_height: 800.0,
        }
    }
}

/// One on-screen card. `position` is the top edge, `0.0` is the top of the
/// visible area and positive values point down.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub coin_id: u64,
    pub position: f64,
    pub height: f64,
    pub decision: Option<Decision>,
}

impl Card {
    /// A card whose bottom edge touches the top of the visible area.
    pub fn above_viewport(coin_id: u64, height: f64) -> Self {
        Self {
            coin_id,
            position: -height,
            height,
            decision: None,
        }
    }

    /// Lowest top edge this card may have while sitting above `older`.
    pub fn limit_above(&self, older: &Card, spacing: f64) -> f64 {
        older.position - self.height - spacing
    }

    pub fn is_past(&self, viewport_height: f64) -> bool {
        self.position > viewport_height
    }
}

/// Result of one frame: the surviving cards (newest first) and the cards
/// that left the visible area during this frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Advanced {
    pub cards: VecDeque<Card>,
    pub evicted: Vec<Card>,
}

/// Move every card down by `flow_speed * elapsed_secs`, resolve collisions
/// and evict cards that left the visible area.
///
/// `cards` is ordered newest first. Cards are processed from the back so
/// that each clamp reads a neighbour position that is already final for
/// this frame. Negative or NaN elapsed times move nothing.
pub fn advance(mut cards: VecDeque<Card>, elapsed_secs: f64, geometry: &FeedGeometry) -> Advanced {
    let distance = geometry.flow_speed * elapsed_secs.max(0.0);

    for i in (0..cards.len()).rev() {
        let limit = cards
            .get(i + 1)
            .map(|older| cards[i].limit_above(older, geometry.spacing));
        let card = &mut cards[i];
        card.position += distance;
        if let Some(limit) = limit {
            card.position = card.position.min(limit);
        }
    }

    let (cards, evicted): (VecDeque<Card>, VecDeque<Card>) = cards
        .into_iter()
        .partition(|card| !card.is_past(geometry.viewport_height));

    Advanced {
        cards,
        evicted: evicted.into(),
    }
}
