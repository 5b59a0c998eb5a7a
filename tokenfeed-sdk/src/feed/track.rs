use std::collections::VecDeque;
use std::time::Duration;

use super::card::{Card, FeedGeometry, advance};
use crate::objects::{Decision, EnrichedEvent, FeedFrame};

/// Where cards are drawn. Implemented by whatever owns the visual elements.
pub trait DisplaySurface {
    /// Create or move the element for `card`.
    fn place(&mut self, card: &Card);
    /// Drop the element for `coin_id`.
    fn remove(&mut self, coin_id: u64);
}

/// The ordered set of active cards, newest first.
#[derive(Debug, Clone)]
pub struct CardTrack {
    cards: VecDeque<Card>,
    geometry: FeedGeometry,
}

impl CardTrack {
    pub fn new(geometry: FeedGeometry) -> Self {
        Self {
            cards: VecDeque::new(),
            geometry,
        }
    }

    pub fn geometry(&self) -> &FeedGeometry {
        &self.geometry
    }

    /// Active cards, newest first.
    pub fn cards(&self) -> &VecDeque<Card> {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Insert a card for a newly received event above the visible area.
    ///
    /// If the newest card has not moved far enough yet, the new card starts
    /// higher so the gap is respected immediately. A `coin_id` that is
    /// already on the track is ignored.
    pub fn insert(&mut self, coin_id: u64, height: f64) -> Option<&Card> {
        if self.cards.iter().any(|card| card.coin_id == coin_id) {
            return None;
        }

        let mut card = Card::above_viewport(coin_id, height);
        if let Some(newest) = self.cards.front() {
            card.position = card
                .position
                .min(card.limit_above(newest, self.geometry.spacing));
        }
        self.cards.push_front(card);
        self.cards.front()
    }

    /// Handle one push frame. `measure` gives the rendered height of the
    /// card for a new event. Returns the inserted `coin_id`, if any.
    pub fn receive<F>(&mut self, frame: &FeedFrame, measure: F) -> Option<u64>
    where
        F: FnOnce(&EnrichedEvent) -> f64,
    {
        if let Some(event) = frame.event() {
            let height = measure(event);
            return self.insert(event.coin_id, height).map(|card| card.coin_id);
        }
        self.apply_decisions(&frame.decisions());
        None
    }

    /// Attach decisions to matching cards. Returns how many cards changed.
    pub fn apply_decisions(&mut self, decisions: &[(u64, Decision)]) -> usize {
        let mut applied = 0;
        for (coin_id, decision) in decisions {
            if let Some(card) = self.cards.iter_mut().find(|card| card.coin_id == *coin_id) {
                card.decision = Some(*decision);
                applied += 1;
            }
        }
        applied
    }

    /// Run one frame of motion. Returns the cards evicted in this frame.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<Card> {
        let advanced = advance(
            std::mem::take(&mut self.cards),
            elapsed.as_secs_f64(),
            &self.geometry,
        );
        self.cards = advanced.cards;
        advanced.evicted
    }

    /// Run one frame and mirror the result onto `surface`.
    pub fn render<S: DisplaySurface>(&mut self, elapsed: Duration, surface: &mut S) {
        for card in self.tick(elapsed) {
            surface.remove(card.coin_id);
        }
        for card in &self.cards {
            surface.place(card);
        }
    }
}

impl Default for CardTrack {
    fn default() -> Self {
        Self::new(FeedGeometry::default())
    }
}
