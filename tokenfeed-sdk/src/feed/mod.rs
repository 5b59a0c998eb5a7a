//! Client-side feed renderer.
//!
//! Cards enter above the visible area, drift downward at a constant speed
//! and leave through the bottom. A newer card never overlaps the older card
//! below it: each frame the cards are advanced from oldest to newest and
//! every card is clamped against its already-moved older neighbour.
//!
//! The placement step ([`advance`]) is a pure function over the card list;
//! [`CardTrack`] owns the list between frames and mirrors changes onto a
//! [`DisplaySurface`].

mod card;
mod track;

pub use card::{Advanced, Card, FeedGeometry, advance};
pub use track::{CardTrack, DisplaySurface};
