//! Shared types for the tokenfeed relay.
//!
//! - [`objects`]: every JSON shape that crosses a process boundary
//!   (upstream frames, metadata documents, client push frames).
//! - [`feed`]: the client-side card renderer.
//! - `client` (feature `client`): a push-connection subscriber.

#![forbid(unsafe_code)]

pub mod feed;
pub mod objects;

#[cfg(feature = "client")]
pub mod client;
