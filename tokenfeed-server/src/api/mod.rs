//! HTTP API handlers.

pub mod feed;
