//! Axum server setup and router configuration.

use crate::api;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use serde::Serialize;
use std::net::SocketAddr;
use tokenfeed_core::processors::ListenerState;
use tokio::net::TcpListener;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Paced event stream
        .route("/ws", get(api::feed::feed_ws))
        .with_state(state)
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    upstream: ListenerState,
    queue_depth: usize,
    clients: usize,
}

/// Returns OK while the server is running, along with pipeline gauges.
/// An upstream outage does not make the relay unhealthy; it reconnects
/// on its own.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let upstream = *state.upstream.borrow();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        upstream,
        queue_depth: state.queue.len(),
        clients: state.broadcaster.client_count(),
    })
}

/// Run the server with graceful shutdown support.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}
