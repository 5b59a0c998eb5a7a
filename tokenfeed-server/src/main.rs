//! tokenfeed server
//!
//! Relays new-token creation events from an upstream feed to WebSocket
//! clients, enriched with off-chain metadata and paced to a fixed rate.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::ConfigLoader;
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokenfeed_core::events::{EventQueue, enriched_event_channel, shutdown_channel};
use tokenfeed_core::processors::{
    ArrivalSequencer, Broadcaster, FIRST_COIN_ID, MetadataEnricher, Pacer, ThroughputReporter,
    UpstreamListener,
};
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// tokenfeed - paced relay for new-token events
#[derive(Parser, Debug)]
#[command(name = "tokenfeed-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./tokenfeed-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting tokenfeed-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.server.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Pipeline plumbing
    let queue = EventQueue::new();
    let broadcaster = Broadcaster::new(loaded_config.broadcast.channel_capacity);
    let enricher = Arc::new(MetadataEnricher::with_http(loaded_config.enricher));
    let (enriched_tx, enriched_rx) = enriched_event_channel();
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let (pacer_config_tx, pacer_config_rx) = watch::channel(loaded_config.pacer);

    let listener = UpstreamListener::new(loaded_config.upstream, enricher, enriched_tx);
    let upstream_state = listener.state();

    let mut processor_handles = Vec::new();
    processor_handles.push(tokio::spawn(listener.run(shutdown_rx.clone())));
    processor_handles.push(tokio::spawn(
        ArrivalSequencer::new(queue.clone(), FIRST_COIN_ID).run(shutdown_rx.clone(), enriched_rx),
    ));
    processor_handles.push(tokio::spawn(
        Pacer::new(queue.clone(), broadcaster.clone()).run(shutdown_rx.clone(), pacer_config_rx),
    ));
    processor_handles.push(tokio::spawn(
        ThroughputReporter::new(
            broadcaster.clone(),
            queue.clone(),
            loaded_config.broadcast.report_interval,
        )
        .run(shutdown_rx),
    ));
    tracing::info!("Pipeline processors started");

    // Create application state
    let state = AppState::new(broadcaster, queue, upstream_state, pacer_config_tx);

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(state.clone(), config_loader);

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Signal the config reload handler and processors to stop
    shutdown_notify.notify_one();
    let _ = shutdown_tx.send(true);
    for handle in processor_handles {
        if let Err(e) = handle.await {
            tracing::error!("Processor task failed: {}", e);
        }
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
