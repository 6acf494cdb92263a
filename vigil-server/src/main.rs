//! Vigil - local HTTP diagnostic harness, headless server binary

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};
use vigil_common::{ServerEvent, VigilConfig};
use vigil_server::server::HttpServer;
use vigil_server::{event_channel, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vigil=info".parse()?)
                .add_directive("vigil_server=info".parse()?),
        )
        .init();

    info!("Starting Vigil v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("vigil.toml"));

    // Load or create default configuration
    let config = if config_path.exists() {
        info!("Loading configuration from {}", config_path.display());
        VigilConfig::load(&config_path)?
    } else {
        info!("No configuration file found, using defaults");
        let config = VigilConfig::default();
        // Save default config for reference
        if let Err(e) = config.save(&config_path) {
            error!("Failed to save default config: {}", e);
        }
        config
    };

    let (events_tx, mut events_rx) = event_channel();
    let state = Arc::new(AppState::new(config, events_tx));

    // Bind first; a bind failure must never enter the serving state
    let server = HttpServer::bind(state.clone()).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut server_handle = tokio::spawn(server.run(shutdown_rx));

    // Headless live view: drain presenter events into the structured log
    let presenter_handle = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            match event {
                ServerEvent::Log(entry) => {
                    info!("{}", entry.message);
                }
                ServerEvent::StatsChanged(snapshot) => {
                    debug!(
                        total = snapshot.total_requests,
                        buckets = snapshot.points.len(),
                        "stats changed"
                    );
                }
            }
        }
    });

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            let _ = shutdown_tx.send(true);
            if let Err(e) = (&mut server_handle).await {
                error!("Server task failed: {}", e);
            }
        }
        result = &mut server_handle => {
            if let Err(e) = result {
                error!("Server task failed: {}", e);
            }
        }
    }

    presenter_handle.abort();

    info!("Vigil shutdown complete");
    Ok(())
}
