use anyhow::{Context, Result};
use fieldsense::api::create_router;
use fieldsense::clock::{SharedClock, SystemClock};
use fieldsense::config::load_or_default;
use fieldsense::sensor::SensorStore;
use fieldsense::simulator::Simulator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldsense=info".into()),
        )
        .init();

    info!("Fieldsense starting...");

    let config_path =
        std::env::var("FIELDSENSE_CONFIG").unwrap_or_else(|_| "fieldsense.toml".to_string());
    let config = load_or_default(&config_path)?.apply_env();
    info!(config = %config_path, bind_addr = %config.server.bind_addr, "Configuration loaded");

    let rng = |salt: u64| match config.simulation.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(salt)),
        None => StdRng::from_entropy(),
    };

    let clock: SharedClock = Arc::new(SystemClock);
    let store = if config.store.seed_demo_sensors {
        SensorStore::with_demo_sensors(rng(0), clock)
    } else {
        SensorStore::new(Vec::new(), rng(0), clock)
    };
    let store = Arc::new(store);

    let simulator = config
        .simulation
        .enabled
        .then(|| Simulator::new(Arc::clone(&store), &config.simulation, rng(1)).spawn());

    let app = create_router(Arc::clone(&store)).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    if let Some(simulator) = simulator {
        simulator.shutdown();
    }

    info!("Fieldsense stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
