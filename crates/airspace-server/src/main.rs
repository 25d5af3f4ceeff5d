//! Airspace Server - polls telemetry and breach predictions and serves the
//! operator view.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airspace_server::{api, config::Config, loops, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("airspace_server=debug".parse()?))
        .init();

    tracing::info!("Starting Airspace Server...");

    let config = Config::from_env();
    let port = config.server_port;
    tracing::info!(
        "Telemetry source {} every {:?}, predictions {} every {:?}",
        config.telemetry_url,
        config.telemetry_poll,
        config.prediction_url,
        config.breach_poll
    );
    let state = Arc::new(AppState::new(config));

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Start background loops
    let handles = loops::spawn_all(state.clone(), &shutdown_tx)?;

    // Build the app
    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let signal_tx = shutdown_tx.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
            let _ = signal_tx.send(());
        })
        .await?;

    // Covers the server exiting on its own as well.
    let _ = shutdown_tx.send(());
    for handle in handles {
        let _ = handle.await;
    }
    tracing::info!("Airspace Server stopped");

    Ok(())
}
