// Asset Registry Service - in-memory asset CRUD over HTTP
// Assets live only as long as the process; nothing is persisted

use asset_registry::{router, spawn_asset_store, AppState, Config};
use std::future::Future;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .init();

    info!("Starting Asset Registry Service");

    // Load configuration
    let config = Config::from_env()?;

    let store = spawn_asset_store(config.store.mailbox_capacity);
    let state = AppState {
        store: store.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("Server is running on {}", config.server.bind_addr);
    info!("   POST   /assets     - Create asset");
    info!("   GET    /assets     - List assets");
    info!("   GET    /assets/:id - Get asset");
    info!("   PUT    /assets/:id - Update asset");
    info!("   DELETE /assets/:id - Delete asset");
    info!("   GET    /health     - Health check");
    info!("   GET    /metrics    - Prometheus metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal(tokio::signal::ctrl_c()).await;
        })
        .await?;

    store.shutdown().await?;
    info!("Asset Registry Service stopped");

    Ok(())
}

/// Wait for the shutdown signal; false when the listener could not be installed
async fn shutdown_signal(signal: impl Future<Output = std::io::Result<()>>) -> bool {
    match signal.await {
        Ok(()) => {
            info!("Shutdown signal received");
            true
        }
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            false
        }
    }
}
