//! Retail Reporting Dashboard - Backend Server
//!
//! Serves the inventory, sales and cash-close pages store staff use on top of
//! the ERP database.

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dashboard_server::{create_app, data_source::PgDataSource, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Retail Reporting Dashboard");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("ERP schema: {}", config.erp.schema);

    // Connections are opened on demand; the ERP may be down at startup
    let data_source = PgDataSource::connect_lazy(&config.database, config.erp.schema.clone())?;

    let state = AppState::new(Arc::new(data_source), config.clone());

    // Warm the snapshot cache from disk, if a previous run left one
    match state.cache.get().await {
        Some(snapshot) => tracing::info!(
            "Inventory snapshot restored: {} items captured at {}",
            snapshot.len(),
            snapshot.captured_at
        ),
        None => tracing::info!(
            "No inventory snapshot at {}; waiting for a manual refresh",
            state.cache.path().display()
        ),
    }

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);
    for page in ["inventario", "reporte-diario", "reporte-acumulado", "cierre-diario"] {
        tracing::info!("  http://localhost:{}/{}", config.server.port, page);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
