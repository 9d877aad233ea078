mod app;
mod config;
mod db;
mod errors;
mod external;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::AppConfig;
use crate::db::{PgStockRepository, StockRepository};
use crate::external::listing_api::ListingApiProvider;
use crate::external::quote_provider::QuoteProvider;
use crate::logging::LoggingConfig;
use crate::services::sync_scheduler::{SyncContext, SyncScheduler};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env().context("invalid configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    tracing::info!("Database connection established");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    tracing::info!("Database migrated");

    let repo: Arc<dyn StockRepository> = Arc::new(PgStockRepository::new(pool));
    let provider: Arc<dyn QuoteProvider> = Arc::new(ListingApiProvider::new(&config.upstream));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sync_handle = if config.sync.enabled {
        let context = SyncContext {
            repo: repo.clone(),
            provider,
            max_pages: config.sync.max_pages,
        };
        Some(SyncScheduler::new(context, config.sync.interval).spawn(shutdown_rx))
    } else {
        tracing::warn!("Background sync disabled (SYNC_ENABLED=false)");
        None
    };

    let app = app::create_app(AppState::new(repo), &config.cors_allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Stock backend running at http://{}/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tx.send(true).ok();
    if let Some(handle) = sync_handle {
        if let Err(e) = handle.await {
            tracing::error!("Background sync task ended abnormally: {}", e);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
}
