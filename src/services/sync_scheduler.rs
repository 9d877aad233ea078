use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::db::StockRepository;
use crate::external::quote_provider::QuoteProvider;
use crate::services::sync_service;

// Context handed to every sync run
#[derive(Clone)]
pub struct SyncContext {
    pub repo: Arc<dyn StockRepository>,
    pub provider: Arc<dyn QuoteProvider>,
    pub max_pages: u32,
}

/// Background task that mirrors the upstream catalog: once at startup,
/// then again `interval` after each run finishes. Runs never overlap.
pub struct SyncScheduler {
    context: SyncContext,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(context: SyncContext, interval: Duration) -> Self {
        Self { context, interval }
    }

    /// Spawn the loop. It exits once `shutdown` flips to `true` or its
    /// sender is dropped; an in-flight run is abandoned at that point, which
    /// rolls back its open transaction.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("🚀 Starting background stock sync (interval: {:?})", self.interval);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = self.run_once() => {}
                _ = shutdown.changed() => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!("🛑 Background stock sync stopped");
    }

    async fn run_once(&self) {
        info!("🏃 Running stock sync");
        let started_at = Utc::now();

        let result = sync_service::run_sync(
            self.context.repo.as_ref(),
            self.context.provider.as_ref(),
            self.context.max_pages,
        )
        .await;

        let duration_ms = (Utc::now() - started_at).num_milliseconds();

        match result {
            Ok(report) => {
                if let Some(e) = &report.upstream_error {
                    warn!("Stock sync ended early after upstream failure: {}", e);
                }
                info!(
                    "✅ Stock sync completed (stored: {}, failed: {}, duration: {}ms)",
                    report.stocks_stored, report.stocks_failed, duration_ms
                );
            }
            Err(e) => {
                error!("❌ Stock sync failed after {}ms: {}", duration_ms, e);
            }
        }
    }
}
