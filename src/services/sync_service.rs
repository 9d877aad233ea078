use chrono::Utc;
use tracing::{error, info, warn};

use crate::db::StockRepository;
use crate::errors::AppError;
use crate::external::quote_provider::QuoteProvider;
use crate::models::{NewPricePoint, StockQuote};
use crate::services::seed_service;

pub const DEFAULT_MAX_PAGES: u32 = 20;

/// Outcome of one sync pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub pages_fetched: u32,
    pub stocks_stored: usize,
    pub stocks_failed: usize,
    /// Number of catalog entries written by the seed fallback, if it ran.
    pub seeded: Option<usize>,
    /// Set when pagination stopped because the upstream failed.
    pub upstream_error: Option<String>,
}

/// Mirror the upstream listing into storage.
///
/// Pagination is bounded by `max_pages`. An upstream failure ends the pass
/// early and is reported in `SyncReport::upstream_error` rather than as an
/// error. Each quote is written in its own transaction; a failing quote is
/// logged and skipped. If the catalog is still empty afterwards the seed
/// catalog is written. Only storage failures while counting or seeding
/// make the pass return `Err`.
pub async fn run_sync(
    repo: &dyn StockRepository,
    provider: &dyn QuoteProvider,
    max_pages: u32,
) -> Result<SyncReport, AppError> {
    info!("Starting stock sync");

    if let Err(e) = provider.activate().await {
        warn!("Activation signal failed (non-fatal): {}", e);
    }

    let mut report = SyncReport::default();
    let mut cursor: Option<String> = None;
    let mut page_count = 0;

    loop {
        page_count += 1;
        if page_count > max_pages {
            info!("Max pages ({}) reached, stopping fetch", max_pages);
            break;
        }

        info!("Fetching page {} (cursor: {:?})", page_count, cursor);
        let page = match provider.fetch_page(cursor.as_deref()).await {
            Ok(page) => page,
            Err(e) => {
                error!("Failed to fetch page {}: {}", page_count, e);
                report.upstream_error = Some(e.to_string());
                break;
            }
        };
        report.pages_fetched += 1;

        if page.items.is_empty() {
            info!("No items on page {}, stopping fetch", page_count);
            break;
        }

        store_quotes(repo, &page.items, &mut report).await;

        match page.next_cursor() {
            Some(next) => cursor = Some(next.to_string()),
            None => break,
        }
    }

    let count = repo.count().await.map_err(|e| {
        error!("Failed to count stocks after sync: {}", e);
        AppError::Db(e)
    })?;

    if count == 0 {
        warn!("Catalog is empty after sync, seeding fallback data");
        let seeded = seed_service::seed_catalog(repo).await.map_err(AppError::Db)?;
        report.seeded = Some(seeded);
    }

    info!(
        "Stock sync finished (pages: {}, stored: {}, failed: {}, seeded: {:?})",
        report.pages_fetched, report.stocks_stored, report.stocks_failed, report.seeded
    );

    Ok(report)
}

async fn store_quotes(repo: &dyn StockRepository, quotes: &[StockQuote], report: &mut SyncReport) {
    for (i, quote) in quotes.iter().enumerate() {
        let point = NewPricePoint::new(quote.current_price, Utc::now());
        match repo.upsert_with_history(quote, &[point]).await {
            Ok(_) => report.stocks_stored += 1,
            Err(e) => {
                error!("Error storing {}: {}", quote.symbol, e);
                report.stocks_failed += 1;
                continue;
            }
        }

        if i % 10 == 0 {
            info!("Processed {} stocks on current page", i + 1);
        }
    }
}
