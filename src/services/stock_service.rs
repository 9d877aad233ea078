use tracing::error;

use crate::db::price_queries::DEFAULT_HISTORY_LIMIT;
use crate::db::StockRepository;
use crate::errors::AppError;
use crate::models::{Stock, StockDetail, StockFilter, StockSort};

fn not_found(symbol: &str) -> AppError {
    AppError::NotFound(format!("Stock not found: {}", symbol))
}

pub async fn list_stocks(
    repo: &dyn StockRepository,
    filter: &StockFilter,
    sort: &StockSort,
) -> Result<Vec<Stock>, AppError> {
    repo.list(filter, sort).await.map_err(|e| {
        error!("Failed to list stocks: {}", e);
        AppError::Db(e)
    })
}

pub async fn get_stock_detail(
    repo: &dyn StockRepository,
    symbol: &str,
) -> Result<StockDetail, AppError> {
    let stock = repo
        .find_by_symbol(symbol)
        .await?
        .ok_or_else(|| not_found(symbol))?;

    let history = repo
        .recent_prices(stock.id, DEFAULT_HISTORY_LIMIT)
        .await
        .map_err(|e| {
            error!("Failed to fetch price history for {}: {}", symbol, e);
            AppError::Db(e)
        })?;

    Ok(StockDetail { stock, history })
}

pub async fn toggle_watchlist(repo: &dyn StockRepository, symbol: &str) -> Result<Stock, AppError> {
    repo.toggle_watchlist(symbol)
        .await?
        .ok_or_else(|| not_found(symbol))
}

pub async fn set_watchlist(
    repo: &dyn StockRepository,
    symbol: &str,
    value: bool,
) -> Result<Stock, AppError> {
    repo.set_watchlist(symbol, value)
        .await?
        .ok_or_else(|| not_found(symbol))
}
