use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::db::{price_queries, stock_queries};
use crate::models::{NewPricePoint, PricePoint, Stock, StockFilter, StockQuote, StockSort};

/// Storage operations over stocks and their price history.
///
/// Everything that touches persistence goes through this trait, so the sync
/// engine and the HTTP handlers can be exercised against an in-memory
/// store in tests.
#[async_trait]
pub trait StockRepository: Send + Sync {
    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Stock>, sqlx::Error>;

    /// Upsert the stock described by `quote` and append `points` to its
    /// history, atomically: either the snapshot and every point are
    /// stored, or nothing is.
    async fn upsert_with_history(
        &self,
        quote: &StockQuote,
        points: &[NewPricePoint],
    ) -> Result<Stock, sqlx::Error>;

    async fn append_price_point(
        &self,
        stock_id: Uuid,
        price: f64,
        recorded_at: DateTime<Utc>,
    ) -> Result<PricePoint, sqlx::Error>;

    async fn count(&self) -> Result<i64, sqlx::Error>;

    async fn list(&self, filter: &StockFilter, sort: &StockSort) -> Result<Vec<Stock>, sqlx::Error>;

    async fn set_watchlist(&self, symbol: &str, value: bool) -> Result<Option<Stock>, sqlx::Error>;

    async fn toggle_watchlist(&self, symbol: &str) -> Result<Option<Stock>, sqlx::Error>;

    /// Most recent samples first.
    async fn recent_prices(&self, stock_id: Uuid, limit: i64) -> Result<Vec<PricePoint>, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgStockRepository {
    pool: PgPool,
}

impl PgStockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StockRepository for PgStockRepository {
    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Stock>, sqlx::Error> {
        stock_queries::find_by_symbol(&self.pool, symbol).await
    }

    async fn upsert_with_history(
        &self,
        quote: &StockQuote,
        points: &[NewPricePoint],
    ) -> Result<Stock, sqlx::Error> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin transaction for {}: {}", quote.symbol, e);
            e
        })?;

        let stock = stock_queries::upsert(&mut *tx, quote, Utc::now()).await?;

        for p in points {
            price_queries::insert(&mut *tx, stock.id, p.price, p.recorded_at).await?;
        }

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction for {}: {}", quote.symbol, e);
            e
        })?;

        Ok(stock)
    }

    async fn append_price_point(
        &self,
        stock_id: Uuid,
        price: f64,
        recorded_at: DateTime<Utc>,
    ) -> Result<PricePoint, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        price_queries::insert(&mut *conn, stock_id, price, recorded_at).await
    }

    async fn count(&self) -> Result<i64, sqlx::Error> {
        stock_queries::count(&self.pool).await
    }

    async fn list(&self, filter: &StockFilter, sort: &StockSort) -> Result<Vec<Stock>, sqlx::Error> {
        stock_queries::list(&self.pool, filter, sort).await
    }

    async fn set_watchlist(&self, symbol: &str, value: bool) -> Result<Option<Stock>, sqlx::Error> {
        stock_queries::set_watchlist(&self.pool, symbol, value).await
    }

    async fn toggle_watchlist(&self, symbol: &str) -> Result<Option<Stock>, sqlx::Error> {
        stock_queries::toggle_watchlist(&self.pool, symbol).await
    }

    async fn recent_prices(&self, stock_id: Uuid, limit: i64) -> Result<Vec<PricePoint>, sqlx::Error> {
        price_queries::fetch_recent(&self.pool, stock_id, limit).await
    }
}
