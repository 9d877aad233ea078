use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::PricePoint;

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

pub async fn insert(
    conn: &mut PgConnection,
    stock_id: Uuid,
    price: f64,
    recorded_at: DateTime<Utc>,
) -> Result<PricePoint, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        r#"
        INSERT INTO stock_prices (stock_id, price, recorded_at)
        VALUES ($1, $2, $3)
        RETURNING id, stock_id, price, recorded_at
        "#,
    )
    .bind(stock_id)
    .bind(price)
    .bind(recorded_at)
    .fetch_one(&mut *conn)
    .await
}

/// Fetch the most recent `limit` samples for a stock, newest first.
pub async fn fetch_recent(
    pool: &PgPool,
    stock_id: Uuid,
    limit: i64,
) -> Result<Vec<PricePoint>, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        r#"
        SELECT id, stock_id, price, recorded_at
        FROM stock_prices
        WHERE stock_id = $1
        ORDER BY recorded_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(stock_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
