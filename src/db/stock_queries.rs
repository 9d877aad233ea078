use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{SortField, Stock, StockFilter, StockQuote, StockSort};

const STOCK_COLUMNS: &str = "id, symbol, name, instrument_type, currency, \
     current_price, high_price, low_price, open_price, prev_close, \
     in_watchlist, updated_at";

pub async fn find_by_symbol(
    pool: &PgPool,
    symbol: &str,
) -> Result<Option<Stock>, sqlx::Error> {
    sqlx::query_as::<_, Stock>(&format!(
        "SELECT {STOCK_COLUMNS} FROM stocks WHERE symbol = $1"
    ))
    .bind(symbol)
    .fetch_optional(pool)
    .await
}

/// Insert a new stock or overwrite the price snapshot of an existing one.
///
/// A single `INSERT ... ON CONFLICT` statement, so two concurrent syncs
/// can never create two rows for the same symbol. On conflict only the
/// snapshot columns and `updated_at` change; name, type, currency and the
/// watchlist flag keep their stored values.
pub async fn upsert(
    conn: &mut PgConnection,
    quote: &StockQuote,
    updated_at: DateTime<Utc>,
) -> Result<Stock, sqlx::Error> {
    sqlx::query_as::<_, Stock>(&format!(
        r#"
        INSERT INTO stocks (id, symbol, name, instrument_type, currency,
                            current_price, high_price, low_price, open_price, prev_close,
                            in_watchlist, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, FALSE, $11)
        ON CONFLICT (symbol) DO UPDATE SET
            current_price = EXCLUDED.current_price,
            high_price = EXCLUDED.high_price,
            low_price = EXCLUDED.low_price,
            open_price = EXCLUDED.open_price,
            prev_close = EXCLUDED.prev_close,
            updated_at = EXCLUDED.updated_at
        RETURNING {STOCK_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&quote.symbol)
    .bind(&quote.name)
    .bind(&quote.instrument_type)
    .bind(&quote.currency)
    .bind(quote.current_price)
    .bind(quote.high_price)
    .bind(quote.low_price)
    .bind(quote.open_price)
    .bind(quote.prev_close)
    .bind(updated_at)
    .fetch_one(&mut *conn)
    .await
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stocks")
        .fetch_one(pool)
        .await
}

pub async fn list(
    pool: &PgPool,
    filter: &StockFilter,
    sort: &StockSort,
) -> Result<Vec<Stock>, sqlx::Error> {
    let mut query_builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {STOCK_COLUMNS} FROM stocks WHERE TRUE"));

    if let Some(term) = filter.search_term() {
        let pattern = format!("%{}%", escape_like(&term));
        query_builder.push(" AND (LOWER(symbol) LIKE ");
        query_builder.push_bind(pattern.clone());
        query_builder.push(" OR LOWER(name) LIKE ");
        query_builder.push_bind(pattern);
        query_builder.push(")");
    }

    if filter.watchlist_only {
        query_builder.push(" AND in_watchlist = TRUE");
    }

    // Column names come from the SortField whitelist, never from the request.
    query_builder.push(" ORDER BY ");
    query_builder.push(sort.field.column());
    query_builder.push(" ");
    query_builder.push(sort.direction.sql());
    if sort.field != SortField::Symbol {
        query_builder.push(", symbol ASC");
    }

    query_builder
        .build_query_as::<Stock>()
        .fetch_all(pool)
        .await
}

pub async fn set_watchlist(
    pool: &PgPool,
    symbol: &str,
    value: bool,
) -> Result<Option<Stock>, sqlx::Error> {
    sqlx::query_as::<_, Stock>(&format!(
        "UPDATE stocks SET in_watchlist = $2 WHERE symbol = $1 RETURNING {STOCK_COLUMNS}"
    ))
    .bind(symbol)
    .bind(value)
    .fetch_optional(pool)
    .await
}

pub async fn toggle_watchlist(
    pool: &PgPool,
    symbol: &str,
) -> Result<Option<Stock>, sqlx::Error> {
    sqlx::query_as::<_, Stock>(&format!(
        "UPDATE stocks SET in_watchlist = NOT in_watchlist WHERE symbol = $1 RETURNING {STOCK_COLUMNS}"
    ))
    .bind(symbol)
    .fetch_optional(pool)
    .await
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
