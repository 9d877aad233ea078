use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Represents one historical price sample for a stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PricePoint {
    pub id: i64,
    pub stock_id: Uuid,
    pub price: f64,
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
}

/// A price sample that has not been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewPricePoint {
    pub price: f64,
    pub recorded_at: DateTime<Utc>,
}

impl NewPricePoint {
    pub fn new(price: f64, recorded_at: DateTime<Utc>) -> Self {
        Self { price, recorded_at }
    }
}
