use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::PricePoint;

// One mirrored instrument, keyed by its ticker symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Stock {
    pub id: Uuid,
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub instrument_type: String,
    pub currency: String,
    pub current_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub open_price: f64,
    pub prev_close: f64,
    pub in_watchlist: bool,
    pub updated_at: DateTime<Utc>,
}

// Mirrors the upsert statement for the in-memory test store.
#[cfg(test)]
impl Stock {
    /// Build a fresh row from an upstream quote, as inserted the first time
    /// a symbol is seen.
    pub fn from_quote(quote: &StockQuote, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: quote.symbol.clone(),
            name: quote.name.clone(),
            instrument_type: quote.instrument_type.clone(),
            currency: quote.currency.clone(),
            current_price: quote.current_price,
            high_price: quote.high_price,
            low_price: quote.low_price,
            open_price: quote.open_price,
            prev_close: quote.prev_close,
            in_watchlist: false,
            updated_at,
        }
    }

    /// Overwrite the price snapshot only. Descriptive fields and the
    /// watchlist flag are left untouched.
    pub fn apply_snapshot(&mut self, quote: &StockQuote, updated_at: DateTime<Utc>) {
        self.current_price = quote.current_price;
        self.high_price = quote.high_price;
        self.low_price = quote.low_price;
        self.open_price = quote.open_price;
        self.prev_close = quote.prev_close;
        self.updated_at = updated_at;
    }
}

/// A single instrument as reported by the upstream listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub instrument_type: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub current_price: f64,
    #[serde(default)]
    pub high_price: f64,
    #[serde(default)]
    pub low_price: f64,
    #[serde(default)]
    pub open_price: f64,
    #[serde(default)]
    pub prev_close: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockDetail {
    pub stock: Stock,
    pub history: Vec<PricePoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetWatchlistRequest {
    pub in_watchlist: bool,
}

// ==============================================================================
// Listing filters
// ==============================================================================

#[derive(Debug, Clone, Default)]
pub struct StockFilter {
    pub search: Option<String>,
    pub watchlist_only: bool,
}

impl StockFilter {
    /// Lowercased search term, or `None` when the term is blank.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, stock: &Stock) -> bool {
        if self.watchlist_only && !stock.in_watchlist {
            return false;
        }
        match self.search_term() {
            Some(term) => {
                stock.symbol.to_lowercase().contains(&term)
                    || stock.name.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Symbol,
    Name,
    Type,
    Currency,
    CurrentPrice,
    HighPrice,
    LowPrice,
    OpenPrice,
    PrevClose,
    UpdatedAt,
}

impl SortField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "symbol" => Some(Self::Symbol),
            "name" => Some(Self::Name),
            "type" => Some(Self::Type),
            "currency" => Some(Self::Currency),
            "current_price" => Some(Self::CurrentPrice),
            "high_price" => Some(Self::HighPrice),
            "low_price" => Some(Self::LowPrice),
            "open_price" => Some(Self::OpenPrice),
            "prev_close" => Some(Self::PrevClose),
            "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    /// Column name in the `stocks` table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Symbol => "symbol",
            Self::Name => "name",
            Self::Type => "instrument_type",
            Self::Currency => "currency",
            Self::CurrentPrice => "current_price",
            Self::HighPrice => "high_price",
            Self::LowPrice => "low_price",
            Self::OpenPrice => "open_price",
            Self::PrevClose => "prev_close",
            Self::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than `desc` sorts ascending.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StockSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl StockSort {
    /// Unknown fields fall back to symbol.
    pub fn from_params(sort_by: Option<&str>, order: Option<&str>) -> Self {
        Self {
            field: sort_by.and_then(SortField::parse).unwrap_or_default(),
            direction: order.map(SortDirection::parse).unwrap_or_default(),
        }
    }
}
