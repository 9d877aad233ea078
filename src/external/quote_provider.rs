use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::models::StockQuote;

/// One page of the upstream listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuotePage {
    #[serde(default)]
    pub items: Vec<StockQuote>,
    #[serde(default)]
    pub next_page: Option<String>,
}

impl QuotePage {
    /// Cursor for the following page; `None` once the listing is exhausted.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_page.as_deref().filter(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Error)]
pub enum QuoteProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status: {0}")]
    BadStatus(u16),

    #[error("parse error: {0}")]
    Parse(String),
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Best-effort activation signal sent before a sync. A rejected signal
    /// is only logged; `Err` means the request could not be sent at all.
    async fn activate(&self) -> Result<(), QuoteProviderError>;

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<QuotePage, QuoteProviderError>;
}
