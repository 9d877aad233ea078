//! Scripted `QuoteProvider` for sync and scheduler tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::external::quote_provider::{QuotePage, QuoteProvider, QuoteProviderError};
use crate::models::StockQuote;

enum Script {
    Pages(VecDeque<Result<QuotePage, QuoteProviderError>>),
    Endless,
}

pub struct ScriptedProvider {
    script: Mutex<Script>,
    activations: AtomicUsize,
    fetches: AtomicUsize,
    cursors: Mutex<Vec<Option<String>>>,
}

impl ScriptedProvider {
    fn with_script(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            activations: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            cursors: Mutex::new(Vec::new()),
        }
    }

    /// Serves the given responses in order, then empty pages.
    pub fn pages(pages: Vec<Result<QuotePage, QuoteProviderError>>) -> Self {
        Self::with_script(Script::Pages(pages.into()))
    }

    /// Every fetch fails as if the upstream were unreachable.
    pub fn unreachable() -> Self {
        Self::pages(
            (0..100)
                .map(|_| Err(QuoteProviderError::Network("connection refused".to_string())))
                .collect(),
        )
    }

    /// Every page has one fresh quote and a non-empty cursor.
    pub fn endless() -> Self {
        Self::with_script(Script::Endless)
    }

    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().clone()
    }
}

pub fn quote(symbol: &str, current: f64, high: f64, low: f64) -> StockQuote {
    StockQuote {
        symbol: symbol.to_string(),
        name: format!("{} Inc.", symbol),
        instrument_type: "ad".to_string(),
        currency: "USD".to_string(),
        current_price: current,
        high_price: high,
        low_price: low,
        open_price: current,
        prev_close: current,
    }
}

pub fn page(items: Vec<StockQuote>, next_page: &str) -> QuotePage {
    QuotePage {
        items,
        next_page: Some(next_page.to_string()),
    }
}

#[async_trait]
impl QuoteProvider for ScriptedProvider {
    async fn activate(&self) -> Result<(), QuoteProviderError> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<QuotePage, QuoteProviderError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst);
        self.cursors.lock().push(cursor.map(String::from));

        match &mut *self.script.lock() {
            Script::Pages(pages) => pages.pop_front().unwrap_or_else(|| Ok(QuotePage::default())),
            Script::Endless => {
                let symbol = format!("SYM{}", n);
                Ok(page(vec![quote(&symbol, 50.0, 60.0, 40.0)], &symbol))
            }
        }
    }
}
