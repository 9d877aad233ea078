//! In-memory `StockRepository` used by unit tests.

use std::cmp::Ordering;
use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::db::StockRepository;
use crate::models::{
    NewPricePoint, PricePoint, SortDirection, SortField, Stock, StockFilter, StockQuote, StockSort,
};

#[derive(Default)]
struct MemoryState {
    stocks: Vec<Stock>,
    prices: Vec<PricePoint>,
    next_price_id: i64,
}

#[derive(Default)]
pub struct MemoryStockRepository {
    state: Mutex<MemoryState>,
    failing_symbols: Mutex<HashSet<String>>,
}

impl MemoryStockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write for `symbol` fail, as a broken row would.
    pub fn fail_writes_for(&self, symbol: &str) {
        self.failing_symbols.lock().insert(symbol.to_string());
    }

    pub fn stocks(&self) -> Vec<Stock> {
        self.state.lock().stocks.clone()
    }

    pub fn prices_for(&self, stock_id: Uuid) -> Vec<PricePoint> {
        self.state
            .lock()
            .prices
            .iter()
            .filter(|p| p.stock_id == stock_id)
            .cloned()
            .collect()
    }

    pub fn price_count(&self) -> usize {
        self.state.lock().prices.len()
    }
}

fn compare(a: &Stock, b: &Stock, field: SortField) -> Ordering {
    let by_price = |x: f64, y: f64| x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    match field {
        SortField::Symbol => a.symbol.cmp(&b.symbol),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Type => a.instrument_type.cmp(&b.instrument_type),
        SortField::Currency => a.currency.cmp(&b.currency),
        SortField::CurrentPrice => by_price(a.current_price, b.current_price),
        SortField::HighPrice => by_price(a.high_price, b.high_price),
        SortField::LowPrice => by_price(a.low_price, b.low_price),
        SortField::OpenPrice => by_price(a.open_price, b.open_price),
        SortField::PrevClose => by_price(a.prev_close, b.prev_close),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

#[async_trait]
impl StockRepository for MemoryStockRepository {
    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Stock>, sqlx::Error> {
        Ok(self.state.lock().stocks.iter().find(|s| s.symbol == symbol).cloned())
    }

    async fn upsert_with_history(
        &self,
        quote: &StockQuote,
        points: &[NewPricePoint],
    ) -> Result<Stock, sqlx::Error> {
        if self.failing_symbols.lock().contains(&quote.symbol) {
            return Err(sqlx::Error::Protocol(format!("write rejected for {}", quote.symbol)));
        }

        let mut state = self.state.lock();
        let now = Utc::now();
        let stock = match state.stocks.iter().position(|s| s.symbol == quote.symbol) {
            Some(idx) => {
                let existing = &mut state.stocks[idx];
                existing.apply_snapshot(quote, now);
                existing.clone()
            }
            None => {
                let stock = Stock::from_quote(quote, now);
                state.stocks.push(stock.clone());
                stock
            }
        };

        for p in points {
            state.next_price_id += 1;
            let id = state.next_price_id;
            state.prices.push(PricePoint {
                id,
                stock_id: stock.id,
                price: p.price,
                recorded_at: p.recorded_at,
            });
        }

        Ok(stock)
    }

    async fn append_price_point(
        &self,
        stock_id: Uuid,
        price: f64,
        recorded_at: DateTime<Utc>,
    ) -> Result<PricePoint, sqlx::Error> {
        let mut state = self.state.lock();
        if !state.stocks.iter().any(|s| s.id == stock_id) {
            return Err(sqlx::Error::RowNotFound);
        }
        state.next_price_id += 1;
        let point = PricePoint {
            id: state.next_price_id,
            stock_id,
            price,
            recorded_at,
        };
        state.prices.push(point.clone());
        Ok(point)
    }

    async fn count(&self) -> Result<i64, sqlx::Error> {
        Ok(self.state.lock().stocks.len() as i64)
    }

    async fn list(&self, filter: &StockFilter, sort: &StockSort) -> Result<Vec<Stock>, sqlx::Error> {
        let mut stocks: Vec<Stock> = self
            .state
            .lock()
            .stocks
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();

        stocks.sort_by(|a, b| {
            let ordering = compare(a, b, sort.field);
            let ordering = match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.symbol.cmp(&b.symbol))
        });

        Ok(stocks)
    }

    async fn set_watchlist(&self, symbol: &str, value: bool) -> Result<Option<Stock>, sqlx::Error> {
        let mut state = self.state.lock();
        Ok(state.stocks.iter_mut().find(|s| s.symbol == symbol).map(|s| {
            s.in_watchlist = value;
            s.clone()
        }))
    }

    async fn toggle_watchlist(&self, symbol: &str) -> Result<Option<Stock>, sqlx::Error> {
        let mut state = self.state.lock();
        Ok(state.stocks.iter_mut().find(|s| s.symbol == symbol).map(|s| {
            s.in_watchlist = !s.in_watchlist;
            s.clone()
        }))
    }

    async fn recent_prices(&self, stock_id: Uuid, limit: i64) -> Result<Vec<PricePoint>, sqlx::Error> {
        let mut points = self.prices_for(stock_id);
        points.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
        points.truncate(limit.max(0) as usize);
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(symbol: &str, price: f64) -> StockQuote {
        StockQuote {
            symbol: symbol.to_string(),
            name: format!("{} Corp", symbol),
            instrument_type: "ad".to_string(),
            currency: "USD".to_string(),
            current_price: price,
            high_price: price + 10.0,
            low_price: price - 10.0,
            open_price: price,
            prev_close: price,
        }
    }

    #[tokio::test]
    async fn test_upsert_same_symbol_twice_keeps_one_row() {
        let repo = MemoryStockRepository::new();
        let now = Utc::now();

        let first = repo
            .upsert_with_history(&quote("AAPL", 100.0), &[NewPricePoint::new(100.0, now)])
            .await
            .unwrap();
        let second = repo
            .upsert_with_history(&quote("AAPL", 120.0), &[NewPricePoint::new(120.0, now)])
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(second.current_price, 120.0);
        assert_eq!(repo.prices_for(first.id).len(), 2);
    }

    #[tokio::test]
    async fn test_list_sorts_descending_by_price() {
        let repo = MemoryStockRepository::new();
        for (symbol, price) in [("AAA", 10.0), ("BBB", 30.0), ("CCC", 20.0)] {
            repo.upsert_with_history(&quote(symbol, price), &[]).await.unwrap();
        }

        let sort = StockSort::from_params(Some("current_price"), Some("desc"));
        let stocks = repo.list(&StockFilter::default(), &sort).await.unwrap();
        let symbols: Vec<&str> = stocks.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BBB", "CCC", "AAA"]);
    }

    #[tokio::test]
    async fn test_append_price_point_requires_known_stock() {
        let repo = MemoryStockRepository::new();
        let stock = repo.upsert_with_history(&quote("AAPL", 100.0), &[]).await.unwrap();

        let point = repo.append_price_point(stock.id, 101.5, Utc::now()).await.unwrap();
        assert_eq!(point.stock_id, stock.id);
        assert_eq!(repo.recent_prices(stock.id, 50).await.unwrap(), vec![point]);

        assert!(repo.append_price_point(Uuid::new_v4(), 1.0, Utc::now()).await.is_err());
    }
}
