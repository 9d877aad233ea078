pub mod price_queries;
pub mod repository;
pub mod stock_queries;

#[cfg(test)]
pub mod memory;

pub use repository::{PgStockRepository, StockRepository};
