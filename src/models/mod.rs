mod price_point;
mod recommendation;
mod stock;

pub use price_point::{NewPricePoint, PricePoint};
pub use recommendation::Recommendation;
pub use stock::{
    SetWatchlistRequest, SortDirection, SortField, Stock, StockDetail, StockFilter, StockQuote,
    StockSort,
};
