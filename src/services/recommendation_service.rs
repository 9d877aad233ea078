use crate::db::StockRepository;
use crate::errors::AppError;
use crate::models::{Recommendation, Stock, StockFilter, StockSort};

pub const RECOMMENDATION_REASON: &str = "Highest potential upside to 52-week high";

/// Headroom between the current price and the observed high, as a
/// fraction of the current price. `None` for stocks that carry no signal:
/// non-positive price, or a flat high/low range.
pub fn upside_score(stock: &Stock) -> Option<f64> {
    if stock.current_price <= 0.0 || stock.high_price == stock.low_price {
        return None;
    }
    Some((stock.high_price - stock.current_price) / stock.current_price)
}

/// Pick the stock with the largest upside score. Ties keep the earlier
/// stock. Returns `None` when no stock qualifies, including an empty input.
pub fn best_opportunity(stocks: &[Stock]) -> Option<Recommendation> {
    let mut best: Option<(&Stock, f64)> = None;

    for stock in stocks {
        let Some(score) = upside_score(stock) else {
            continue;
        };
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((stock, score)),
        }
    }

    best.map(|(stock, score)| Recommendation {
        recommendation: stock.clone(),
        potential_gain_percent: score * 100.0,
        reason: RECOMMENDATION_REASON.to_string(),
    })
}

pub async fn get_recommendation(
    repo: &dyn StockRepository,
) -> Result<Option<Recommendation>, AppError> {
    let stocks = repo.list(&StockFilter::default(), &StockSort::default()).await?;
    Ok(best_opportunity(&stocks))
}
