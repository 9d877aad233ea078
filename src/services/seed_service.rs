use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tracing::{error, info};

use crate::db::StockRepository;
use crate::models::{NewPricePoint, StockQuote};

/// Backfilled samples per seeded stock, one per hour ending at "now".
pub const SEED_HISTORY_POINTS: i64 = 11;
const SEED_STEP: f64 = 1.5;
const SEED_PRICE_FLOOR: f64 = 10.0;

// (symbol, name, current, high, low, open, prev_close)
const SEED_CATALOG: [(&str, &str, f64, f64, f64, f64, f64); 10] = [
    ("AAPL", "Apple Inc.", 185.92, 199.62, 164.08, 184.22, 183.63),
    ("MSFT", "Microsoft Corp.", 402.56, 410.22, 380.12, 400.10, 398.45),
    ("GOOGL", "Alphabet Inc.", 145.32, 155.00, 130.45, 144.10, 146.20),
    ("AMZN", "Amazon.com Inc.", 172.44, 180.12, 150.34, 170.15, 171.22),
    ("NVDA", "NVIDIA Corp.", 726.13, 750.00, 600.00, 715.00, 710.15),
    ("TSLA", "Tesla Inc.", 191.59, 215.00, 175.45, 190.00, 188.12),
    ("META", "Meta Platforms Inc.", 473.32, 485.96, 450.12, 470.00, 468.10),
    ("NFLX", "Netflix Inc.", 580.12, 600.00, 550.00, 575.00, 578.00),
    ("AMD", "Advanced Micro Devices", 175.44, 185.00, 160.00, 170.00, 172.00),
    ("PYPL", "PayPal Holdings", 62.15, 75.00, 55.00, 60.00, 61.50),
];

pub fn seed_quotes() -> Vec<StockQuote> {
    SEED_CATALOG
        .iter()
        .map(|&(symbol, name, current, high, low, open, prev_close)| StockQuote {
            symbol: symbol.to_string(),
            name: name.to_string(),
            instrument_type: "ad".to_string(),
            currency: "USD".to_string(),
            current_price: current,
            high_price: high,
            low_price: low,
            open_price: open,
            prev_close,
        })
        .collect()
}

/// Synthetic hourly history ending at `now`, oldest first. Each sample is
/// `current - 1.5 * hours_before_now`, never below 10.0.
pub fn backfill_history(current_price: f64, now: DateTime<Utc>) -> Vec<NewPricePoint> {
    (0..SEED_HISTORY_POINTS)
        .rev()
        .map(|steps| {
            let price = (current_price - SEED_STEP * steps as f64).max(SEED_PRICE_FLOOR);
            NewPricePoint::new(price, now - ChronoDuration::hours(steps))
        })
        .collect()
}

/// Write the fixed catalog with backfilled history.
///
/// Each stock is stored in its own transaction; a failing entry is logged
/// and skipped. Returns how many stocks were written, or the last storage
/// error when none could be.
pub async fn seed_catalog(repo: &dyn StockRepository) -> Result<usize, sqlx::Error> {
    info!("Seeding fallback stock catalog");

    let now = Utc::now();
    let mut seeded = 0;
    let mut last_error = None;

    for quote in seed_quotes() {
        let history = backfill_history(quote.current_price, now);
        match repo.upsert_with_history(&quote, &history).await {
            Ok(stock) => {
                seeded += 1;
                info!("Seeded {} with {} history points", stock.symbol, history.len());
            }
            Err(e) => {
                error!("Failed to seed {}: {}", quote.symbol, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if seeded == 0 => Err(e),
        _ => {
            info!("Seeding completed ({} stocks)", seeded);
            Ok(seeded)
        }
    }
}
