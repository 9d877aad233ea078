use serde::Serialize;

use super::Stock;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub recommendation: Stock,
    pub potential_gain_percent: f64,
    pub reason: String,
}
