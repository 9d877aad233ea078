use std::sync::Arc;

use crate::db::StockRepository;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn StockRepository>,
}

impl AppState {
    pub fn new(repo: Arc<dyn StockRepository>) -> Self {
        Self { repo }
    }
}
