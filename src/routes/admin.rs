use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::services::seed_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(seed_catalog))
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub seeded: usize,
}

/// GET /api/seed
///
/// Writes the fallback catalog regardless of what is already stored.
pub async fn seed_catalog(State(state): State<AppState>) -> Result<Json<SeedResponse>, AppError> {
    info!("GET /seed - Seeding fallback catalog");

    let seeded = seed_service::seed_catalog(state.repo.as_ref())
        .await
        .map_err(|e| {
            error!("Failed to seed catalog: {}", e);
            AppError::Db(e)
        })?;

    Ok(Json(SeedResponse {
        message: "Database seeded successfully with dummy data".to_string(),
        seeded,
    }))
}
