use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use crate::errors::AppError;
use crate::services::recommendation_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_recommendation))
}

/// GET /api/recommendation
///
/// The stock with the largest upside to its observed high, or a
/// `{"message": ...}` body when nothing qualifies.
pub async fn get_recommendation(State(state): State<AppState>) -> Result<Response, AppError> {
    info!("GET /recommendation - Computing best opportunity");
    let response = match recommendation_service::get_recommendation(state.repo.as_ref()).await? {
        Some(rec) => Json(rec).into_response(),
        None => Json(json!({ "message": "No stocks available" })).into_response(),
    };
    Ok(response)
}
