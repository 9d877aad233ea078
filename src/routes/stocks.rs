use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::{SetWatchlistRequest, Stock, StockDetail, StockFilter, StockSort};
use crate::services::stock_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stocks))
        .route("/:symbol", get(get_stock_detail))
        .route(
            "/:symbol/watchlist",
            axum::routing::post(toggle_watchlist).put(set_watchlist),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct StockListParams {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub watchlist: Option<String>,
}

impl StockListParams {
    fn filter(&self) -> StockFilter {
        StockFilter {
            search: self.search.clone(),
            watchlist_only: self.watchlist.as_deref() == Some("true"),
        }
    }

    fn sort(&self) -> StockSort {
        StockSort::from_params(self.sort_by.as_deref(), self.order.as_deref())
    }
}

pub async fn list_stocks(
    State(state): State<AppState>,
    Query(params): Query<StockListParams>,
) -> Result<Json<Vec<Stock>>, AppError> {
    info!("GET /stocks - {:?}", params);
    let stocks =
        stock_service::list_stocks(state.repo.as_ref(), &params.filter(), &params.sort()).await?;
    Ok(Json(stocks))
}

pub async fn get_stock_detail(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StockDetail>, AppError> {
    info!("GET /stocks/{} - Getting stock detail", symbol);
    let detail = stock_service::get_stock_detail(state.repo.as_ref(), &symbol).await?;
    Ok(Json(detail))
}

pub async fn toggle_watchlist(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Stock>, AppError> {
    info!("POST /stocks/{}/watchlist - Toggling watchlist", symbol);
    let stock = stock_service::toggle_watchlist(state.repo.as_ref(), &symbol).await?;
    Ok(Json(stock))
}

pub async fn set_watchlist(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<SetWatchlistRequest>,
) -> Result<Json<Stock>, AppError> {
    info!("PUT /stocks/{}/watchlist - in_watchlist={}", symbol, req.in_watchlist);
    let stock = stock_service::set_watchlist(state.repo.as_ref(), &symbol, req.in_watchlist).await?;
    Ok(Json(stock))
}
