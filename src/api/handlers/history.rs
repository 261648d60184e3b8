//! Generation history handler.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{HistoryEntryDto, HistoryParams, HistoryResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /api/history`: Past generations, oldest first.
#[utoipa::path(
    get,
    path = "/api/history",
    tag = "Generation",
    summary = "Generation history",
    description = "Returns the retained generation records in insertion order. \
        `limit` keeps only the most recent records.",
    params(HistoryParams),
    responses(
        (status = 200, description = "Retained history", body = HistoryResponse),
        (status = 400, description = "Malformed query string", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
    )
)]
pub async fn list_history(
    State(state): State<AppState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<HistoryResponse>, GatewayError> {
    let Query(params) =
        params.map_err(|rejection| GatewayError::InvalidRequest(rejection.body_text()))?;

    let store = state.generation_service.history();
    let records = match params.limit {
        Some(limit) => store.recent(limit).await,
        None => store.snapshot().await,
    };
    let total = store.len().await;

    Ok(Json(HistoryResponse {
        history: records.into_iter().map(HistoryEntryDto::from).collect(),
        total,
        capacity: store.capacity(),
    }))
}

/// History routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/history", get(list_history))
}
