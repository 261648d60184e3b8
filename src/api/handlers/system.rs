//! System endpoints: health check and model catalog.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::ModelsResponse;
use crate::app_state::AppState;
use crate::error::ErrorResponse;
use crate::rate_limit::RateLimitStatus;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,
    /// RFC 3339 server time.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Whether an upstream API key is configured.
    pub api_key_configured: bool,
    /// Number of successful generations since startup.
    pub total_generated: u64,
    /// Rate limiter configuration and backend health.
    pub rate_limiting: RateLimitStatus,
}

/// `GET /health`: Service health status.
///
/// Never contacts the upstream API.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health, version, generation count and rate-limit backend status. \
        Independent of upstream API availability.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let service = &state.generation_service;
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            api_key_configured: service.api_key_configured(),
            total_generated: service.history().total_appended(),
            rate_limiting: state.rate_limiter.status().await,
        }),
    )
}

/// `GET /api/models`: Models clients may request.
#[utoipa::path(
    get,
    path = "/api/models",
    tag = "System",
    summary = "List models",
    description = "Returns the configured upstream model identifiers; the first is the default.",
    responses(
        (status = 200, description = "Model catalog", body = ModelsResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
    )
)]
pub async fn models_handler(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.generation_service.catalog();
    Json(ModelsResponse {
        models: catalog.models().to_vec(),
        default: catalog.default_model().to_string(),
    })
}

/// Rate-limited system routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/models", get(models_handler))
}

/// System routes served without rate limiting.
pub fn open_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
