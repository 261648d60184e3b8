//! Custom generation and random-prompt handlers.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{GenerateRequest, GenerateResponse, RandomPromptResponse};
use crate::app_state::AppState;
use crate::domain::prompt_library;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /api/generate`: Generate a page from a custom prompt.
///
/// # Errors
///
/// Returns [`GatewayError`] on a malformed body, invalid parameters, or
/// upstream failure.
#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "Generation",
    summary = "Generate a page",
    description = "Sends the prompt to the selected upstream model and returns the extracted HTML document. \
        Successful generations are appended to the history.",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Page generated", body = GenerateResponse),
        (status = 400, description = "Invalid prompt, model, or temperature", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Upstream API key not configured", body = ErrorResponse),
        (status = 502, description = "Upstream rejected credentials", body = ErrorResponse),
        (status = 503, description = "Upstream call failed", body = ErrorResponse),
        (status = 504, description = "Upstream timed out", body = ErrorResponse),
    )
)]
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(req) = payload.map_err(|rejection| GatewayError::InvalidRequest(rejection.body_text()))?;

    let record = state.generation_service.generate(req.into()).await?;

    Ok(Json(GenerateResponse::from(record)))
}

/// `GET /api/random-prompt`: One of the built-in UI ideas.
#[utoipa::path(
    get,
    path = "/api/random-prompt",
    tag = "Generation",
    summary = "Random prompt",
    description = "Returns a random prompt from the built-in library without generating anything.",
    responses(
        (status = 200, description = "Random prompt", body = RandomPromptResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
    )
)]
pub async fn random_prompt() -> impl IntoResponse {
    Json(RandomPromptResponse {
        prompt: prompt_library::random_prompt().to_string(),
    })
}

/// Generation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/random-prompt", get(random_prompt))
}
