//! OpenAPI document and Swagger UI mounting.

use axum::Router;
use utoipa::OpenApi;

use crate::api::dto::{
    GenerateRequest, GenerateResponse, HistoryEntryDto, HistoryResponse, ModelsResponse,
    RandomPromptResponse,
};
use crate::api::handlers::{generate, history, pages, system};
use crate::app_state::AppState;
use crate::error::{ErrorBody, ErrorResponse};
use crate::rate_limit::{BackendStatus, RateLimitStatus, StorageKind};

/// OpenAPI description of every HTTP endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "dynui-gateway",
        description = "Generates a fresh LLM-built web page on every request."
    ),
    paths(
        pages::random_page,
        pages::admin_page,
        generate::generate,
        generate::random_prompt,
        history::list_history,
        system::models_handler,
        system::health_handler,
    ),
    components(schemas(
        GenerateRequest,
        GenerateResponse,
        RandomPromptResponse,
        ModelsResponse,
        HistoryEntryDto,
        HistoryResponse,
        system::HealthResponse,
        RateLimitStatus,
        BackendStatus,
        StorageKind,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Pages", description = "HTML pages"),
        (name = "Generation", description = "UI generation and history"),
        (name = "System", description = "Health and model catalog"),
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/swagger-ui` backed by `/api-docs/openapi.json`.
#[cfg(feature = "swagger-ui")]
pub fn routes() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

/// Without the `swagger-ui` feature no documentation routes are mounted.
#[cfg(not(feature = "swagger-ui"))]
pub fn routes() -> Router<AppState> {
    Router::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_endpoint() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/admin",
            "/api/generate",
            "/api/random-prompt",
            "/api/history",
            "/api/models",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
