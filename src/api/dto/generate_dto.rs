//! Generation request/response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{GenerationId, GenerationRecord};
use crate::service::GenerateParams;

/// Request body for `POST /api/generate`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// Description of the UI to build.
    pub prompt: String,
    /// Upstream model; defaults to the first configured model.
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature in `[0.0, 2.0]`; defaults to 0.8.
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl From<GenerateRequest> for GenerateParams {
    fn from(req: GenerateRequest) -> Self {
        Self {
            prompt: req.prompt,
            model: req.model,
            temperature: req.temperature,
        }
    }
}

/// Response body for `POST /api/generate`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    /// Generated HTML document.
    pub html: String,
    /// Prompt the page was generated from.
    pub prompt: String,
    /// Model that produced the page.
    pub model: String,
    /// Length of `html` in characters.
    pub html_length: usize,
    /// History record identifier.
    pub generation_id: GenerationId,
    /// Generation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<GenerationRecord> for GenerateResponse {
    fn from(record: GenerationRecord) -> Self {
        Self {
            html: record.generated_markup,
            prompt: record.prompt,
            model: record.model,
            html_length: record.html_length,
            generation_id: record.id,
            created_at: record.created_at,
        }
    }
}

/// Response body for `GET /api/random-prompt`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RandomPromptResponse {
    /// One of the built-in UI ideas.
    pub prompt: String,
}

/// Response body for `GET /api/models`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ModelsResponse {
    /// Model identifiers in configured order.
    pub models: Vec<String>,
    /// Model used when a request names none.
    pub default: String,
}
