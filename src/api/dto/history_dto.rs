//! History listing DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{GenerationId, GenerationRecord};

/// Query parameters for `GET /api/history`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// Return only the last `limit` records. Defaults to all retained.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// One history record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryDto {
    /// Record identifier.
    pub id: GenerationId,
    /// Prompt sent upstream.
    pub prompt: String,
    /// Model used.
    pub model: String,
    /// Length of the generated HTML in characters.
    pub html_length: usize,
    /// Generated HTML document.
    pub html: String,
    /// Generation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<GenerationRecord> for HistoryEntryDto {
    fn from(record: GenerationRecord) -> Self {
        Self {
            id: record.id,
            prompt: record.prompt,
            model: record.model,
            html_length: record.html_length,
            html: record.generated_markup,
            created_at: record.created_at,
        }
    }
}

/// Response body for `GET /api/history`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    /// Records, oldest first.
    pub history: Vec<HistoryEntryDto>,
    /// Number of retained records.
    pub total: usize,
    /// Maximum number of retained records.
    pub capacity: usize,
}
