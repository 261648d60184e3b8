//! One logged prompt/response pair.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::GenerationId;

/// A successful generation as kept in the history log.
///
/// Records are created once by the generation service and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRecord {
    /// Unique record identifier.
    pub id: GenerationId,

    /// Prompt sent to the upstream model.
    pub prompt: String,

    /// Model identifier used for the completion.
    pub model: String,

    /// Extracted HTML document returned to the client.
    pub generated_markup: String,

    /// Length of `generated_markup` in characters.
    pub html_length: usize,

    /// Time the record was created.
    pub created_at: DateTime<Utc>,
}

impl GenerationRecord {
    /// Creates a record stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(prompt: String, model: String, generated_markup: String) -> Self {
        let html_length = generated_markup.chars().count();
        Self {
            id: GenerationId::new(),
            prompt,
            model,
            generated_markup,
            html_length,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_length_counts_characters_not_bytes() {
        let record = GenerationRecord::new(
            "p".to_string(),
            "m".to_string(),
            "<p>café 🙈</p>".to_string(),
        );
        assert_eq!(record.html_length, 13);
    }
}
