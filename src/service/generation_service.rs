//! Generation service: validates, calls upstream, records history.

use std::sync::Arc;

use crate::domain::prompt_library::{self, SYSTEM_PROMPT};
use crate::domain::{GenerationRecord, HistoryStore, ModelCatalog};
use crate::error::GatewayError;
use crate::upstream::{CompletionClient, CompletionRequest, extract_markup};

/// Temperature used when the client does not send one.
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

/// Accepted temperature range (inclusive).
pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 2.0);

/// Longest accepted prompt, in characters.
pub const MAX_PROMPT_CHARS: usize = 8000;

/// Validated-on-use parameters for one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateParams {
    /// UI description.
    pub prompt: String,
    /// Requested model; `None` selects the catalog default.
    pub model: Option<String>,
    /// Sampling temperature; `None` selects [`DEFAULT_TEMPERATURE`].
    pub temperature: Option<f32>,
}

/// Orchestration layer for UI generation.
///
/// Every generation follows the pattern: validate → call upstream →
/// extract markup → append history → return the record.
#[derive(Debug, Clone)]
pub struct GenerationService {
    client: Arc<dyn CompletionClient>,
    history: Arc<HistoryStore>,
    catalog: ModelCatalog,
}

impl GenerationService {
    /// Creates a new `GenerationService`.
    #[must_use]
    pub fn new(
        client: Arc<dyn CompletionClient>,
        history: Arc<HistoryStore>,
        catalog: ModelCatalog,
    ) -> Self {
        Self {
            client,
            history,
            catalog,
        }
    }

    /// Returns a reference to the inner [`HistoryStore`].
    #[must_use]
    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Returns the model catalog.
    #[must_use]
    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Returns `true` if the upstream client has credentials.
    #[must_use]
    pub fn api_key_configured(&self) -> bool {
        self.client.is_configured()
    }

    /// Generates a page for a client-supplied prompt.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EmptyPrompt`], [`GatewayError::InvalidRequest`]
    /// or [`GatewayError::UnknownModel`] on invalid input, and the client's
    /// error when the upstream call or markup extraction fails.
    pub async fn generate(&self, params: GenerateParams) -> Result<GenerationRecord, GatewayError> {
        let prompt = params.prompt.trim();
        if prompt.is_empty() {
            return Err(GatewayError::EmptyPrompt);
        }
        if prompt.chars().count() > MAX_PROMPT_CHARS {
            return Err(GatewayError::InvalidRequest(format!(
                "prompt exceeds {MAX_PROMPT_CHARS} characters"
            )));
        }
        let model = self.catalog.resolve(params.model.as_deref())?;
        let temperature = validate_temperature(params.temperature.unwrap_or(DEFAULT_TEMPERATURE))?;

        self.run(prompt.to_string(), model, temperature).await
    }

    /// Generates a page from a random library prompt and random model.
    ///
    /// # Errors
    ///
    /// Returns the client's error when the upstream call or markup
    /// extraction fails.
    pub async fn generate_random(&self) -> Result<GenerationRecord, GatewayError> {
        let prompt = prompt_library::random_prompt().to_string();
        let model = self.catalog.random().to_string();
        self.run(prompt, model, DEFAULT_TEMPERATURE).await
    }

    async fn run(
        &self,
        prompt: String,
        model: String,
        temperature: f32,
    ) -> Result<GenerationRecord, GatewayError> {
        let preview: String = prompt.chars().take(50).collect();
        tracing::info!(%model, temperature, prompt = %preview, "generating UI");

        let completion = self
            .client
            .complete(CompletionRequest {
                model: model.clone(),
                system_prompt: SYSTEM_PROMPT.to_string(),
                user_prompt: prompt.clone(),
                temperature,
            })
            .await
            .inspect_err(|e| tracing::error!(error = %e, %model, "upstream completion failed"))?;

        let markup = extract_markup(&completion)?;
        let record = GenerationRecord::new(prompt, model, markup);
        tracing::info!(
            generation_id = %record.id,
            model = %record.model,
            html_length = record.html_length,
            "UI generated"
        );

        let _ = self.history.append(record.clone()).await;
        Ok(record)
    }
}

fn validate_temperature(temperature: f32) -> Result<f32, GatewayError> {
    let (min, max) = TEMPERATURE_RANGE;
    if temperature.is_finite() && (min..=max).contains(&temperature) {
        Ok(temperature)
    } else {
        Err(GatewayError::InvalidRequest(format!(
            "temperature must be between {min} and {max}"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::prompt_library::UI_PROMPTS;

    #[derive(Debug, Default)]
    struct RecordingClient {
        reply: String,
        fail: bool,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(request);
            }
            if self.fail {
                Err(GatewayError::Upstream("down".to_string()))
            } else {
                Ok(self.reply.clone())
            }
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    fn make_service(client: Arc<RecordingClient>) -> GenerationService {
        let Ok(catalog) = ModelCatalog::new(vec![
            "qwen-3-coder-480b".to_string(),
            "gpt-oss-120b".to_string(),
        ]) else {
            panic!("valid catalog");
        };
        GenerationService::new(client, Arc::new(HistoryStore::new(20)), catalog)
    }

    fn ok_client() -> Arc<RecordingClient> {
        Arc::new(RecordingClient {
            reply: "```html\n<html><body>ok</body></html>\n```".to_string(),
            ..RecordingClient::default()
        })
    }

    fn params(prompt: &str) -> GenerateParams {
        GenerateParams {
            prompt: prompt.to_string(),
            model: None,
            temperature: None,
        }
    }

    #[tokio::test]
    async fn generate_records_history_and_cleans_markup() {
        let client = ok_client();
        let service = make_service(Arc::clone(&client));

        let Ok(record) = service.generate(params("  a todo app  ")).await else {
            panic!("generation failed");
        };
        assert_eq!(record.generated_markup, "<html><body>ok</body></html>");
        assert_eq!(record.prompt, "a todo app");
        assert_eq!(record.model, "qwen-3-coder-480b");
        assert_eq!(service.history().len().await, 1);

        let Ok(seen) = client.seen.lock() else {
            panic!("lock poisoned");
        };
        let Some(sent) = seen.first() else {
            panic!("no upstream request");
        };
        assert_eq!(sent.system_prompt, SYSTEM_PROMPT);
        assert_eq!(sent.user_prompt, "a todo app");
        assert!((sent.temperature - DEFAULT_TEMPERATURE).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected_before_upstream() {
        let client = ok_client();
        let service = make_service(Arc::clone(&client));

        let result = service.generate(params(" \n\t ")).await;
        assert!(matches!(result, Err(GatewayError::EmptyPrompt)));
        assert!(client.seen.lock().map(|s| s.is_empty()).unwrap_or(false));
    }

    #[tokio::test]
    async fn unknown_model_is_rejected() {
        let service = make_service(ok_client());
        let mut p = params("x");
        p.model = Some("llama-9000".to_string());
        let result = service.generate(p).await;
        assert!(matches!(result, Err(GatewayError::UnknownModel { .. })));
        assert!(service.history().is_empty().await);
    }

    #[tokio::test]
    async fn out_of_range_temperature_is_rejected() {
        let service = make_service(ok_client());
        for bad in [-0.1, 2.5, f32::NAN] {
            let mut p = params("x");
            p.temperature = Some(bad);
            let result = service.generate(p).await;
            assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
        }
    }

    #[tokio::test]
    async fn oversized_prompt_is_rejected() {
        let service = make_service(ok_client());
        let long = "a".repeat(MAX_PROMPT_CHARS + 1);
        let result = service.generate(params(&long)).await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn upstream_failure_leaves_history_untouched() {
        let client = Arc::new(RecordingClient {
            fail: true,
            ..RecordingClient::default()
        });
        let service = make_service(client);
        let result = service.generate(params("x")).await;
        assert!(matches!(result, Err(GatewayError::Upstream(_))));
        assert!(service.history().is_empty().await);
    }

    #[tokio::test]
    async fn random_generation_uses_library_prompt_and_catalog_model() {
        let service = make_service(ok_client());
        let Ok(record) = service.generate_random().await else {
            panic!("generation failed");
        };
        assert!(UI_PROMPTS.contains(&record.prompt.as_str()));
        assert!(service.catalog().contains(&record.model));
    }
}
