//! Cerebras chat-completions client (OpenAI-compatible wire format).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{CompletionClient, CompletionRequest};
use crate::error::GatewayError;

const COMPLETIONS_PATH: &str = "v1/chat/completions";

/// HTTP client for `POST /v1/chat/completions`.
///
/// Sends a single request per completion with a fixed timeout; failures
/// are reported, never retried.
#[derive(Debug, Clone)]
pub struct CerebrasClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    max_tokens: u32,
}

impl CerebrasClient {
    /// Creates a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        max_tokens: u32,
    ) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            max_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{COMPLETIONS_PATH}", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for CerebrasClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(GatewayError::MissingApiKey);
        };

        let body = ChatCompletionRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(model = %request.model, url = %self.endpoint(), "sending completion request");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::UpstreamTimeout
                } else {
                    GatewayError::Upstream(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::UpstreamTimeout
            } else {
                GatewayError::Upstream(format!("failed to read response body: {e}"))
            }
        })?;

        if !status.is_success() {
            tracing::warn!(%status, model = %request.model, "upstream returned error status");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::UpstreamAuth,
                _ => GatewayError::Upstream(format!("HTTP {status}: {}", truncate(&text, 200))),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| GatewayError::Upstream(format!("invalid completion payload: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GatewayError::Upstream("completion contained no content".to_string()))
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "qwen-3-coder-480b".to_string(),
            system_prompt: "sys".to_string(),
            user_prompt: "user".to_string(),
            temperature: 0.8,
        }
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let Ok(client) =
            CerebrasClient::new("http://localhost:1/", None, Duration::from_secs(1), 10)
        else {
            panic!("client build failed");
        };
        assert_eq!(client.endpoint(), "http://localhost:1/v1/chat/completions");
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let Ok(client) =
            CerebrasClient::new("http://localhost:1", Some(String::new()), Duration::from_secs(1), 10)
        else {
            panic!("client build failed");
        };
        assert!(!client.is_configured());
        let result = client.complete(request()).await;
        assert!(matches!(result, Err(GatewayError::MissingApiKey)));
    }

    #[test]
    fn request_body_uses_openai_shape() {
        let body = ChatCompletionRequest {
            model: "m",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "s",
                },
                ChatMessage {
                    role: "user",
                    content: "u",
                },
            ],
            temperature: 0.5,
            max_tokens: 4000,
        };
        let Ok(value) = serde_json::to_value(&body) else {
            panic!("serialization failed");
        };
        assert_eq!(value["model"], "m");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["max_tokens"], 4000);
    }

    #[test]
    fn response_without_content_parses() {
        let raw = r#"{"choices":[{"message":{"role":"assistant"}}]}"#;
        let Ok(parsed) = serde_json::from_str::<ChatCompletionResponse>(raw) else {
            panic!("parse failed");
        };
        assert!(parsed.choices.into_iter().next().and_then(|c| c.message.content).is_none());
    }
}
