//! Upstream LLM access: the completion client seam and markup extraction.
//!
//! [`CompletionClient`] is the only thing the service layer knows about
//! the upstream API. [`CerebrasClient`] is the production implementation;
//! tests substitute their own.

pub mod cerebras;
pub mod markup;

use async_trait::async_trait;

use crate::error::GatewayError;

pub use cerebras::CerebrasClient;
pub use markup::extract_markup;

/// One chat-completion call: a system prompt plus a single user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Upstream model identifier.
    pub model: String,
    /// Instructions sent as the system message.
    pub system_prompt: String,
    /// The user's UI description.
    pub user_prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Text-completion provider.
#[async_trait]
pub trait CompletionClient: Send + Sync + std::fmt::Debug {
    /// Sends one completion request and returns the raw completion text.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingApiKey`] when no credentials are
    /// configured and one of the upstream variants on transport, status,
    /// or decoding failures.
    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError>;

    /// Returns `true` if credentials are configured.
    fn is_configured(&self) -> bool;
}
