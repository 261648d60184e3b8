//! # dynui-gateway
//!
//! HTTP service that turns a text prompt into a complete web page by asking
//! an upstream large-language-model API for HTML, then serving the result.
//!
//! The gateway keeps a capped in-memory history of generations, exposes an
//! admin form for custom prompts, lists the configured upstream models and
//! applies per-client rate limiting backed by Redis, PostgreSQL or memory.
//!
//! ## Architecture
//!
//! ```text
//! Clients (browser, JSON API)
//!     │
//!     ├── Rate-limit middleware (api/middleware)
//!     ├── Handlers (api/)
//!     │
//!     ├── GenerationService (service/)
//!     │     ├── CompletionClient ── upstream LLM API (upstream/)
//!     │     └── HistoryStore, ModelCatalog (domain/)
//!     │
//!     └── RateLimiter (rate_limit/)
//!           └── Redis │ PostgreSQL │ memory
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod rate_limit;
pub mod service;
pub mod upstream;

use std::sync::Arc;

use crate::app_state::AppState;
use crate::config::GatewayConfig;
use crate::domain::{HistoryStore, ModelCatalog};
use crate::error::GatewayError;
use crate::rate_limit::RateLimiter;
use crate::service::GenerationService;
use crate::upstream::CompletionClient;

/// Wires the service layer around `client` and `rate_limiter`.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if `config.models` is empty.
pub fn build_state(
    config: &GatewayConfig,
    client: Arc<dyn CompletionClient>,
    rate_limiter: RateLimiter,
) -> Result<AppState, GatewayError> {
    let catalog = ModelCatalog::new(config.models.clone())?;
    let history = Arc::new(HistoryStore::new(config.history_capacity));
    let generation_service = Arc::new(GenerationService::new(client, history, catalog));

    Ok(AppState {
        generation_service,
        rate_limiter: Arc::new(rate_limiter),
    })
}
