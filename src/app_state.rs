//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::rate_limit::RateLimiter;
use crate::service::GenerationService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Generation service for all business logic.
    pub generation_service: Arc<GenerationService>,
    /// Per-client rate limiter.
    pub rate_limiter: Arc<RateLimiter>,
}
