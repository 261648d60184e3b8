//! HTTP layer: route handlers, DTOs, middleware, and router composition.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete application router.
///
/// Generation, history, model and random-prompt routes pass through the
/// rate-limit middleware; `/health` and `/admin` do not.
pub fn build_router(state: AppState) -> Router {
    let limited = handlers::limited_routes().route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::enforce_rate_limit,
    ));

    Router::new()
        .merge(limited)
        .merge(handlers::open_routes())
        .merge(openapi::routes())
        .with_state(state)
}
