//! HTTP endpoint handlers organized by resource.

pub mod generate;
pub mod history;
pub mod pages;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Routes subject to per-client rate limiting.
pub fn limited_routes() -> Router<AppState> {
    Router::new()
        .merge(pages::routes())
        .merge(generate::routes())
        .merge(history::routes())
        .merge(system::routes())
}

/// Routes that are never rate limited: health and the admin form.
pub fn open_routes() -> Router<AppState> {
    Router::new()
        .merge(pages::open_routes())
        .merge(system::open_routes())
}
