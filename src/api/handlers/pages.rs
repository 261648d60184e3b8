//! HTML pages: the random generator at `/` and the admin form.

use askama::Template;
use axum::Router;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;

use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// Message shown on the fallback page.
pub const FALLBACK_MESSAGE: &str =
    "Something went wrong, but don't worry - it happens to the best of us!";

/// Admin form with one `<option>` per model.
#[derive(Debug, Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate<'a> {
    /// Models offered in the select box, default first.
    pub models: &'a [String],
}

/// Page served by `GET /` when generation fails.
#[derive(Debug, Template)]
#[template(path = "fallback.html")]
pub struct FallbackTemplate<'a> {
    /// Text shown under the heading.
    pub message: &'a str,
}

fn render(template: &impl Template) -> Result<Html<String>, GatewayError> {
    template
        .render()
        .map(Html)
        .map_err(|e| GatewayError::Internal(format!("page rendering failed: {e}")))
}

/// `GET /`: Generate a page from a random built-in prompt.
#[utoipa::path(
    get,
    path = "/",
    tag = "Pages",
    summary = "Random generated page",
    description = "Picks a random UI idea and model, generates the page upstream and returns it as HTML. \
        Upstream failures render a fallback page with the matching 5xx status.",
    responses(
        (status = 200, description = "Generated page", body = String, content_type = "text/html"),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 503, description = "Fallback page", body = String, content_type = "text/html"),
    )
)]
pub async fn random_page(State(state): State<AppState>) -> Response {
    let error = match state.generation_service.generate_random().await {
        Ok(record) => return Html(record.generated_markup).into_response(),
        Err(e) => e,
    };

    if error.is_upstream_failure() {
        tracing::warn!(error = %error, "upstream unavailable; serving fallback page");
    } else {
        tracing::error!(error = %error, "random page generation failed; serving fallback page");
    }

    match render(&FallbackTemplate {
        message: FALLBACK_MESSAGE,
    }) {
        Ok(page) => (error.status_code(), page).into_response(),
        Err(render_error) => render_error.into_response(),
    }
}

/// `GET /admin`: Custom generation form.
#[utoipa::path(
    get,
    path = "/admin",
    tag = "Pages",
    summary = "Admin form",
    description = "Form for generating a page from a custom prompt, model and temperature.",
    responses(
        (status = 200, description = "Admin page", body = String, content_type = "text/html"),
        (status = 500, description = "Rendering failed", body = ErrorResponse),
    )
)]
pub async fn admin_page(State(state): State<AppState>) -> Result<Html<String>, GatewayError> {
    let catalog = state.generation_service.catalog();
    render(&AdminTemplate {
        models: catalog.models(),
    })
}

/// Rate-limited page routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(random_page))
}

/// Page routes served without rate limiting.
pub fn open_routes() -> Router<AppState> {
    Router::new().route("/admin", get(admin_page))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn admin_lists_each_model_once() {
        let models = ["alpha".to_string(), "beta<x>".to_string()];
        let Ok(html) = (AdminTemplate { models: &models }).render() else {
            panic!("admin template failed to render");
        };
        assert_eq!(html.matches("<option value=\"alpha\">alpha</option>").count(), 1);
        assert!(html.contains("<option value=\"beta&lt;x&gt;\">beta&lt;x&gt;</option>"));
        assert!(html.contains("/api/generate"));
    }

    #[test]
    fn fallback_escapes_message() {
        let Ok(html) = (FallbackTemplate {
            message: "<broken> & \"quoted\"",
        })
        .render() else {
            panic!("fallback template failed to render");
        };
        assert!(html.contains("&lt;broken&gt; &amp; &quot;quoted&quot;"));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Try Again"));
    }
}
