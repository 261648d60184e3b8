//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1003,
///     "message": "prompt cannot be empty",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see the table on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status                   |
/// |-----------|------------|-------------------------------|
/// | 1000–1999 | Validation | 400 Bad Request               |
/// | 429       | Throttling | 429 Too Many Requests         |
/// | 3000–3999 | Server     | 500 Internal Server Error     |
/// | 5000–5999 | Upstream   | 502 / 503 / 504               |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Requested model is not in the catalog.
    #[error("model must be one of: {allowed}")]
    UnknownModel {
        /// The model the client asked for.
        requested: String,
        /// Comma-separated list of accepted models.
        allowed: String,
    },

    /// Prompt was empty or whitespace only.
    #[error("prompt cannot be empty")]
    EmptyPrompt,

    /// Client exceeded rate limit.
    #[error("rate limit exceeded: maximum {max_requests} requests per {window_secs} seconds")]
    RateLimited {
        /// Accepted requests per window.
        max_requests: u32,
        /// Window length in seconds.
        window_secs: u64,
        /// Milliseconds until the client may retry.
        retry_after_ms: u64,
    },

    /// No upstream API key is configured.
    #[error("upstream API key is not configured")]
    MissingApiKey,

    /// Rate-limit storage backend failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Upstream API call failed or returned an unusable completion.
    #[error("failed to generate UI: {0}")]
    Upstream(String),

    /// Upstream API rejected the configured key.
    #[error("upstream API rejected credentials")]
    UpstreamAuth,

    /// Upstream API did not answer in time.
    #[error("upstream API timed out")]
    UpstreamTimeout,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::UnknownModel { .. } => 1002,
            Self::EmptyPrompt => 1003,
            Self::RateLimited { .. } => 429,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::MissingApiKey => 3002,
            Self::Upstream(_) => 5001,
            Self::UpstreamAuth => 5002,
            Self::UpstreamTimeout => 5003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::UnknownModel { .. } | Self::EmptyPrompt => {
                StatusCode::BAD_REQUEST
            }
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::MissingApiKey | Self::PersistenceError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamAuth => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Returns `true` for failures caused by the upstream API or its
    /// credentials rather than by the client.
    #[must_use]
    pub const fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            Self::Upstream(_) | Self::UpstreamAuth | Self::UpstreamTimeout | Self::MissingApiKey
        )
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::UnknownModel { requested, .. } => Some(format!("requested model: {requested}")),
            Self::RateLimited { retry_after_ms, .. } => {
                Some(format!("retry after {retry_after_ms} ms"))
            }
            _ => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let retry_after = match &self {
            Self::RateLimited { retry_after_ms, .. } => Some(retry_after_ms.div_ceil(1000).max(1)),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_request() {
        assert_eq!(GatewayError::EmptyPrompt.status_code(), StatusCode::BAD_REQUEST);
        let err = GatewayError::UnknownModel {
            requested: "x".to_string(),
            allowed: "a, b".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1002);
        assert_eq!(err.to_string(), "model must be one of: a, b");
    }

    #[test]
    fn upstream_errors_map_to_gateway_statuses() {
        assert_eq!(
            GatewayError::Upstream("boom".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(GatewayError::UpstreamAuth.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            GatewayError::UpstreamTimeout.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert!(GatewayError::MissingApiKey.is_upstream_failure());
        assert!(!GatewayError::EmptyPrompt.is_upstream_failure());
    }

    #[test]
    fn rate_limited_sets_retry_after_header() {
        let err = GatewayError::RateLimited {
            max_requests: 5,
            window_secs: 60,
            retry_after_ms: 1500,
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok());
        assert_eq!(retry, Some("2"));
    }
}
