//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every key except the upstream API key
//! has a default, so an empty environment yields a runnable (if useless)
//! configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Default upstream base URL (Cerebras inference API).
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.cerebras.ai";

/// Models offered when `AVAILABLE_MODELS` is unset.
pub const DEFAULT_MODELS: &[&str] = &["qwen-3-coder-480b", "gpt-oss-120b"];

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8000`).
    pub listen_addr: SocketAddr,

    /// Upstream API key. `None` means every generation fails with 500.
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible upstream API.
    pub upstream_base_url: String,

    /// Timeout in seconds for a single upstream completion call.
    pub upstream_timeout_secs: u64,

    /// `max_tokens` sent with every completion request.
    pub upstream_max_tokens: u32,

    /// Timeout in seconds for a whole inbound request.
    pub request_timeout_secs: u64,

    /// Model identifiers offered to clients. Never empty; first is default.
    pub models: Vec<String>,

    /// Maximum number of generation records kept in memory.
    pub history_capacity: usize,

    /// Accepted requests per client per window.
    pub rate_limit_requests: u32,

    /// Rate-limit window length in seconds.
    pub rate_limit_window_secs: u64,

    /// Optional Redis URL for the shared rate-limit backend.
    pub redis_url: Option<String>,

    /// Optional PostgreSQL URL for the durable rate-limit backend.
    pub database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,

    /// Limit in milliseconds on one Redis or PostgreSQL rate-limit call.
    /// A call that runs over counts as a backend failure.
    pub rate_limit_backend_timeout_ms: u64,

    /// Log line format.
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_env("PORT", 8000);
        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| format!("0.0.0.0:{port}"))
            .parse()?;

        let api_key = non_empty_env("CEREBRAS_API_KEY");
        let upstream_base_url = non_empty_env("CEREBRAS_BASE_URL")
            .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string());

        let models = std::env::var("AVAILABLE_MODELS")
            .map(|raw| parse_model_list(&raw))
            .unwrap_or_default();
        let models = if models.is_empty() {
            DEFAULT_MODELS.iter().map(|m| (*m).to_string()).collect()
        } else {
            models
        };

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            listen_addr,
            api_key,
            upstream_base_url,
            upstream_timeout_secs: parse_env("UPSTREAM_TIMEOUT_SECS", 60),
            upstream_max_tokens: parse_env("UPSTREAM_MAX_TOKENS", 4000),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 120),
            models,
            history_capacity: parse_env("HISTORY_CAPACITY", 20),
            rate_limit_requests: parse_env("RATE_LIMIT_REQUESTS", 5),
            rate_limit_window_secs: parse_env("RATE_LIMIT_WINDOW", 60),
            redis_url: non_empty_env("REDIS_URL"),
            database_url: non_empty_env("DATABASE_URL"),
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5),
            database_connect_timeout_secs: parse_env("DATABASE_CONNECT_TIMEOUT_SECS", 5),
            rate_limit_backend_timeout_ms: parse_env("RATE_LIMIT_BACKEND_TIMEOUT_MS", 2000),
            log_format,
        })
    }

    /// Upstream call timeout as a [`Duration`].
    #[must_use]
    pub const fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Inbound request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Rate-limit window as a [`Duration`].
    #[must_use]
    pub const fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    /// Per-call rate-limit backend limit as a [`Duration`], at least 1 ms.
    #[must_use]
    pub fn rate_limit_backend_timeout(&self) -> Duration {
        Duration::from_millis(self.rate_limit_backend_timeout_ms.max(1))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            api_key: None,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            upstream_timeout_secs: 60,
            upstream_max_tokens: 4000,
            request_timeout_secs: 120,
            models: DEFAULT_MODELS.iter().map(|m| (*m).to_string()).collect(),
            history_capacity: 20,
            rate_limit_requests: 5,
            rate_limit_window_secs: 60,
            redis_url: None,
            database_url: None,
            database_max_connections: 5,
            database_connect_timeout_secs: 5,
            rate_limit_backend_timeout_ms: 2000,
            log_format: LogFormat::Pretty,
        }
    }
}

/// Splits a comma-separated model list, dropping blanks and duplicates
/// while keeping first-seen order.
fn parse_model_list(raw: &str) -> Vec<String> {
    let mut models: Vec<String> = Vec::new();
    for model in raw.split(',').map(str::trim).filter(|m| !m.is_empty()) {
        if !models.iter().any(|m| m == model) {
            models.push(model.to_string());
        }
    }
    models
}

/// Reads an environment variable, treating blank values as unset.
fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_list_trims_and_dedups() {
        let models = parse_model_list(" a , b,, a ,c ");
        assert_eq!(models, vec!["a", "b", "c"]);
    }

    #[test]
    fn model_list_blank_is_empty() {
        assert!(parse_model_list(" , ,").is_empty());
    }

    #[test]
    fn default_config_matches_documented_values() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.listen_addr.port(), 8000);
        assert_eq!(cfg.models, vec!["qwen-3-coder-480b", "gpt-oss-120b"]);
        assert_eq!(cfg.history_capacity, 20);
        assert_eq!(cfg.rate_limit_requests, 5);
        assert_eq!(cfg.rate_limit_window(), Duration::from_secs(60));
        assert_eq!(cfg.rate_limit_backend_timeout(), Duration::from_secs(2));
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn parse_env_falls_back_on_missing_key() {
        let value: u32 = parse_env("DYNUI_TEST_SURELY_UNSET_KEY", 42);
        assert_eq!(value, 42);
    }
}
