//! Per-client rate limiting with pluggable storage.
//!
//! All backends implement the same sliding-log rule: a request is
//! accepted iff fewer than `max_requests` accepted requests from the same
//! key fall inside the trailing window. Rejected requests are not
//! recorded.
//!
//! [`RateLimiter`] picks the shared backend at startup (Redis, then
//! PostgreSQL, then memory). If the shared backend fails during a check,
//! that check is answered by the in-memory store instead. Every call to a
//! shared backend is bounded, so a stalled server counts as a failure.

pub mod memory;
pub mod postgres;
pub mod redis_store;

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use redis_store::RedisStore;

/// Requests allowed per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    max_requests: u32,
    window: Duration,
}

impl Quota {
    /// Creates a quota. `max_requests` is raised to at least one and the
    /// window to at least one millisecond.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window: window.max(Duration::from_millis(1)),
        }
    }

    /// Accepted requests per window.
    #[must_use]
    pub const fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Window length.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Request accepted and recorded.
    Allowed {
        /// Requests left in the current window.
        remaining: u32,
    },
    /// Request rejected; nothing recorded.
    Limited {
        /// Time until the oldest accepted request leaves the window.
        retry_after: Duration,
    },
}

impl Decision {
    /// Returns `true` for [`Decision::Allowed`].
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Storage backing the rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Redis sorted sets.
    Redis,
    /// PostgreSQL `rate_limits` table.
    Database,
    /// Process memory.
    Memory,
}

/// Connectivity of an optional backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BackendStatus {
    /// Configured and answering.
    Connected,
    /// Configured but not answering.
    Disconnected,
    /// Not configured, or failed to connect at startup.
    NotAvailable,
}

/// Snapshot of limiter configuration and backend health.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RateLimitStatus {
    /// Redis backend connectivity.
    pub redis_status: BackendStatus,
    /// PostgreSQL backend connectivity.
    pub database_status: BackendStatus,
    /// Accepted requests per window.
    pub requests_per_window: u32,
    /// Window length in seconds.
    pub window_seconds: u64,
    /// Backend currently answering checks.
    pub storage_type: StorageKind,
}

/// Rate limiter keyed by client address.
#[derive(Debug)]
pub struct RateLimiter {
    quota: Quota,
    memory: MemoryStore,
    redis: Option<RedisStore>,
    postgres: Option<PostgresStore>,
}

impl RateLimiter {
    /// Creates a limiter that only uses process memory.
    #[must_use]
    pub fn in_memory(quota: Quota) -> Self {
        Self {
            quota,
            memory: MemoryStore::new(),
            redis: None,
            postgres: None,
        }
    }

    /// Creates a limiter from configuration, connecting to Redis and
    /// PostgreSQL when their URLs are set.
    ///
    /// Connection failures are logged and leave that backend unavailable.
    pub async fn from_config(config: &GatewayConfig) -> Self {
        let quota = Quota::new(config.rate_limit_requests, config.rate_limit_window());
        let mut limiter = Self::in_memory(quota);

        let call_timeout = config.rate_limit_backend_timeout();

        if let Some(url) = config.redis_url.as_deref() {
            match RedisStore::connect(url, call_timeout).await {
                Ok(store) => {
                    tracing::info!("connected to redis rate-limit backend");
                    limiter.redis = Some(store);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "redis unavailable; falling back to database or memory rate limiting");
                }
            }
        } else {
            tracing::warn!("REDIS_URL not set; using database or in-memory rate limiting");
        }

        if limiter.redis.is_none()
            && let Some(url) = config.database_url.as_deref()
        {
            let timeout = Duration::from_secs(config.database_connect_timeout_secs);
            match PostgresStore::connect(
                url,
                config.database_max_connections,
                timeout,
                call_timeout,
            )
            .await
            {
                Ok(store) => {
                    tracing::info!("connected to database rate-limit backend");
                    limiter.postgres = Some(store);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "database unavailable; using in-memory rate limiting");
                }
            }
        }

        tracing::info!(
            storage = ?limiter.storage_kind(),
            requests = quota.max_requests(),
            window_secs = quota.window().as_secs(),
            "rate limiter ready"
        );
        limiter
    }

    /// The configured quota.
    #[must_use]
    pub const fn quota(&self) -> Quota {
        self.quota
    }

    /// Primary backend chosen at startup.
    #[must_use]
    pub const fn storage_kind(&self) -> StorageKind {
        if self.redis.is_some() {
            StorageKind::Redis
        } else if self.postgres.is_some() {
            StorageKind::Database
        } else {
            StorageKind::Memory
        }
    }

    /// Checks and records a request from `key`.
    ///
    /// Never fails: backend errors fall through to the in-memory store.
    pub async fn check(&self, key: &str) -> Decision {
        let shared = if let Some(redis) = &self.redis {
            Some(redis.check(key, self.quota).await)
        } else if let Some(postgres) = &self.postgres {
            Some(postgres.check(key, self.quota).await)
        } else {
            None
        };

        match shared {
            Some(Ok(decision)) => decision,
            Some(Err(e)) => {
                tracing::error!(error = %e, client_ip = key, "rate-limit backend failed; falling back to memory");
                self.memory.check(key, self.quota).await
            }
            None => self.memory.check(key, self.quota).await,
        }
    }

    /// Pings the optional backends and reports which one answers checks.
    ///
    /// A backend that does not answer within its call limit is reported
    /// as [`BackendStatus::Disconnected`].
    pub async fn status(&self) -> RateLimitStatus {
        let redis = async {
            match &self.redis {
                None => BackendStatus::NotAvailable,
                Some(store) => ping_status(store.ping().await.is_ok()),
            }
        };
        let database = async {
            match &self.postgres {
                None => BackendStatus::NotAvailable,
                Some(store) => ping_status(store.ping().await.is_ok()),
            }
        };
        let (redis_status, database_status) = tokio::join!(redis, database);
        let storage_type = if redis_status == BackendStatus::Connected {
            StorageKind::Redis
        } else if database_status == BackendStatus::Connected {
            StorageKind::Database
        } else {
            StorageKind::Memory
        };

        RateLimitStatus {
            redis_status,
            database_status,
            requests_per_window: self.quota.max_requests(),
            window_seconds: self.quota.window().as_secs(),
            storage_type,
        }
    }
}

/// Runs one shared-backend call, failing with
/// [`GatewayError::PersistenceError`] once `limit` elapses.
pub(crate) async fn bounded<T, F>(limit: Duration, op: &str, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    tokio::time::timeout(limit, call).await.map_err(|_| {
        GatewayError::PersistenceError(format!("{op} timed out after {} ms", limit.as_millis()))
    })?
}

const fn ping_status(ok: bool) -> BackendStatus {
    if ok {
        BackendStatus::Connected
    } else {
        BackendStatus::Disconnected
    }
}
