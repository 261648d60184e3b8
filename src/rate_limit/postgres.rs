//! PostgreSQL-backed sliding-log rate limiting.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{Decision, Quota, bounded};
use crate::error::GatewayError;

/// Rate-limit store in the `rate_limits` table, using `sqlx::PgPool`.
///
/// Each check runs in one transaction holding a per-key advisory lock,
/// so concurrent checks for the same client are serialized. A check or
/// ping that runs past `call_timeout` is abandoned and its transaction
/// rolled back.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    call_timeout: Duration,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool, call_timeout: Duration) -> Self {
        Self { pool, call_timeout }
    }

    /// Connects to `url` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if the connection or a
    /// migration fails.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
        call_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(Self::new(pool, call_timeout))
    }

    /// Runs `SELECT 1`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure or
    /// timeout.
    pub async fn ping(&self) -> Result<(), GatewayError> {
        bounded(self.call_timeout, "database ping", async {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
            Ok(())
        })
        .await
    }

    /// Checks and records a request for `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure or
    /// timeout.
    pub async fn check(&self, key: &str, quota: Quota) -> Result<Decision, GatewayError> {
        bounded(self.call_timeout, "database rate check", self.check_in_tx(key, quota)).await
    }

    async fn check_in_tx(&self, key: &str, quota: Quota) -> Result<Decision, GatewayError> {
        let now = Utc::now();
        let window = chrono::Duration::from_std(quota.window())
            .map_err(|e| GatewayError::Internal(format!("window out of range: {e}")))?;
        let cutoff = now - window;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(key)
            .execute(&mut *tx)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        sqlx::query("DELETE FROM rate_limits WHERE client_ip = $1 AND requested_at <= $2")
            .bind(key)
            .bind(cutoff)
            .execute(&mut *tx)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let (count, oldest) = sqlx::query_as::<_, (i64, Option<DateTime<Utc>>)>(
            "SELECT COUNT(*), MIN(requested_at) FROM rate_limits WHERE client_ip = $1",
        )
        .bind(key)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let max = i64::from(quota.max_requests());
        let decision = if count >= max {
            let retry_after = oldest
                .map(|t| (t + window - now).to_std().unwrap_or(Duration::ZERO))
                .unwrap_or_else(|| quota.window());
            Decision::Limited {
                retry_after: retry_after.max(Duration::from_millis(1)),
            }
        } else {
            sqlx::query("INSERT INTO rate_limits (client_ip, requested_at) VALUES ($1, $2)")
                .bind(key)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
            Decision::Allowed {
                remaining: u32::try_from(max - count - 1).unwrap_or(0),
            }
        };

        tx.commit()
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(decision)
    }
}
