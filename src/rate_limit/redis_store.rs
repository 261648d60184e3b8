//! Redis-backed sliding-log rate limiting.
//!
//! Each client key is a sorted set of accepted-request timestamps
//! (milliseconds). Pruning, counting and recording run in one Lua script
//! so concurrent gateway instances see a consistent count.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::{Client, Script};

use super::{Decision, Quota, bounded};
use crate::error::GatewayError;

const KEY_PREFIX: &str = "rate_limit:";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const SLIDING_LOG_SCRIPT: &str = r"
local key = KEYS[1]
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local limit = tonumber(ARGV[3])
redis.call('ZREMRANGEBYSCORE', key, '-inf', now - window)
local count = redis.call('ZCARD', key)
if count >= limit then
  local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
  local retry = window
  if oldest[2] then
    retry = tonumber(oldest[2]) + window - now
  end
  return {0, retry}
end
redis.call('ZADD', key, now, ARGV[4])
redis.call('PEXPIRE', key, window)
return {1, limit - count - 1}
";

/// Rate-limit store shared through Redis.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
    script: Script,
    call_timeout: Duration,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connects to `url` and verifies the connection with `PING`.
    ///
    /// Every later command fails once `call_timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the URL is invalid,
    /// the server is unreachable, or it does not answer in time.
    pub async fn connect(url: &str, call_timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::open(url)
            .map_err(|e| GatewayError::PersistenceError(format!("invalid redis url: {e}")))?;

        let manager = tokio::time::timeout(CONNECT_TIMEOUT, client.get_connection_manager())
            .await
            .map_err(|_| GatewayError::PersistenceError("redis connect timed out".to_string()))?
            .map_err(|e| GatewayError::PersistenceError(format!("redis connect failed: {e}")))?;

        let store = Self {
            manager,
            script: Script::new(SLIDING_LOG_SCRIPT),
            call_timeout,
        };
        store.ping().await?;
        Ok(store)
    }

    /// Sends `PING`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if Redis does not answer.
    pub async fn ping(&self) -> Result<(), GatewayError> {
        let mut conn = self.manager.clone();
        bounded(self.call_timeout, "redis ping", async move {
            let _: String = redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(|e| GatewayError::PersistenceError(format!("redis ping failed: {e}")))?;
            Ok(())
        })
        .await
    }

    /// Checks and records a request for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the script fails or
    /// Redis does not answer in time.
    pub async fn check(&self, key: &str, quota: Quota) -> Result<Decision, GatewayError> {
        let mut conn = self.manager.clone();
        let now_ms = Utc::now().timestamp_millis();
        let window_ms = i64::try_from(quota.window().as_millis()).unwrap_or(i64::MAX);
        let member = format!("{now_ms}-{}", uuid::Uuid::new_v4());

        let mut invocation = self.script.key(format!("{KEY_PREFIX}{key}"));
        invocation
            .arg(now_ms)
            .arg(window_ms)
            .arg(quota.max_requests())
            .arg(member);

        let (allowed, value): (i64, i64) = bounded(self.call_timeout, "redis rate check", async {
            invocation
                .invoke_async(&mut conn)
                .await
                .map_err(|e| GatewayError::PersistenceError(format!("redis rate check failed: {e}")))
        })
        .await?;

        let value = u64::try_from(value).unwrap_or(0);
        Ok(if allowed == 1 {
            Decision::Allowed {
                remaining: u32::try_from(value).unwrap_or(u32::MAX),
            }
        } else {
            Decision::Limited {
                retry_after: Duration::from_millis(value.max(1)),
            }
        })
    }
}
