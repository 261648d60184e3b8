//! In-process sliding-log rate limiting.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::{Decision, Quota};

/// Number of tracked keys above which stale keys are swept on check.
const SWEEP_THRESHOLD: usize = 1024;

/// Per-key log of accepted request instants.
///
/// Always available; also used as the fallback when a shared backend
/// fails mid-request.
#[derive(Debug, Default)]
pub struct MemoryStore {
    log: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks and records a request for `key` at the current instant.
    pub async fn check(&self, key: &str, quota: Quota) -> Decision {
        self.check_at(key, quota, Instant::now()).await
    }

    /// Checks and records a request for `key` as if made at `now`.
    ///
    /// Instants within a key must be non-decreasing.
    pub async fn check_at(&self, key: &str, quota: Quota, now: Instant) -> Decision {
        let window = quota.window();
        let mut log = self.log.lock().await;

        if log.len() > SWEEP_THRESHOLD {
            let before = log.len();
            log.retain(|_, times| times.back().is_some_and(|t| now.duration_since(*t) < window));
            tracing::debug!(before, after = log.len(), "swept idle rate-limit keys");
        }

        let times = log.entry(key.to_string()).or_default();
        while times
            .front()
            .is_some_and(|t| now.duration_since(*t) >= window)
        {
            times.pop_front();
        }

        let max = quota.max_requests() as usize;
        if times.len() >= max {
            let retry_after = times
                .front()
                .map_or(window, |oldest| window.saturating_sub(now.duration_since(*oldest)));
            return Decision::Limited {
                retry_after: retry_after.max(Duration::from_millis(1)),
            };
        }

        times.push_back(now);
        let remaining = max.saturating_sub(times.len());
        Decision::Allowed {
            remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
        }
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.log.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota() -> Quota {
        Quota::new(3, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn allows_up_to_limit_then_rejects() {
        let store = MemoryStore::new();
        let now = Instant::now();
        for expected_remaining in [2, 1, 0] {
            let decision = store.check_at("1.2.3.4", quota(), now).await;
            assert_eq!(
                decision,
                Decision::Allowed {
                    remaining: expected_remaining
                }
            );
        }
        let decision = store.check_at("1.2.3.4", quota(), now).await;
        assert!(!decision.is_allowed());
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let store = MemoryStore::new();
        let now = Instant::now();
        for _ in 0..3 {
            assert!(store.check_at("a", quota(), now).await.is_allowed());
        }
        assert!(!store.check_at("a", quota(), now).await.is_allowed());
        assert!(store.check_at("b", quota(), now).await.is_allowed());
        assert_eq!(store.tracked_keys().await, 2);
    }

    #[tokio::test]
    async fn window_expiry_unblocks_client() {
        let store = MemoryStore::new();
        let start = Instant::now();
        for offset in [0, 10, 20] {
            let at = start + Duration::from_secs(offset);
            assert!(store.check_at("ip", quota(), at).await.is_allowed());
        }

        let blocked = store
            .check_at("ip", quota(), start + Duration::from_secs(30))
            .await;
        assert_eq!(
            blocked,
            Decision::Limited {
                retry_after: Duration::from_secs(30)
            }
        );

        // First request leaves the window at exactly +60s.
        let reopened = store
            .check_at("ip", quota(), start + Duration::from_secs(60))
            .await;
        assert!(reopened.is_allowed());
        let blocked_again = store
            .check_at("ip", quota(), start + Duration::from_secs(61))
            .await;
        assert!(!blocked_again.is_allowed());
    }

    #[tokio::test]
    async fn rejected_requests_are_not_recorded() {
        let store = MemoryStore::new();
        let start = Instant::now();
        for _ in 0..3 {
            let _ = store.check_at("ip", quota(), start).await;
        }
        for offset in 1..50 {
            let at = start + Duration::from_secs(offset);
            assert!(!store.check_at("ip", quota(), at).await.is_allowed());
        }
        let at = start + Duration::from_secs(60);
        assert!(store.check_at("ip", quota(), at).await.is_allowed());
    }
}
