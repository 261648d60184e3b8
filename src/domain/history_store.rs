//! Capped, insertion-ordered log of past generations.
//!
//! [`HistoryStore`] keeps the most recent generation records in a
//! `VecDeque` behind a [`tokio::sync::RwLock`]. Appends are serialized;
//! readers take consistent snapshots. When the log is full the oldest
//! record is evicted.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use super::GenerationRecord;

/// In-memory generation history.
///
/// # Concurrency
///
/// - Multiple readers may snapshot concurrently.
/// - Appends are serialized; records appear in the order their append
///   acquired the lock.
#[derive(Debug)]
pub struct HistoryStore {
    records: RwLock<VecDeque<GenerationRecord>>,
    capacity: usize,
    total_appended: AtomicU64,
}

impl HistoryStore {
    /// Creates an empty store holding at most `capacity` records.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            total_appended: AtomicU64::new(0),
        }
    }

    /// Appends a record, evicting the oldest one when the store is full.
    ///
    /// Returns the evicted record, if any.
    pub async fn append(&self, record: GenerationRecord) -> Option<GenerationRecord> {
        let mut records = self.records.write().await;
        let evicted = if records.len() >= self.capacity {
            records.pop_front()
        } else {
            None
        };
        records.push_back(record);
        self.total_appended.fetch_add(1, Ordering::Relaxed);
        evicted
    }

    /// Returns every retained record, oldest first.
    pub async fn snapshot(&self) -> Vec<GenerationRecord> {
        self.records.read().await.iter().cloned().collect()
    }

    /// Returns the last `n` retained records, oldest first.
    pub async fn recent(&self, n: usize) -> Vec<GenerationRecord> {
        let records = self.records.read().await;
        let skip = records.len().saturating_sub(n);
        records.iter().skip(skip).cloned().collect()
    }

    /// Returns the number of retained records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if no records are retained.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Maximum number of retained records.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records ever appended, including evicted ones.
    #[must_use]
    pub fn total_appended(&self) -> u64 {
        self.total_appended.load(Ordering::Relaxed)
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(n: usize) -> GenerationRecord {
        GenerationRecord::new(
            format!("prompt {n}"),
            "qwen-3-coder-480b".to_string(),
            format!("<html>{n}</html>"),
        )
    }

    fn prompts(records: &[GenerationRecord]) -> Vec<String> {
        records.iter().map(|r| r.prompt.clone()).collect()
    }

    #[tokio::test]
    async fn append_preserves_insertion_order() {
        let store = HistoryStore::new(10);
        for n in 0..3 {
            assert!(store.append(make_record(n)).await.is_none());
        }
        let snapshot = store.snapshot().await;
        assert_eq!(prompts(&snapshot), vec!["prompt 0", "prompt 1", "prompt 2"]);
    }

    #[tokio::test]
    async fn full_store_evicts_oldest() {
        let store = HistoryStore::new(2);
        let _ = store.append(make_record(0)).await;
        let _ = store.append(make_record(1)).await;
        let evicted = store.append(make_record(2)).await;

        assert_eq!(evicted.map(|r| r.prompt), Some("prompt 0".to_string()));
        assert_eq!(prompts(&store.snapshot().await), vec!["prompt 1", "prompt 2"]);
        assert_eq!(store.len().await, 2);
        assert_eq!(store.total_appended(), 3);
    }

    #[tokio::test]
    async fn recent_returns_tail_oldest_first() {
        let store = HistoryStore::new(10);
        for n in 0..5 {
            let _ = store.append(make_record(n)).await;
        }
        assert_eq!(prompts(&store.recent(2).await), vec!["prompt 3", "prompt 4"]);
        assert_eq!(store.recent(50).await.len(), 5);
        assert!(store.recent(0).await.is_empty());
    }

    #[tokio::test]
    async fn zero_capacity_is_raised_to_one() {
        let store = HistoryStore::new(0);
        assert_eq!(store.capacity(), 1);
        assert!(store.is_empty().await);
        let _ = store.append(make_record(0)).await;
        let _ = store.append(make_record(1)).await;
        assert_eq!(prompts(&store.snapshot().await), vec!["prompt 1"]);
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_recorded() {
        let store = std::sync::Arc::new(HistoryStore::new(100));
        let mut handles = Vec::new();
        for n in 0..20 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let _ = store.append(make_record(n)).await;
            }));
        }
        for handle in handles {
            assert!(handle.await.is_ok());
        }
        assert_eq!(store.len().await, 20);
        assert_eq!(store.total_appended(), 20);
    }
}
