// File: src/cache/message_cache.rs

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use warden_common::error::StoreError;
use warden_common::models::{window_cutoff, HistoryKey, HistoryRecord};
use warden_common::traits::repository_traits::HistoryRepository;

/// Optional write-time trimming. Reads are windowed regardless of this.
#[derive(Debug, Clone, Default)]
pub struct RetentionPolicy {
    /// Keep at most this many records per (user, group).
    pub keep_count: Option<usize>,
}

type Window = BTreeMap<(DateTime<Utc>, i64), HistoryRecord>;

/// Per-(user, group) history held in memory.
///
/// Each window is a BTreeMap keyed by `(message_created_at, record_id)`, so
/// iteration is chronological and ties keep insertion order. The DashMap
/// shard lock serializes appends for one pair while other pairs proceed
/// independently.
pub struct InMemoryHistoryStore {
    windows: DashMap<HistoryKey, Window>,
    next_record_id: AtomicI64,
    retention: RetentionPolicy,
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new(RetentionPolicy::default())
    }
}

impl InMemoryHistoryStore {
    pub fn new(retention: RetentionPolicy) -> Self {
        Self {
            windows: DashMap::new(),
            next_record_id: AtomicI64::new(0),
            retention,
        }
    }

    /// Number of records held for one pair.
    pub fn count(&self, user_id: i64, group_id: i64) -> usize {
        self.windows
            .get(&HistoryKey::new(user_id, group_id))
            .map_or(0, |w| w.len())
    }

    fn trim_window(window: &mut Window, keep_count: usize) -> u64 {
        let mut removed = 0;
        while window.len() > keep_count {
            if window.pop_first().is_none() {
                break;
            }
            removed += 1;
        }
        removed
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryStore {
    async fn append(&self, record: &HistoryRecord) -> Result<HistoryRecord, StoreError> {
        let mut stored = record.clone();
        stored.record_id = self.next_record_id.fetch_add(1, Ordering::SeqCst) + 1;
        stored.inserted_at = Utc::now();

        let mut window = self.windows.entry(stored.key()).or_default();
        window.insert((stored.message_created_at, stored.record_id), stored.clone());

        if let Some(keep) = self.retention.keep_count {
            Self::trim_window(&mut window, keep);
        }

        Ok(stored)
    }

    async fn recent_window(
        &self,
        user_id: i64,
        group_id: i64,
        max_count: usize,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<HistoryRecord>, StoreError> {
        let Some(window) = self.windows.get(&HistoryKey::new(user_id, group_id)) else {
            return Ok(Vec::new());
        };

        let cutoff = window_cutoff(now, max_age);
        let mut records: Vec<HistoryRecord> = window
            .range((cutoff, i64::MIN)..)
            .rev()
            .take(max_count)
            .map(|(_, r)| r.clone())
            .collect();
        records.reverse();
        Ok(records)
    }

    async fn prune(&self, user_id: i64, group_id: i64, keep_count: usize) -> Result<u64, StoreError> {
        Ok(self
            .windows
            .get_mut(&HistoryKey::new(user_id, group_id))
            .map_or(0, |mut w| Self::trim_window(&mut w, keep_count)))
    }

    async fn prune_all(&self, keep_count: usize) -> Result<u64, StoreError> {
        let mut removed = 0;
        for mut window in self.windows.iter_mut() {
            removed += Self::trim_window(&mut window, keep_count);
        }
        self.windows.retain(|_, w| !w.is_empty());
        Ok(removed)
    }
}
