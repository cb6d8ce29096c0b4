use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::StoreError;
use crate::models::{GroupContext, GroupInfo, HistoryRecord, SuspiciousMessage, User};

/// Bounded per-(user, group) message log.
///
/// Implementations own their concurrency safety: callers may append and read
/// from many tasks at once without external locking.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Inserts a record and returns the stored copy with its `record_id`.
    /// Never rejects because of window size.
    async fn append(&self, record: &HistoryRecord) -> Result<HistoryRecord, StoreError>;

    /// Up to `max_count` most recent records for the pair that are no older
    /// than `max_age` relative to `now`, returned oldest first.
    async fn recent_window(
        &self,
        user_id: i64,
        group_id: i64,
        max_count: usize,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<HistoryRecord>, StoreError>;

    /// Deletes everything beyond the `keep_count` most recent records for the
    /// pair. Returns the number of deleted records.
    async fn prune(&self, user_id: i64, group_id: i64, keep_count: usize) -> Result<u64, StoreError>;

    /// Applies [`HistoryRepository::prune`] to every pair.
    async fn prune_all(&self, keep_count: usize) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait GroupContextRepository: Send + Sync {
    async fn get_group(&self, group_id: i64) -> Result<Option<GroupInfo>, StoreError>;
    async fn upsert_group(&self, group: &GroupInfo) -> Result<(), StoreError>;

    /// Convenience lookup returning the pipeline view, if the group is registered.
    async fn get_context(
        &self,
        group_id: i64,
        default_title: &str,
        default_rules: &str,
    ) -> Result<Option<GroupContext>, StoreError> {
        Ok(self
            .get_group(group_id)
            .await?
            .map(|g| g.to_context(default_title, default_rules)))
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates the user or refreshes their first name.
    async fn upsert_user(&self, user_id: i64, first_name: &str) -> Result<User, StoreError>;
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait SuspiciousMessageRepository: Send + Sync {
    async fn record(&self, entry: &SuspiciousMessage) -> Result<(), StoreError>;
    async fn list_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<SuspiciousMessage>, StoreError>;
}
