// src/repositories/memory.rs
//
// Process-local stores used when no database URL is configured, and by tests.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::RwLock;
use warden_common::error::StoreError;
use warden_common::models::{GroupInfo, SuspiciousMessage, User};
use warden_common::traits::repository_traits::{
    GroupContextRepository, SuspiciousMessageRepository, UserRepository,
};

#[derive(Default)]
pub struct InMemoryGroupRepository {
    groups: DashMap<i64, GroupInfo>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupContextRepository for InMemoryGroupRepository {
    async fn get_group(&self, group_id: i64) -> Result<Option<GroupInfo>, StoreError> {
        Ok(self.groups.get(&group_id).map(|g| g.value().clone()))
    }

    async fn upsert_group(&self, group: &GroupInfo) -> Result<(), StoreError> {
        let mut stored = group.clone();
        stored.updated_at = Utc::now();
        if let Some(existing) = self.groups.get(&group.group_id) {
            stored.created_at = existing.created_at;
        }
        self.groups.insert(group.group_id, stored);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<i64, User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn upsert_user(&self, user_id: i64, first_name: &str) -> Result<User, StoreError> {
        let now = Utc::now();
        let mut entry = self.users.entry(user_id).or_insert_with(|| User {
            user_id,
            first_name: first_name.to_string(),
            social_credit: 0.0,
            created_at: now,
            updated_at: now,
        });
        entry.first_name = first_name.to_string();
        entry.updated_at = now;
        Ok(entry.clone())
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&user_id).map(|u| u.value().clone()))
    }
}

#[derive(Default)]
pub struct InMemorySuspiciousMessageRepository {
    entries: RwLock<Vec<SuspiciousMessage>>,
}

impl InMemorySuspiciousMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SuspiciousMessageRepository for InMemorySuspiciousMessageRepository {
    async fn record(&self, entry: &SuspiciousMessage) -> Result<(), StoreError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<SuspiciousMessage>, StoreError> {
        let entries = self.entries.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(entries
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn user_upsert_refreshes_name_and_keeps_created_at() {
        let repo = InMemoryUserRepository::new();
        let first = repo.upsert_user(7, "Ali").await.unwrap();
        let second = repo.upsert_user(7, "Ali R.").await.unwrap();
        assert_eq!(second.first_name, "Ali R.");
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(repo.get_user(7).await.unwrap().unwrap().first_name, "Ali R.");
        assert!(repo.get_user(8).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn group_context_uses_defaults_for_blank_fields() {
        let repo = InMemoryGroupRepository::new();
        assert!(repo.get_context(1, "Unknown Group", "none").await.unwrap().is_none());

        repo.upsert_group(&GroupInfo::new(1, "Go Devs", "", Some(42))).await.unwrap();
        let ctx = repo.get_context(1, "Unknown Group", "none").await.unwrap().unwrap();
        assert_eq!(ctx.title, "Go Devs");
        assert_eq!(ctx.rules_text, "none");
    }
}
