// File: warden-core/src/test_utils/helpers.rs

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, Pool, Postgres};
use tracing::info;
use warden_ai::{ModelProvider, ResponseSchema};
use warden_common::error::StoreError;
use warden_common::models::{HistoryRecord, Message, OutboundAction};
use warden_common::traits::repository_traits::HistoryRepository;
use warden_common::CapabilityError;

use crate::db::Database;
use crate::services::moderation::ActionExecutor;
use crate::Error;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Capability double: answers each response schema from a queue of canned
/// results and records every prompt it was given.
#[derive(Default)]
pub struct ScriptedProvider {
    queues: Mutex<HashMap<String, VecDeque<Result<Value, CapabilityError>>>>,
    fallbacks: Mutex<HashMap<String, Value>>,
    delays: Mutex<HashMap<String, Duration>>,
    prompts: Mutex<Vec<(String, String)>>,
    total: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one answer for `schema`.
    pub fn push(&self, schema: &str, answer: Value) {
        lock(&self.queues).entry(schema.to_string()).or_default().push_back(Ok(answer));
    }

    pub fn push_error(&self, schema: &str, error: CapabilityError) {
        lock(&self.queues).entry(schema.to_string()).or_default().push_back(Err(error));
    }

    /// Answer used whenever the queue for `schema` is empty.
    pub fn set_fallback(&self, schema: &str, answer: Value) {
        lock(&self.fallbacks).insert(schema.to_string(), answer);
    }

    pub fn set_delay(&self, schema: &str, delay: Duration) {
        lock(&self.delays).insert(schema.to_string(), delay);
    }

    pub fn calls(&self, schema: &str) -> usize {
        lock(&self.prompts).iter().filter(|(s, _)| s == schema).count()
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Prompts sent for `schema`, in call order.
    pub fn prompts(&self, schema: &str) -> Vec<String> {
        lock(&self.prompts)
            .iter()
            .filter(|(s, _)| s == schema)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, prompt: &str, schema: &ResponseSchema) -> Result<Value, CapabilityError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        lock(&self.prompts).push((schema.name.clone(), prompt.to_string()));

        let delay = lock(&self.delays).get(&schema.name).copied();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }

        let queued = lock(&self.queues).get_mut(&schema.name).and_then(|q| q.pop_front());
        match queued {
            Some(result) => result,
            None => lock(&self.fallbacks)
                .get(&schema.name)
                .cloned()
                .ok_or_else(|| CapabilityError::Provider(format!("no scripted answer for '{}'", schema.name))),
        }
    }
}

/// Executor double that keeps every action it was asked to perform.
#[derive(Default)]
pub struct RecordingExecutor {
    actions: Mutex<Vec<OutboundAction>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<OutboundAction> {
        lock(&self.actions).clone()
    }
}

#[async_trait]
impl ActionExecutor for RecordingExecutor {
    async fn execute(&self, action: &OutboundAction) -> Result<(), Error> {
        lock(&self.actions).push(action.clone());
        Ok(())
    }
}

/// History store whose reads and/or writes always fail.
#[derive(Default)]
pub struct FailingHistoryStore {
    pub fail_reads: bool,
    pub fail_writes: bool,
    appends_attempted: AtomicUsize,
}

impl FailingHistoryStore {
    pub fn new(fail_reads: bool, fail_writes: bool) -> Self {
        Self {
            fail_reads,
            fail_writes,
            appends_attempted: AtomicUsize::new(0),
        }
    }

    pub fn appends_attempted(&self) -> usize {
        self.appends_attempted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryRepository for FailingHistoryStore {
    async fn append(&self, record: &HistoryRecord) -> Result<HistoryRecord, StoreError> {
        self.appends_attempted.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(StoreError::Unavailable("history store is down".to_string()));
        }
        Ok(record.clone())
    }

    async fn recent_window(
        &self,
        _user_id: i64,
        _group_id: i64,
        _max_count: usize,
        _max_age: chrono::Duration,
        _now: DateTime<Utc>,
    ) -> Result<Vec<HistoryRecord>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable("history store is down".to_string()));
        }
        Ok(Vec::new())
    }

    async fn prune(&self, _user_id: i64, _group_id: i64, _keep_count: usize) -> Result<u64, StoreError> {
        Ok(0)
    }

    async fn prune_all(&self, _keep_count: usize) -> Result<u64, StoreError> {
        Ok(0)
    }
}

/// A group message from `user_id` in `group_id`, sent at `created_at`.
pub fn group_message(user_id: i64, group_id: i64, text: &str, created_at: DateTime<Utc>) -> Message {
    Message {
        message_id: Some(created_at.timestamp_millis()),
        user_id,
        group_id,
        sender_name: format!("user{}", user_id),
        text: text.to_string(),
        created_at,
        reply_to_id: None,
        reply_to_text: None,
    }
}

/// Create the test database if it does not exist yet.
pub async fn ensure_test_database_exists() -> Result<(), Error> {
    let admin_url = std::env::var("DATABASE_ADMIN_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/postgres".to_string());

    let mut conn = PgConnection::connect(&admin_url).await?;

    let test_db = "warden_test";
    let create_db_sql = format!("CREATE DATABASE {test_db};");
    match sqlx::query(&create_db_sql).execute(&mut conn).await {
        Ok(_) => info!("Created test DB '{test_db}'."),
        Err(e) => {
            // 42P04 => "duplicate_database"
            let duplicate = e
                .as_database_error()
                .and_then(|db_err| db_err.code())
                .is_some_and(|code| code == "42P04");
            if !duplicate {
                return Err(e.into());
            }
        }
    }

    Ok(())
}

/// Create a connection pool to the test DB.
/// By default looks for `TEST_DATABASE_URL` in env,
/// else uses `postgres://postgres@localhost/warden_test`.
pub async fn create_test_db_pool() -> Result<Pool<Postgres>, Error> {
    let url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/warden_test".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    Ok(pool)
}

/// Wipes out test data so each test can start fresh.
pub async fn clean_database(pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query(
        r#"
        TRUNCATE TABLE
            users,
            group_info,
            user_group_messages,
            suspicious_messages
        RESTART IDENTITY CASCADE;
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns a migrated, empty test DB handle.
pub async fn setup_test_database() -> Result<Database, Error> {
    ensure_test_database_exists().await?;

    let pool = create_test_db_pool().await?;
    let db = Database::from_pool(pool);
    db.migrate().await?;
    clean_database(db.pool()).await?;

    Ok(db)
}
