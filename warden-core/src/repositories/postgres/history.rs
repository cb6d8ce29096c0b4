// src/repositories/postgres/history.rs

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use warden_common::error::StoreError;
use warden_common::models::{window_cutoff, HistoryRecord};
use warden_common::traits::repository_traits::HistoryRepository;

/// History window backed by the `user_group_messages` table.
#[derive(Clone)]
pub struct PostgresHistoryRepository {
    pool: Pool<Postgres>,
}

impl PostgresHistoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_record(r: &PgRow) -> Result<HistoryRecord, sqlx::Error> {
    Ok(HistoryRecord {
        record_id: r.try_get("record_id")?,
        user_id: r.try_get("user_id")?,
        group_id: r.try_get("group_id")?,
        message_id: r.try_get("message_id")?,
        sender_name: r.try_get("sender_name")?,
        text: r.try_get("text")?,
        message_created_at: r.try_get::<DateTime<Utc>, _>("message_created_at")?,
        reply_to_id: r.try_get("reply_to_id")?,
        reply_to_text: r.try_get("reply_to_text")?,
        inserted_at: r.try_get::<DateTime<Utc>, _>("inserted_at")?,
    })
}

#[async_trait]
impl HistoryRepository for PostgresHistoryRepository {
    async fn append(&self, record: &HistoryRecord) -> Result<HistoryRecord, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO user_group_messages (
                user_id,
                group_id,
                message_id,
                sender_name,
                text,
                message_created_at,
                reply_to_id,
                reply_to_text,
                inserted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING record_id, inserted_at
            "#
        )
            .bind(record.user_id)
            .bind(record.group_id)
            .bind(record.message_id)
            .bind(&record.sender_name)
            .bind(&record.text)
            .bind(record.message_created_at)
            .bind(record.reply_to_id)
            .bind(&record.reply_to_text)
            .bind(record.inserted_at)
            .fetch_one(&self.pool)
            .await?;

        let mut stored = record.clone();
        stored.record_id = row.try_get("record_id")?;
        stored.inserted_at = row.try_get::<DateTime<Utc>, _>("inserted_at")?;
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
        let cutoff = window_cutoff(now, max_age);
        let rows = sqlx::query(
            r#"
            SELECT record_id,
                   user_id,
                   group_id,
                   message_id,
                   sender_name,
                   text,
                   message_created_at,
                   reply_to_id,
                   reply_to_text,
                   inserted_at
            FROM user_group_messages
            WHERE user_id = $1
              AND group_id = $2
              AND message_created_at >= $3
            ORDER BY message_created_at DESC, record_id DESC
            LIMIT $4
            "#
        )
            .bind(user_id)
            .bind(group_id)
            .bind(cutoff)
            .bind(max_count as i64)
            .fetch_all(&self.pool)
            .await?;

        let mut records = rows
            .iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()?;
        // newest-first from the index; callers want chronological order
        records.reverse();
        Ok(records)
    }

    async fn prune(&self, user_id: i64, group_id: i64, keep_count: usize) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_group_messages
            WHERE user_id = $1
              AND group_id = $2
              AND record_id NOT IN (
                  SELECT record_id
                  FROM user_group_messages
                  WHERE user_id = $1
                    AND group_id = $2
                  ORDER BY message_created_at DESC, record_id DESC
                  LIMIT $3
              )
            "#
        )
            .bind(user_id)
            .bind(group_id)
            .bind(keep_count as i64)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn prune_all(&self, keep_count: usize) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_group_messages
            WHERE record_id IN (
                SELECT record_id
                FROM (
                    SELECT record_id,
                           ROW_NUMBER() OVER (
                               PARTITION BY user_id, group_id
                               ORDER BY message_created_at DESC, record_id DESC
                           ) AS rn
                    FROM user_group_messages
                ) ranked
                WHERE ranked.rn > $1
            )
            "#
        )
            .bind(keep_count as i64)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
