// src/repositories/postgres/suspicious_message.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use warden_common::error::StoreError;
use warden_common::models::SuspiciousMessage;
use warden_common::traits::repository_traits::SuspiciousMessageRepository;

#[derive(Clone)]
pub struct PostgresSuspiciousMessageRepository {
    pool: Pool<Postgres>,
}

impl PostgresSuspiciousMessageRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SuspiciousMessageRepository for PostgresSuspiciousMessageRepository {
    async fn record(&self, entry: &SuspiciousMessage) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO suspicious_messages (
                suspicious_id,
                user_id,
                group_id,
                text,
                category,
                confidence,
                severity,
                reasoning,
                flagged_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#
        )
            .bind(entry.suspicious_id)
            .bind(entry.user_id)
            .bind(entry.group_id)
            .bind(&entry.text)
            .bind(&entry.category)
            .bind(&entry.confidence)
            .bind(&entry.severity)
            .bind(&entry.reasoning)
            .bind(entry.flagged_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<SuspiciousMessage>, StoreError> {
        let rows = sqlx::query_as::<_, SuspiciousMessage>(
            r#"
            SELECT suspicious_id,
                   user_id,
                   group_id,
                   text,
                   category,
                   confidence,
                   severity,
                   reasoning,
                   flagged_at
            FROM suspicious_messages
            WHERE user_id = $1
            ORDER BY flagged_at DESC
            LIMIT $2
            "#
        )
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
