// src/repositories/postgres/group_info.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use warden_common::error::StoreError;
use warden_common::models::GroupInfo;
use warden_common::traits::repository_traits::GroupContextRepository;

#[derive(Clone)]
pub struct PostgresGroupRepository {
    pool: Pool<Postgres>,
}

impl PostgresGroupRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupContextRepository for PostgresGroupRepository {
    async fn get_group(&self, group_id: i64) -> Result<Option<GroupInfo>, StoreError> {
        let group = sqlx::query_as::<_, GroupInfo>(
            r#"
            SELECT group_id,
                   title,
                   description,
                   rules_text,
                   owner_id,
                   created_at,
                   updated_at
            FROM group_info
            WHERE group_id = $1
            "#
        )
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    async fn upsert_group(&self, group: &GroupInfo) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO group_info (
                group_id,
                title,
                description,
                rules_text,
                owner_id,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (group_id) DO UPDATE
               SET title = EXCLUDED.title,
                   description = EXCLUDED.description,
                   rules_text = EXCLUDED.rules_text,
                   owner_id = EXCLUDED.owner_id,
                   updated_at = EXCLUDED.updated_at
            "#
        )
            .bind(group.group_id)
            .bind(&group.title)
            .bind(&group.description)
            .bind(&group.rules_text)
            .bind(group.owner_id)
            .bind(group.created_at)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
