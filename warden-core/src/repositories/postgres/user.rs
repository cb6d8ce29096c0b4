// src/repositories/postgres/user.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use warden_common::error::StoreError;
use warden_common::models::User;
use warden_common::traits::repository_traits::UserRepository;

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: Pool<Postgres>,
}

impl PostgresUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn upsert_user(&self, user_id: i64, first_name: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, first_name)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
               SET first_name = EXCLUDED.first_name,
                   updated_at = now()
            RETURNING user_id, first_name, social_credit, created_at, updated_at
            "#
        )
            .bind(user_id)
            .bind(first_name)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, first_name, social_credit, created_at, updated_at
            FROM users
            WHERE user_id = $1
            "#
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
