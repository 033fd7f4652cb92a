use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::store::error::StoreError;
use crate::store::models::{Profile, ProfileFields};

pub type DynProfileStore = Arc<dyn ProfileStore + Send + Sync>;

/// Local user table (profiles). This is the second stop in the recipient
/// resolution chain, after the address on the transfer request itself.
#[async_trait]
pub trait ProfileStore {
    async fn list(&self, limit: i64) -> Result<Vec<Profile>, StoreError>;
    async fn find(&self, id: Uuid) -> Result<Option<Profile>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError>;
    async fn email_for(&self, id: Uuid) -> Result<Option<String>, StoreError>;
    async fn emails(&self) -> Result<Vec<String>, StoreError>;
    /// Insert or replace the profile row keyed by id.
    async fn upsert(&self, fields: ProfileFields) -> Result<Profile, StoreError>;
    async fn update_status(&self, id: Uuid, status: &str) -> Result<Option<Profile>, StoreError>;
    async fn count_all(&self) -> Result<i64, StoreError>;
    async fn count_with_status(&self, status: &str) -> Result<i64, StoreError>;
    async fn count_without_status(&self, status: &str) -> Result<i64, StoreError>;
}

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn list(&self, limit: i64) -> Result<Vec<Profile>, StoreError> {
        let rows = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn email_for(&self, id: Uuid) -> Result<Option<String>, StoreError> {
        let email = sqlx::query_scalar::<_, String>("SELECT email FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(email)
    }

    async fn emails(&self) -> Result<Vec<String>, StoreError> {
        let emails =
            sqlx::query_scalar::<_, String>("SELECT email FROM profiles ORDER BY email ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(emails)
    }

    async fn upsert(&self, fields: ProfileFields) -> Result<Profile, StoreError> {
        let row = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (id, email, username, first_name, last_name, status) \
             VALUES ($1, $2, $3, $4, $5, 'active') \
             ON CONFLICT (id) DO UPDATE SET \
                 email = EXCLUDED.email, username = EXCLUDED.username, \
                 first_name = EXCLUDED.first_name, last_name = EXCLUDED.last_name \
             RETURNING *",
        )
        .bind(fields.id)
        .bind(&fields.email)
        .bind(&fields.username)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_status(&self, id: Uuid, status: &str) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn count_with_status(&self, status: &str) -> Result<i64, StoreError> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn count_without_status(&self, status: &str) -> Result<i64, StoreError> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles WHERE status <> $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
