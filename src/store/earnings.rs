use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;

use crate::store::error::StoreError;
use crate::store::models::{Earning, EarningFields};

pub type DynEarningStore = Arc<dyn EarningStore + Send + Sync>;

/// Manual earning credits, keyed by user email.
#[async_trait]
pub trait EarningStore {
    async fn recent(&self, limit: i64) -> Result<Vec<Earning>, StoreError>;
    async fn for_user_email(&self, email: &str) -> Result<Vec<Earning>, StoreError>;
    async fn insert(&self, fields: EarningFields) -> Result<Earning, StoreError>;
    async fn total_amount(&self) -> Result<Decimal, StoreError>;
}

pub struct PgEarningStore {
    pool: PgPool,
}

impl PgEarningStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EarningStore for PgEarningStore {
    async fn recent(&self, limit: i64) -> Result<Vec<Earning>, StoreError> {
        let rows = sqlx::query_as::<_, Earning>(
            "SELECT * FROM earnings ORDER BY credited_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn for_user_email(&self, email: &str) -> Result<Vec<Earning>, StoreError> {
        let rows = sqlx::query_as::<_, Earning>(
            "SELECT * FROM earnings WHERE user_email = $1 ORDER BY credited_at DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, fields: EarningFields) -> Result<Earning, StoreError> {
        let row = sqlx::query_as::<_, Earning>(
            "INSERT INTO earnings (user_email, amount, note, credited_at) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&fields.user_email)
        .bind(fields.amount)
        .bind(&fields.note)
        .bind(fields.credited_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn total_amount(&self) -> Result<Decimal, StoreError> {
        let total =
            sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(amount), 0) FROM earnings")
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }
}
