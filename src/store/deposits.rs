use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;

use crate::store::error::StoreError;
use crate::store::models::Deposit;

pub type DynDepositStore = Arc<dyn DepositStore + Send + Sync>;

/// Query and mutation surface for deposit transfer requests.
///
/// `mark_if_pending` is the compare-and-swap primitive the approval workflow
/// relies on: the update only takes effect while the row is still pending,
/// so a lost race shows up as `None` instead of a double transition.
#[async_trait]
pub trait DepositStore {
    async fn list(&self, status: Option<&str>) -> Result<Vec<Deposit>, StoreError>;
    async fn find(&self, id: i64) -> Result<Option<Deposit>, StoreError>;
    async fn mark_approved_if_pending(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Deposit>, StoreError>;
    async fn mark_rejected_if_pending(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Deposit>, StoreError>;
    async fn count(&self, status: Option<&str>) -> Result<i64, StoreError>;
    async fn total_amount(&self) -> Result<Decimal, StoreError>;
}

pub struct PgDepositStore {
    pool: PgPool,
}

impl PgDepositStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DepositStore for PgDepositStore {
    async fn list(&self, status: Option<&str>) -> Result<Vec<Deposit>, StoreError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, Deposit>(
                    "SELECT * FROM deposits WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Deposit>("SELECT * FROM deposits ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn find(&self, id: i64) -> Result<Option<Deposit>, StoreError> {
        let row = sqlx::query_as::<_, Deposit>("SELECT * FROM deposits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn mark_approved_if_pending(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Deposit>, StoreError> {
        let row = sqlx::query_as::<_, Deposit>(
            "UPDATE deposits SET status = 'approved', approved_at = $2, updated_at = $2 \
             WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn mark_rejected_if_pending(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Deposit>, StoreError> {
        let row = sqlx::query_as::<_, Deposit>(
            "UPDATE deposits SET status = 'rejected', updated_at = $2 \
             WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn count(&self, status: Option<&str>) -> Result<i64, StoreError> {
        let n = match status {
            Some(status) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM deposits WHERE status = $1")
                    .bind(status)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM deposits")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(n)
    }

    async fn total_amount(&self) -> Result<Decimal, StoreError> {
        let total =
            sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(amount), 0) FROM deposits")
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }
}
