use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;

use crate::store::error::StoreError;
use crate::store::models::Withdrawal;

pub type DynWithdrawalStore = Arc<dyn WithdrawalStore + Send + Sync>;

/// Result of the approve-with-debit transaction.
#[derive(Debug)]
pub enum DebitOutcome {
    /// Balance debited and status flipped, both committed together.
    Approved(Withdrawal),
    /// Wallet balance below the requested amount; nothing changed.
    InsufficientFunds,
    /// The row was no longer pending; nothing changed.
    NotPending,
}

/// Query and mutation surface for withdrawal transfer requests.
#[async_trait]
pub trait WithdrawalStore {
    async fn list(&self, status: Option<&str>) -> Result<Vec<Withdrawal>, StoreError>;
    async fn find(&self, id: i64) -> Result<Option<Withdrawal>, StoreError>;

    /// Debit the owner's wallet and flip the status to approved in one
    /// store-side transaction. The debit is a single conditioned UPDATE
    /// (amount >= requested), never a read-modify-write, and it is ordered
    /// before the status flip; if either side refuses, the whole
    /// transaction rolls back.
    async fn approve_with_debit(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<DebitOutcome, StoreError>;

    async fn mark_rejected_if_pending(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Withdrawal>, StoreError>;
    async fn count(&self, status: Option<&str>) -> Result<i64, StoreError>;
    async fn total_amount(&self) -> Result<Decimal, StoreError>;
}

pub struct PgWithdrawalStore {
    pool: PgPool,
}

impl PgWithdrawalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WithdrawalStore for PgWithdrawalStore {
    async fn list(&self, status: Option<&str>) -> Result<Vec<Withdrawal>, StoreError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, Withdrawal>(
                    "SELECT * FROM withdrawals WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Withdrawal>("SELECT * FROM withdrawals ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn find(&self, id: i64) -> Result<Option<Withdrawal>, StoreError> {
        let row = sqlx::query_as::<_, Withdrawal>("SELECT * FROM withdrawals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn approve_with_debit(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<DebitOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so the debit below is keyed off consistent values.
        let wd = sqlx::query_as::<_, Withdrawal>(
            "SELECT * FROM withdrawals WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let wd = match wd {
            Some(wd) if wd.status == "pending" => wd,
            Some(_) => {
                tx.rollback().await?;
                return Ok(DebitOutcome::NotPending);
            }
            None => {
                tx.rollback().await?;
                return Ok(DebitOutcome::NotPending);
            }
        };

        // Conditioned debit: only applies while the balance covers the
        // amount, so the wallet can never go negative.
        let debited = sqlx::query(
            "UPDATE wallets SET amount = amount - $3 \
             WHERE user_id = $1 AND coin = $2 AND amount >= $3",
        )
        .bind(wd.user_id)
        .bind(&wd.coin)
        .bind(wd.amount)
        .execute(&mut *tx)
        .await?;

        if debited.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(DebitOutcome::InsufficientFunds);
        }

        let updated = sqlx::query_as::<_, Withdrawal>(
            "UPDATE withdrawals SET status = 'approved', processed_at = $2 \
             WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&mut *tx)
        .await?;

        match updated {
            Some(row) => {
                tx.commit().await?;
                Ok(DebitOutcome::Approved(row))
            }
            None => {
                tx.rollback().await?;
                Ok(DebitOutcome::NotPending)
            }
        }
    }

    async fn mark_rejected_if_pending(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Withdrawal>, StoreError> {
        let row = sqlx::query_as::<_, Withdrawal>(
            "UPDATE withdrawals SET status = 'rejected', processed_at = $2 \
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
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM withdrawals WHERE status = $1")
                    .bind(status)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM withdrawals")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(n)
    }

    async fn total_amount(&self) -> Result<Decimal, StoreError> {
        let total =
            sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(amount), 0) FROM withdrawals")
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }
}
