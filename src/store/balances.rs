use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::store::error::StoreError;

pub type DynBalanceStore = Arc<dyn BalanceStore + Send + Sync>;

/// Read-only view over per-user wallet balances. The only mutation path is
/// the conditioned debit inside `WithdrawalStore::approve_with_debit`; the
/// application never reads a balance and writes it back.
#[async_trait]
pub trait BalanceStore {
    async fn amount(&self, user_id: Uuid, coin: &str) -> Result<Option<Decimal>, StoreError>;
}

pub struct PgBalanceStore {
    pool: PgPool,
}

impl PgBalanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BalanceStore for PgBalanceStore {
    async fn amount(&self, user_id: Uuid, coin: &str) -> Result<Option<Decimal>, StoreError> {
        let amount = sqlx::query_scalar::<_, Decimal>(
            "SELECT amount FROM wallets WHERE user_id = $1 AND coin = $2",
        )
        .bind(user_id)
        .bind(coin)
        .fetch_optional(&self.pool)
        .await?;
        Ok(amount)
    }
}
