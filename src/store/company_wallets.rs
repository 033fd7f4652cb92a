use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::store::error::StoreError;
use crate::store::models::{CompanyWallet, CompanyWalletFields};

pub type DynCompanyWalletStore = Arc<dyn CompanyWalletStore + Send + Sync>;

/// Company deposit wallet administration.
#[async_trait]
pub trait CompanyWalletStore {
    /// List wallets ordered by coin, optionally filtered by a free-text
    /// query matched against coin, label, address and memo tag.
    async fn list(&self, query: Option<&str>) -> Result<Vec<CompanyWallet>, StoreError>;
    async fn find(&self, id: i64) -> Result<Option<CompanyWallet>, StoreError>;
    async fn create(&self, fields: CompanyWalletFields) -> Result<CompanyWallet, StoreError>;
    async fn update(
        &self,
        id: i64,
        fields: CompanyWalletFields,
    ) -> Result<Option<CompanyWallet>, StoreError>;
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
    async fn toggle_active(&self, id: i64) -> Result<Option<CompanyWallet>, StoreError>;

    /// Make one wallet the default for its coin. A single conditioned
    /// update flips every row of the coin at once, so concurrent calls can
    /// never leave zero or two defaults.
    async fn set_default(&self, id: i64, coin: &str) -> Result<(), StoreError>;
}

pub struct PgCompanyWalletStore {
    pool: PgPool,
}

impl PgCompanyWalletStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyWalletStore for PgCompanyWalletStore {
    async fn list(&self, query: Option<&str>) -> Result<Vec<CompanyWallet>, StoreError> {
        let rows = match query {
            Some(q) if !q.is_empty() => {
                let needle = format!("%{}%", q);
                sqlx::query_as::<_, CompanyWallet>(
                    "SELECT * FROM company_deposit_wallets \
                     WHERE coin ILIKE $1 OR label ILIKE $1 OR address ILIKE $1 OR memo_tag ILIKE $1 \
                     ORDER BY coin ASC",
                )
                .bind(needle)
                .fetch_all(&self.pool)
                .await?
            }
            _ => {
                sqlx::query_as::<_, CompanyWallet>(
                    "SELECT * FROM company_deposit_wallets ORDER BY coin ASC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    async fn find(&self, id: i64) -> Result<Option<CompanyWallet>, StoreError> {
        let row =
            sqlx::query_as::<_, CompanyWallet>("SELECT * FROM company_deposit_wallets WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn create(&self, fields: CompanyWalletFields) -> Result<CompanyWallet, StoreError> {
        let row = sqlx::query_as::<_, CompanyWallet>(
            "INSERT INTO company_deposit_wallets (coin, address, memo_tag, label, is_active, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&fields.coin)
        .bind(&fields.address)
        .bind(&fields.memo_tag)
        .bind(&fields.label)
        .bind(fields.is_active)
        .bind(fields.is_default)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        fields: CompanyWalletFields,
    ) -> Result<Option<CompanyWallet>, StoreError> {
        let row = sqlx::query_as::<_, CompanyWallet>(
            "UPDATE company_deposit_wallets \
             SET coin = $2, address = $3, memo_tag = $4, label = $5, is_active = $6, is_default = $7 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&fields.coin)
        .bind(&fields.address)
        .bind(&fields.memo_tag)
        .bind(&fields.label)
        .bind(fields.is_active)
        .bind(fields.is_default)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM company_deposit_wallets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn toggle_active(&self, id: i64) -> Result<Option<CompanyWallet>, StoreError> {
        let row = sqlx::query_as::<_, CompanyWallet>(
            "UPDATE company_deposit_wallets SET is_active = NOT is_active \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn set_default(&self, id: i64, coin: &str) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE company_deposit_wallets SET is_default = (id = $1) WHERE coin = $2",
        )
        .bind(id)
        .bind(coin)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
