use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::store::error::StoreError;
use crate::store::models::{InvestmentPlan, PlanFields};

pub type DynPlanStore = Arc<dyn PlanStore + Send + Sync>;

/// Investment plan administration.
#[async_trait]
pub trait PlanStore {
    async fn list(&self) -> Result<Vec<InvestmentPlan>, StoreError>;
    async fn find(&self, id: i64) -> Result<Option<InvestmentPlan>, StoreError>;
    async fn create(&self, fields: PlanFields) -> Result<InvestmentPlan, StoreError>;
    async fn update(&self, id: i64, fields: PlanFields)
        -> Result<Option<InvestmentPlan>, StoreError>;
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
    async fn count(&self) -> Result<i64, StoreError>;
}

pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn list(&self) -> Result<Vec<InvestmentPlan>, StoreError> {
        let rows = sqlx::query_as::<_, InvestmentPlan>(
            "SELECT * FROM investment_plans ORDER BY min_amount ASC NULLS LAST",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: i64) -> Result<Option<InvestmentPlan>, StoreError> {
        let row = sqlx::query_as::<_, InvestmentPlan>("SELECT * FROM investment_plans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, fields: PlanFields) -> Result<InvestmentPlan, StoreError> {
        let row = sqlx::query_as::<_, InvestmentPlan>(
            "INSERT INTO investment_plans \
             (name, percentage, min_amount, max_amount, duration_days, duration_hours, badge, key, sort_order, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(&fields.name)
        .bind(fields.percentage)
        .bind(fields.min_amount)
        .bind(fields.max_amount)
        .bind(fields.duration_days)
        .bind(fields.duration_hours)
        .bind(&fields.badge)
        .bind(&fields.key)
        .bind(fields.sort_order)
        .bind(fields.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        fields: PlanFields,
    ) -> Result<Option<InvestmentPlan>, StoreError> {
        let row = sqlx::query_as::<_, InvestmentPlan>(
            "UPDATE investment_plans \
             SET name = $2, percentage = $3, min_amount = $4, max_amount = $5, duration_days = $6, \
                 duration_hours = $7, badge = $8, key = $9, sort_order = $10, is_active = $11 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&fields.name)
        .bind(fields.percentage)
        .bind(fields.min_amount)
        .bind(fields.max_amount)
        .bind(fields.duration_days)
        .bind(fields.duration_hours)
        .bind(&fields.badge)
        .bind(&fields.key)
        .bind(fields.sort_order)
        .bind(fields.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM investment_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM investment_plans")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
