use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Transfer request statuses. Stored as plain text in the database; these
/// constants are the only values the console ever writes.
pub mod status {
    pub const PENDING: &str = "pending";
    pub const APPROVED: &str = "approved";
    pub const REJECTED: &str = "rejected";
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Deposit {
    pub id: i64,
    pub user_id: Uuid,
    pub user_email: Option<String>,
    pub coin: String,
    pub amount: Decimal,
    pub txid: Option<String>,
    pub address_used: Option<String>,
    pub confirmations: Option<i32>,
    pub note: Option<String>,
    pub plan_id: Option<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: i64,
    pub user_id: Uuid,
    pub user_email: Option<String>,
    pub coin: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub to_address: Option<String>,
    pub txid: Option<String>,
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CompanyWallet {
    pub id: i64,
    pub coin: String,
    pub address: String,
    pub memo_tag: Option<String>,
    pub label: Option<String>,
    pub is_active: bool,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InvestmentPlan {
    pub id: i64,
    pub name: String,
    pub percentage: Decimal,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub duration_days: Option<i32>,
    pub duration_hours: Option<i32>,
    pub badge: Option<String>,
    pub key: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Earning {
    pub id: i64,
    pub user_email: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub credited_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating or replacing an investment plan
#[derive(Debug, Clone, Default)]
pub struct PlanFields {
    pub name: String,
    pub percentage: Decimal,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub duration_days: Option<i32>,
    pub duration_hours: Option<i32>,
    pub badge: Option<String>,
    pub key: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: bool,
}

/// Fields for creating or replacing a company deposit wallet
#[derive(Debug, Clone, Default)]
pub struct CompanyWalletFields {
    pub coin: String,
    pub address: String,
    pub memo_tag: Option<String>,
    pub label: Option<String>,
    pub is_active: bool,
    pub is_default: bool,
}

/// Fields for a new profile row
#[derive(Debug, Clone)]
pub struct ProfileFields {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Fields for a manual earning credit
#[derive(Debug, Clone)]
pub struct EarningFields {
    pub user_email: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub credited_at: DateTime<Utc>,
}
