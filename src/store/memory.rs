//! In-memory implementation of every store trait, backing the test suite.
//! All state lives behind one mutex, so the conditional-update and
//! debit-then-flip semantics are atomic exactly like their store-side
//! counterparts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::store::balances::BalanceStore;
use crate::store::company_wallets::CompanyWalletStore;
use crate::store::deposits::DepositStore;
use crate::store::directory::UserDirectory;
use crate::store::earnings::EarningStore;
use crate::store::error::StoreError;
use crate::store::models::{
    status, CompanyWallet, CompanyWalletFields, Deposit, Earning, EarningFields, InvestmentPlan,
    PlanFields, Profile, ProfileFields, Withdrawal,
};
use crate::store::plans::PlanStore;
use crate::store::profiles::ProfileStore;
use crate::store::withdrawals::{DebitOutcome, WithdrawalStore};

#[derive(Default)]
struct Inner {
    deposits: Vec<Deposit>,
    withdrawals: Vec<Withdrawal>,
    balances: HashMap<(Uuid, String), Decimal>,
    company_wallets: Vec<CompanyWallet>,
    plans: Vec<InvestmentPlan>,
    profiles: Vec<Profile>,
    earnings: Vec<Earning>,
    directory: HashMap<Uuid, String>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- seeding helpers -------------------------------------------------

    pub fn seed_deposit(&self, user_id: Uuid, coin: &str, amount: Decimal) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.deposits.push(Deposit {
            id,
            user_id,
            user_email: None,
            coin: coin.to_string(),
            amount,
            txid: None,
            address_used: None,
            confirmations: None,
            note: None,
            plan_id: None,
            status: status::PENDING.to_string(),
            created_at: Utc::now(),
            approved_at: None,
            updated_at: None,
        });
        id
    }

    pub fn seed_deposit_with_email(
        &self,
        user_id: Uuid,
        coin: &str,
        amount: Decimal,
        email: &str,
    ) -> i64 {
        let id = self.seed_deposit(user_id, coin, amount);
        let mut inner = self.inner.lock().unwrap();
        if let Some(dep) = inner.deposits.iter_mut().find(|d| d.id == id) {
            dep.user_email = Some(email.to_string());
        }
        id
    }

    pub fn seed_withdrawal(
        &self,
        user_id: Uuid,
        coin: &str,
        amount: Decimal,
        fee: Decimal,
    ) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.withdrawals.push(Withdrawal {
            id,
            user_id,
            user_email: None,
            coin: coin.to_string(),
            amount,
            fee,
            to_address: Some("addr-1".to_string()),
            txid: None,
            note: None,
            status: status::PENDING.to_string(),
            created_at: Utc::now(),
            processed_at: None,
        });
        id
    }

    pub fn set_balance(&self, user_id: Uuid, coin: &str, amount: Decimal) {
        let mut inner = self.inner.lock().unwrap();
        inner.balances.insert((user_id, coin.to_string()), amount);
    }

    pub fn balance(&self, user_id: Uuid, coin: &str) -> Option<Decimal> {
        let inner = self.inner.lock().unwrap();
        inner.balances.get(&(user_id, coin.to_string())).copied()
    }

    pub fn seed_profile(&self, id: Uuid, email: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.profiles.push(Profile {
            id,
            email: email.to_string(),
            username: None,
            first_name: None,
            last_name: None,
            status: "active".to_string(),
            created_at: Utc::now(),
        });
    }

    pub fn seed_directory_email(&self, id: Uuid, email: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.directory.insert(id, email.to_string());
    }

    pub fn deposit(&self, id: i64) -> Option<Deposit> {
        let inner = self.inner.lock().unwrap();
        inner.deposits.iter().find(|d| d.id == id).cloned()
    }

    pub fn withdrawal(&self, id: i64) -> Option<Withdrawal> {
        let inner = self.inner.lock().unwrap();
        inner.withdrawals.iter().find(|w| w.id == id).cloned()
    }
}

#[async_trait]
impl DepositStore for MemoryStore {
    async fn list(&self, status: Option<&str>) -> Result<Vec<Deposit>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Deposit> = inner
            .deposits
            .iter()
            .filter(|d| status.map_or(true, |s| d.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find(&self, id: i64) -> Result<Option<Deposit>, StoreError> {
        Ok(self.deposit(id))
    }

    async fn mark_approved_if_pending(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Deposit>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .deposits
            .iter_mut()
            .find(|d| d.id == id && d.status == status::PENDING)
        {
            Some(dep) => {
                dep.status = status::APPROVED.to_string();
                dep.approved_at = Some(at);
                dep.updated_at = Some(at);
                Ok(Some(dep.clone()))
            }
            None => Ok(None),
        }
    }

    async fn mark_rejected_if_pending(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Deposit>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .deposits
            .iter_mut()
            .find(|d| d.id == id && d.status == status::PENDING)
        {
            Some(dep) => {
                dep.status = status::REJECTED.to_string();
                dep.updated_at = Some(at);
                Ok(Some(dep.clone()))
            }
            None => Ok(None),
        }
    }

    async fn count(&self, status: Option<&str>) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .deposits
            .iter()
            .filter(|d| status.map_or(true, |s| d.status == s))
            .count() as i64)
    }

    async fn total_amount(&self) -> Result<Decimal, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.deposits.iter().map(|d| d.amount).sum())
    }
}

#[async_trait]
impl WithdrawalStore for MemoryStore {
    async fn list(&self, status: Option<&str>) -> Result<Vec<Withdrawal>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Withdrawal> = inner
            .withdrawals
            .iter()
            .filter(|w| status.map_or(true, |s| w.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find(&self, id: i64) -> Result<Option<Withdrawal>, StoreError> {
        Ok(self.withdrawal(id))
    }

    async fn approve_with_debit(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<DebitOutcome, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        let (user_id, coin, amount) = match inner.withdrawals.iter().find(|w| w.id == id) {
            Some(wd) if wd.status == status::PENDING => {
                (wd.user_id, wd.coin.clone(), wd.amount)
            }
            _ => return Ok(DebitOutcome::NotPending),
        };

        let key = (user_id, coin);
        let balance = inner.balances.get(&key).copied().unwrap_or_default();
        if balance < amount {
            return Ok(DebitOutcome::InsufficientFunds);
        }

        inner.balances.insert(key, balance - amount);
        let wd = inner
            .withdrawals
            .iter_mut()
            .find(|w| w.id == id)
            .expect("withdrawal row vanished under lock");
        wd.status = status::APPROVED.to_string();
        wd.processed_at = Some(at);
        Ok(DebitOutcome::Approved(wd.clone()))
    }

    async fn mark_rejected_if_pending(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Withdrawal>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .withdrawals
            .iter_mut()
            .find(|w| w.id == id && w.status == status::PENDING)
        {
            Some(wd) => {
                wd.status = status::REJECTED.to_string();
                wd.processed_at = Some(at);
                Ok(Some(wd.clone()))
            }
            None => Ok(None),
        }
    }

    async fn count(&self, status: Option<&str>) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .withdrawals
            .iter()
            .filter(|w| status.map_or(true, |s| w.status == s))
            .count() as i64)
    }

    async fn total_amount(&self) -> Result<Decimal, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.withdrawals.iter().map(|w| w.amount).sum())
    }
}

#[async_trait]
impl BalanceStore for MemoryStore {
    async fn amount(&self, user_id: Uuid, coin: &str) -> Result<Option<Decimal>, StoreError> {
        Ok(self.balance(user_id, coin))
    }
}

#[async_trait]
impl CompanyWalletStore for MemoryStore {
    async fn list(&self, query: Option<&str>) -> Result<Vec<CompanyWallet>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let needle = query.map(|q| q.to_lowercase());
        let mut rows: Vec<CompanyWallet> = inner
            .company_wallets
            .iter()
            .filter(|w| match &needle {
                Some(q) if !q.is_empty() => {
                    w.coin.to_lowercase().contains(q)
                        || w.address.to_lowercase().contains(q)
                        || w.label.as_deref().unwrap_or("").to_lowercase().contains(q)
                        || w.memo_tag.as_deref().unwrap_or("").to_lowercase().contains(q)
                }
                _ => true,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.coin.cmp(&b.coin));
        Ok(rows)
    }

    async fn find(&self, id: i64) -> Result<Option<CompanyWallet>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.company_wallets.iter().find(|w| w.id == id).cloned())
    }

    async fn create(&self, fields: CompanyWalletFields) -> Result<CompanyWallet, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let row = CompanyWallet {
            id,
            coin: fields.coin,
            address: fields.address,
            memo_tag: fields.memo_tag,
            label: fields.label,
            is_active: fields.is_active,
            is_default: fields.is_default,
            created_at: Utc::now(),
        };
        inner.company_wallets.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        fields: CompanyWalletFields,
    ) -> Result<Option<CompanyWallet>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.company_wallets.iter_mut().find(|w| w.id == id) {
            Some(row) => {
                row.coin = fields.coin;
                row.address = fields.address;
                row.memo_tag = fields.memo_tag;
                row.label = fields.label;
                row.is_active = fields.is_active;
                row.is_default = fields.is_default;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.company_wallets.len();
        inner.company_wallets.retain(|w| w.id != id);
        Ok(inner.company_wallets.len() < before)
    }

    async fn toggle_active(&self, id: i64) -> Result<Option<CompanyWallet>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.company_wallets.iter_mut().find(|w| w.id == id) {
            Some(row) => {
                row.is_active = !row.is_active;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set_default(&self, id: i64, coin: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        for row in inner.company_wallets.iter_mut().filter(|w| w.coin == coin) {
            row.is_default = row.id == id;
        }
        Ok(())
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn list(&self) -> Result<Vec<InvestmentPlan>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows = inner.plans.clone();
        rows.sort_by(|a, b| {
            a.min_amount
                .unwrap_or_default()
                .cmp(&b.min_amount.unwrap_or_default())
        });
        Ok(rows)
    }

    async fn find(&self, id: i64) -> Result<Option<InvestmentPlan>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.plans.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, fields: PlanFields) -> Result<InvestmentPlan, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let row = InvestmentPlan {
            id,
            name: fields.name,
            percentage: fields.percentage,
            min_amount: fields.min_amount,
            max_amount: fields.max_amount,
            duration_days: fields.duration_days,
            duration_hours: fields.duration_hours,
            badge: fields.badge,
            key: fields.key,
            sort_order: fields.sort_order,
            is_active: fields.is_active,
        };
        inner.plans.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        fields: PlanFields,
    ) -> Result<Option<InvestmentPlan>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.plans.iter_mut().find(|p| p.id == id) {
            Some(row) => {
                row.name = fields.name;
                row.percentage = fields.percentage;
                row.min_amount = fields.min_amount;
                row.max_amount = fields.max_amount;
                row.duration_days = fields.duration_days;
                row.duration_hours = fields.duration_hours;
                row.badge = fields.badge;
                row.key = fields.key;
                row.sort_order = fields.sort_order;
                row.is_active = fields.is_active;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.plans.len();
        inner.plans.retain(|p| p.id != id);
        Ok(inner.plans.len() < before)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.plans.len() as i64)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn list(&self, limit: i64) -> Result<Vec<Profile>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows = inner.profiles.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.profiles.iter().find(|p| p.email == email).cloned())
    }

    async fn email_for(&self, id: Uuid) -> Result<Option<String>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .profiles
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.email.clone()))
    }

    async fn emails(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut emails: Vec<String> = inner.profiles.iter().map(|p| p.email.clone()).collect();
        emails.sort();
        Ok(emails)
    }

    async fn upsert(&self, fields: ProfileFields) -> Result<Profile, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(row) = inner.profiles.iter_mut().find(|p| p.id == fields.id) {
            row.email = fields.email;
            row.username = fields.username;
            row.first_name = fields.first_name;
            row.last_name = fields.last_name;
            return Ok(row.clone());
        }
        let row = Profile {
            id: fields.id,
            email: fields.email,
            username: fields.username,
            first_name: fields.first_name,
            last_name: fields.last_name,
            status: "active".to_string(),
            created_at: Utc::now(),
        };
        inner.profiles.push(row.clone());
        Ok(row)
    }

    async fn update_status(&self, id: Uuid, status: &str) -> Result<Option<Profile>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.profiles.iter_mut().find(|p| p.id == id) {
            Some(row) => {
                row.status = status.to_string();
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.profiles.len() as i64)
    }

    async fn count_with_status(&self, status: &str) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.profiles.iter().filter(|p| p.status == status).count() as i64)
    }

    async fn count_without_status(&self, status: &str) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.profiles.iter().filter(|p| p.status != status).count() as i64)
    }
}

#[async_trait]
impl EarningStore for MemoryStore {
    async fn recent(&self, limit: i64) -> Result<Vec<Earning>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows = inner.earnings.clone();
        rows.sort_by(|a, b| b.credited_at.cmp(&a.credited_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn for_user_email(&self, email: &str) -> Result<Vec<Earning>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Earning> = inner
            .earnings
            .iter()
            .filter(|e| e.user_email == email)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.credited_at.cmp(&a.credited_at));
        Ok(rows)
    }

    async fn insert(&self, fields: EarningFields) -> Result<Earning, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let row = Earning {
            id,
            user_email: fields.user_email,
            amount: fields.amount,
            note: fields.note,
            credited_at: fields.credited_at,
            created_at: Utc::now(),
        };
        inner.earnings.push(row.clone());
        Ok(row)
    }

    async fn total_amount(&self) -> Result<Decimal, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.earnings.iter().map(|e| e.amount).sum())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn email_for(&self, user_id: Uuid) -> Result<Option<String>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.directory.get(&user_id).cloned())
    }

    async fn create_user(&self, email: &str, _password: &str) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let mut inner = self.inner.lock().unwrap();
        inner.directory.insert(id, email.to_string());
        Ok(id)
    }
}
