pub mod balances;
pub mod company_wallets;
pub mod deposits;
pub mod directory;
pub mod earnings;
pub mod error;
pub mod memory;
pub mod models;
pub mod plans;
pub mod pool;
pub mod profiles;
pub mod withdrawals;

pub use balances::{BalanceStore, DynBalanceStore, PgBalanceStore};
pub use company_wallets::{CompanyWalletStore, DynCompanyWalletStore, PgCompanyWalletStore};
pub use deposits::{DepositStore, DynDepositStore, PgDepositStore};
pub use directory::{DynUserDirectory, HttpUserDirectory, UserDirectory};
pub use earnings::{DynEarningStore, EarningStore, PgEarningStore};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use plans::{DynPlanStore, PgPlanStore, PlanStore};
pub use profiles::{DynProfileStore, PgProfileStore, ProfileStore};
pub use withdrawals::{DebitOutcome, DynWithdrawalStore, PgWithdrawalStore, WithdrawalStore};
