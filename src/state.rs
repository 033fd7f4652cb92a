use std::sync::Arc;

use crate::config::AppConfig;
use crate::notify::{Dispatcher, DynMailTransport};
use crate::store::{
    DynBalanceStore, DynCompanyWalletStore, DynDepositStore, DynEarningStore, DynPlanStore,
    DynProfileStore, DynUserDirectory, DynWithdrawalStore, MemoryStore,
};
use crate::workflow::{ApprovalEngine, RecipientResolver};

/// Trait-object handles for every persistence concern. Production wires the
/// Postgres implementations; the test suite wires [`MemoryStore`].
#[derive(Clone)]
pub struct Stores {
    pub deposits: DynDepositStore,
    pub withdrawals: DynWithdrawalStore,
    pub balances: DynBalanceStore,
    pub wallets: DynCompanyWalletStore,
    pub plans: DynPlanStore,
    pub profiles: DynProfileStore,
    pub earnings: DynEarningStore,
    pub directory: DynUserDirectory,
}

impl Stores {
    pub fn from_memory(store: &MemoryStore) -> Self {
        Self {
            deposits: Arc::new(store.clone()),
            withdrawals: Arc::new(store.clone()),
            balances: Arc::new(store.clone()),
            wallets: Arc::new(store.clone()),
            plans: Arc::new(store.clone()),
            profiles: Arc::new(store.clone()),
            earnings: Arc::new(store.clone()),
            directory: Arc::new(store.clone()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub stores: Stores,
    pub engine: Arc<ApprovalEngine>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(config: AppConfig, stores: Stores, transport: DynMailTransport) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(
            transport,
            config.mail.clone(),
            config.notify.timeout_secs,
        ));
        let resolver = Arc::new(RecipientResolver::new(
            stores.profiles.clone(),
            stores.directory.clone(),
        ));
        let engine = Arc::new(ApprovalEngine::new(
            stores.deposits.clone(),
            stores.withdrawals.clone(),
            stores.balances.clone(),
            resolver,
            dispatcher.clone(),
        ));
        Self {
            config: Arc::new(config),
            stores,
            engine,
            dispatcher,
        }
    }
}
