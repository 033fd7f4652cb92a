use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use vaultdesk::config::AppConfig;
use vaultdesk::notify::HttpMailer;
use vaultdesk::routes;
use vaultdesk::state::{AppState, Stores};
use vaultdesk::store::{
    pool, HttpUserDirectory, PgBalanceStore, PgCompanyWalletStore, PgDepositStore, PgEarningStore,
    PgPlanStore, PgProfileStore, PgWithdrawalStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vaultdesk=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env().context("loading configuration")?;

    let pool = pool::connect(&config.database)
        .await
        .context("connecting to database")?;
    pool::health_check(&pool)
        .await
        .context("database health check")?;

    let stores = Stores {
        deposits: Arc::new(PgDepositStore::new(pool.clone())),
        withdrawals: Arc::new(PgWithdrawalStore::new(pool.clone())),
        balances: Arc::new(PgBalanceStore::new(pool.clone())),
        wallets: Arc::new(PgCompanyWalletStore::new(pool.clone())),
        plans: Arc::new(PgPlanStore::new(pool.clone())),
        profiles: Arc::new(PgProfileStore::new(pool.clone())),
        earnings: Arc::new(PgEarningStore::new(pool.clone())),
        directory: Arc::new(HttpUserDirectory::new(
            config.notify.directory_url.clone(),
            config.notify.directory_key.clone(),
        )),
    };
    let transport = Arc::new(HttpMailer::new(&config.mail));

    let port = config.server.port;
    let state = AppState::new(config, stores, transport);
    let app = routes::router(state);

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    info!("VaultDesk listening on http://{bind_addr}");

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
