use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    auth, dashboard, deposits, earnings, notify, plans, users, wallets, withdrawals,
};
use crate::middleware::session::require_admin;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .nest("/admin", admin_routes(state.clone()))
        .nest("/api/notify", notify_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "name": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION") }))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout));

    let gated = Router::new()
        .route("/", get(dashboard::overview))
        .route("/session", get(auth::session))
        .route("/deposits/pending", get(deposits::list_pending))
        .route("/deposits/approved", get(deposits::list_approved))
        .route("/deposits/rejected", get(deposits::list_rejected))
        .route("/deposits/all", get(deposits::list_all))
        .route("/deposits/:id/approve", post(deposits::approve))
        .route("/deposits/:id/reject", post(deposits::reject))
        .route("/withdrawals/pending", get(withdrawals::list_pending))
        .route("/withdrawals/approved", get(withdrawals::list_approved))
        .route("/withdrawals/rejected", get(withdrawals::list_rejected))
        .route("/withdrawals/all", get(withdrawals::list_all))
        .route("/withdrawals/:id/approve", post(withdrawals::approve))
        .route("/withdrawals/:id/reject", post(withdrawals::reject))
        .route("/plans", get(plans::list).post(plans::create))
        .route("/plans/:id", post(plans::update))
        .route("/plans/:id/delete", post(plans::delete))
        .route("/wallets", get(wallets::list).post(wallets::create))
        .route("/wallets/:id", post(wallets::update))
        .route("/wallets/:id/delete", post(wallets::delete))
        .route("/wallets/:id/toggle", post(wallets::toggle_active))
        .route("/wallets/:id/default", post(wallets::make_default))
        .route("/users", get(users::list).post(users::create))
        .route("/users/:id", get(users::detail))
        .route("/users/:id/status", post(users::update_status))
        .route("/earnings", get(earnings::list).post(earnings::credit))
        .layer(from_fn_with_state(state, require_admin));

    open.merge(gated)
}

fn notify_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/welcome", post(notify::welcome))
        .route("/deposits/pending", post(notify::deposit_pending))
        .route("/deposits/status", post(notify::deposit_status))
        .route("/withdrawals/pending", post(notify::withdrawal_pending))
        .route("/withdrawals/status", post(notify::withdrawal_status))
        .layer(cors_layer(&state))
}

/// CORS for the notification API. An explicit origin list is honored;
/// an empty list leaves the API open to any origin.
fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .notify
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
