//! Company deposit wallet administration. At most one wallet per coin is the
//! default; the store enforces that in a single conditioned update.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::flash::{set_toast, take_toast, Toast};
use crate::state::AppState;
use crate::store::models::CompanyWalletFields;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WalletForm {
    pub coin: String,
    pub address: String,
    pub memo_tag: Option<String>,
    pub label: Option<String>,
    pub is_active: Option<String>,
    pub is_default: Option<String>,
}

impl WalletForm {
    fn into_fields(self) -> Result<(CompanyWalletFields, bool), ApiError> {
        let coin = self.coin.trim().to_uppercase();
        let address = self.address.trim().to_string();
        if coin.is_empty() || address.is_empty() {
            return Err(ApiError::bad_request("Coin and address are required"));
        }
        let wants_default = matches!(self.is_default.as_deref(), Some("on" | "true" | "1"));
        // Default is granted through set_default afterwards so exclusivity
        // per coin always holds.
        let fields = CompanyWalletFields {
            coin,
            address,
            memo_tag: trimmed(self.memo_tag),
            label: trimmed(self.label),
            is_active: matches!(self.is_active.as_deref(), Some("on" | "true" | "1")),
            is_default: false,
        };
        Ok((fields, wants_default))
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /admin/wallets
pub async fn list(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let wallets = state.stores.wallets.list(filter).await?;
    let (jar, toast) = take_toast(jar);
    Ok((
        jar,
        Json(json!({ "success": true, "data": wallets, "toast": toast })),
    ))
}

/// POST /admin/wallets
pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<WalletForm>,
) -> Result<impl IntoResponse, ApiError> {
    let (fields, wants_default) = form.into_fields()?;
    let wallet = state.stores.wallets.create(fields).await?;
    if wants_default {
        state.stores.wallets.set_default(wallet.id, &wallet.coin).await?;
    }
    let jar = set_toast(
        jar,
        &Toast::success(format!("{} wallet added", wallet.coin)),
    );
    Ok((jar, Redirect::to("/admin/wallets")))
}

/// POST /admin/wallets/:id
pub async fn update(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Form(form): Form<WalletForm>,
) -> Result<impl IntoResponse, ApiError> {
    let (fields, wants_default) = form.into_fields()?;
    let toast = match state.stores.wallets.update(id, fields).await? {
        Some(wallet) => {
            if wants_default {
                state.stores.wallets.set_default(wallet.id, &wallet.coin).await?;
            }
            Toast::success(format!("{} wallet updated", wallet.coin))
        }
        None => Toast::error(format!("Wallet #{id} not found")),
    };
    Ok((set_toast(jar, &toast), Redirect::to("/admin/wallets")))
}

/// POST /admin/wallets/:id/delete
pub async fn delete(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let toast = if state.stores.wallets.delete(id).await? {
        Toast::success(format!("Wallet #{id} deleted"))
    } else {
        Toast::error(format!("Wallet #{id} not found"))
    };
    Ok((set_toast(jar, &toast), Redirect::to("/admin/wallets")))
}

/// POST /admin/wallets/:id/toggle
pub async fn toggle_active(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let toast = match state.stores.wallets.toggle_active(id).await? {
        Some(wallet) if wallet.is_active => {
            Toast::success(format!("{} wallet activated", wallet.coin))
        }
        Some(wallet) => Toast::success(format!("{} wallet deactivated", wallet.coin)),
        None => Toast::error(format!("Wallet #{id} not found")),
    };
    Ok((set_toast(jar, &toast), Redirect::to("/admin/wallets")))
}

/// POST /admin/wallets/:id/default
pub async fn make_default(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let toast = match state.stores.wallets.find(id).await? {
        Some(wallet) => {
            state.stores.wallets.set_default(wallet.id, &wallet.coin).await?;
            Toast::success(format!("{} default set to {}", wallet.coin, wallet.address))
        }
        None => Toast::error(format!("Wallet #{id} not found")),
    };
    Ok((set_toast(jar, &toast), Redirect::to("/admin/wallets")))
}
