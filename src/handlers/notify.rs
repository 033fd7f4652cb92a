//! Notification API consumed by the customer-facing platform. Requests are
//! authenticated with a shared key in the `x-notify-key` header. The
//! recipient's mail is delivered synchronously so callers learn about
//! provider failures; admin alert copies go out best-effort.

use axum::{extract::State, http::HeaderMap, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::notify::{Notice, TransferDetails};
use crate::state::AppState;
use crate::store::models::status;

pub const KEY_HEADER: &str = "x-notify-key";

#[derive(Debug, Deserialize)]
pub struct WelcomePayload {
    pub email: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferPayload {
    pub email: Option<String>,
    /// Admin alert copies address this instead of `email` when set.
    pub user_email_for_admin: Option<String>,
    pub id: Option<i64>,
    pub coin: Option<String>,
    pub amount: Option<Decimal>,
    pub fee: Option<Decimal>,
    pub address: Option<String>,
    pub to_address: Option<String>,
    pub txid: Option<String>,
    pub note: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TransferPayload {
    /// Pending announcements must carry the submission time; it becomes
    /// the rendered email date.
    fn pending_details(&self) -> Result<TransferDetails, ApiError> {
        self.build(true)
    }

    fn details(&self) -> Result<TransferDetails, ApiError> {
        self.build(false)
    }

    fn build(&self, require_created_at: bool) -> Result<TransferDetails, ApiError> {
        let mut missing = Vec::new();
        if self.email.as_deref().map_or(true, str::is_empty) {
            missing.push("email");
        }
        if self.id.is_none() {
            missing.push("id");
        }
        if self.coin.as_deref().map_or(true, str::is_empty) {
            missing.push("coin");
        }
        if self.amount.is_none() {
            missing.push("amount");
        }
        if require_created_at && self.created_at.is_none() {
            missing.push("created_at");
        }
        if !missing.is_empty() {
            return Err(ApiError::bad_request(format!(
                "Missing fields: {}",
                missing.join(", ")
            )));
        }
        Ok(TransferDetails {
            id: self.id.unwrap_or_default(),
            coin: self.coin.clone().unwrap_or_default(),
            amount: self.amount.unwrap_or_default(),
            fee: self.fee,
            address: self.address.clone().or_else(|| self.to_address.clone()),
            txid: self.txid.clone(),
            note: self.note.clone(),
            at: self
                .created_at
                .or(self.updated_at)
                .unwrap_or_else(Utc::now),
        })
    }

    fn admin_user_email(&self) -> String {
        self.user_email_for_admin
            .clone()
            .filter(|e| !e.is_empty())
            .or_else(|| self.email.clone())
            .unwrap_or_default()
    }

    fn transfer_status(&self) -> Result<String, ApiError> {
        match self.status.as_deref() {
            Some(s @ (status::APPROVED | status::REJECTED)) => Ok(s.to_string()),
            Some(other) => Err(ApiError::bad_request(format!(
                "Status must be approved or rejected, got {other}"
            ))),
            None => Err(ApiError::bad_request("Missing fields: status")),
        }
    }
}

fn check_key(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.config.notify.api_key.as_deref() else {
        return Err(ApiError::service_unavailable(
            "Notification API key not configured",
        ));
    };
    let presented = headers.get(KEY_HEADER).and_then(|v| v.to_str().ok());
    if presented != Some(expected) {
        return Err(ApiError::unauthorized("Invalid notification API key"));
    }
    Ok(())
}

fn fan_out_admin_alerts(state: &AppState, make: impl Fn(String) -> Notice) {
    let recipients = state.dispatcher.admin_recipients();
    if recipients.is_empty() {
        debug!("No admin alert recipients configured, skipping");
        return;
    }
    for admin_to in recipients.to_vec() {
        state.dispatcher.spawn(make(admin_to));
    }
}

fn ok() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// POST /api/notify/welcome
pub async fn welcome(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WelcomePayload>,
) -> Result<Json<Value>, ApiError> {
    check_key(&state, &headers)?;
    let email = payload
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing fields: email"))?;
    state
        .dispatcher
        .deliver(&Notice::Welcome {
            email,
            first_name: payload.first_name,
        })
        .await?;
    Ok(ok())
}

/// POST /api/notify/deposits/pending
pub async fn deposit_pending(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TransferPayload>,
) -> Result<Json<Value>, ApiError> {
    check_key(&state, &headers)?;
    let details = payload.pending_details()?;
    let admin_user_email = payload.admin_user_email();
    let email = payload.email.unwrap_or_default();

    state
        .dispatcher
        .deliver(&Notice::DepositPending {
            email,
            details: details.clone(),
        })
        .await?;
    fan_out_admin_alerts(&state, |admin_to| Notice::AdminDepositAlert {
        admin_to,
        user_email: admin_user_email.clone(),
        details: details.clone(),
    });
    Ok(ok())
}

/// POST /api/notify/deposits/status
pub async fn deposit_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TransferPayload>,
) -> Result<Json<Value>, ApiError> {
    check_key(&state, &headers)?;
    let details = payload.details()?;
    let transfer_status = payload.transfer_status()?;
    let email = payload.email.unwrap_or_default();

    state
        .dispatcher
        .deliver(&Notice::DepositStatus {
            email,
            status: transfer_status,
            details,
        })
        .await?;
    Ok(ok())
}

/// POST /api/notify/withdrawals/pending
pub async fn withdrawal_pending(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TransferPayload>,
) -> Result<Json<Value>, ApiError> {
    check_key(&state, &headers)?;
    let details = payload.pending_details()?;
    let admin_user_email = payload.admin_user_email();
    let email = payload.email.unwrap_or_default();

    state
        .dispatcher
        .deliver(&Notice::WithdrawalPending {
            email,
            details: details.clone(),
        })
        .await?;
    fan_out_admin_alerts(&state, |admin_to| Notice::AdminWithdrawalAlert {
        admin_to,
        user_email: admin_user_email.clone(),
        details: details.clone(),
    });
    Ok(ok())
}

/// POST /api/notify/withdrawals/status
pub async fn withdrawal_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TransferPayload>,
) -> Result<Json<Value>, ApiError> {
    check_key(&state, &headers)?;
    let details = payload.details()?;
    let transfer_status = payload.transfer_status()?;
    let email = payload.email.unwrap_or_default();

    state
        .dispatcher
        .deliver(&Notice::WithdrawalStatus {
            email,
            status: transfer_status,
            details,
        })
        .await?;
    Ok(ok())
}
