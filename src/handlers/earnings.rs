//! Manual earning credits. A credit is only a ledger row here; user-facing
//! balances read it through the platform, so the email must belong to a
//! known profile before anything is written.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::ApiError;
use crate::middleware::flash::{set_toast, take_toast, Toast};
use crate::state::AppState;
use crate::store::models::EarningFields;

#[derive(Debug, Deserialize)]
pub struct CreditForm {
    pub user_email: String,
    pub amount: String,
    pub note: Option<String>,
    pub credited_at: Option<String>,
}

/// GET /admin/earnings - recent credits plus the emails the credit form can
/// target.
pub async fn list(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let recent = state.stores.earnings.recent(50).await?;
    let emails = state.stores.profiles.emails().await?;
    let (jar, toast) = take_toast(jar);
    Ok((
        jar,
        Json(json!({
            "success": true,
            "data": { "recent": recent, "emails": emails },
            "toast": toast,
        })),
    ))
}

/// POST /admin/earnings
pub async fn credit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CreditForm>,
) -> Result<impl IntoResponse, ApiError> {
    let email = form.user_email.trim().to_lowercase();
    let amount: Decimal = form
        .amount
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Amount must be a number"))?;
    if amount <= Decimal::ZERO {
        return Err(ApiError::bad_request("Amount must be positive"));
    }

    if state.stores.profiles.find_by_email(&email).await?.is_none() {
        let jar = set_toast(jar, &Toast::error(format!("No account found for {email}")));
        return Ok((jar, Redirect::to("/admin/earnings")));
    }

    let credited_at = match form.credited_at.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw
            .parse::<DateTime<Utc>>()
            .map_err(|_| ApiError::bad_request("Credited-at must be an RFC 3339 timestamp"))?,
        _ => Utc::now(),
    };

    let earning = state
        .stores
        .earnings
        .insert(EarningFields {
            user_email: email.clone(),
            amount,
            note: form
                .note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            credited_at,
        })
        .await?;

    info!(email = %email, amount = %earning.amount, "Earning credited");
    let jar = set_toast(
        jar,
        &Toast::success(format!("Credited ${} to {email}", earning.amount)),
    );
    Ok((jar, Redirect::to("/admin/earnings")))
}
