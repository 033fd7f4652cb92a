use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::flash::take_toast;
use crate::notify::templates::money;
use crate::state::AppState;
use crate::store::models::status;

/// GET /admin - headline numbers plus the most recent signups and credits.
pub async fn overview(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let stores = &state.stores;

    let pending_deposits = stores.deposits.count(Some(status::PENDING)).await?;
    let approved_deposits = stores.deposits.count(Some(status::APPROVED)).await?;
    let deposit_volume = stores.deposits.total_amount().await?;

    let pending_withdrawals = stores.withdrawals.count(Some(status::PENDING)).await?;
    let approved_withdrawals = stores.withdrawals.count(Some(status::APPROVED)).await?;
    let withdrawal_volume = stores.withdrawals.total_amount().await?;

    let total_users = stores.profiles.count_all().await?;
    let active_users = stores.profiles.count_with_status("active").await?;
    let other_users = stores.profiles.count_without_status("active").await?;

    let plan_count = stores.plans.count().await?;
    let earnings_total = stores.earnings.total_amount().await?;

    let recent_users = stores.profiles.list(8).await?;
    let recent_earnings = stores.earnings.recent(8).await?;

    let (jar, toast) = take_toast(jar);
    Ok((
        jar,
        Json(json!({
            "success": true,
            "data": {
                "deposits": {
                    "pending": pending_deposits,
                    "approved": approved_deposits,
                    "volume": deposit_volume,
                    "volume_usd": format!("${}", money(deposit_volume)),
                },
                "withdrawals": {
                    "pending": pending_withdrawals,
                    "approved": approved_withdrawals,
                    "volume": withdrawal_volume,
                    "volume_usd": format!("${}", money(withdrawal_volume)),
                },
                "users": {
                    "total": total_users,
                    "active": active_users,
                    "other": other_users,
                },
                "plans": { "total": plan_count },
                "earnings": {
                    "total": earnings_total,
                    "total_usd": format!("${}", money(earnings_total)),
                },
                "recent_users": recent_users,
                "recent_earnings": recent_earnings,
            },
            "toast": toast,
        })),
    ))
}
