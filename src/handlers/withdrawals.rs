//! Withdrawal review screens and the approve/reject actions. Approval debits
//! the user's wallet in the same database transaction as the status flip.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::flash::{set_toast, take_toast, Toast};
use crate::state::AppState;
use crate::store::models::status;
use crate::workflow::{Outcome, WorkflowError};

async fn list(
    state: AppState,
    jar: CookieJar,
    filter: Option<&str>,
) -> Result<impl IntoResponse, ApiError> {
    let withdrawals = state.stores.withdrawals.list(filter).await?;
    let (jar, toast) = take_toast(jar);
    Ok((
        jar,
        Json(json!({
            "success": true,
            "data": withdrawals,
            "filter": filter.unwrap_or("all"),
            "toast": toast,
        })),
    ))
}

/// GET /admin/withdrawals/pending
pub async fn list_pending(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    list(state, jar, Some(status::PENDING)).await
}

/// GET /admin/withdrawals/approved
pub async fn list_approved(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    list(state, jar, Some(status::APPROVED)).await
}

/// GET /admin/withdrawals/rejected
pub async fn list_rejected(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    list(state, jar, Some(status::REJECTED)).await
}

/// GET /admin/withdrawals/all
pub async fn list_all(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    list(state, jar, None).await
}

/// POST /admin/withdrawals/:id/approve
pub async fn approve(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let toast = match state.engine.approve_withdrawal(id).await {
        Ok(Outcome::Completed(_)) => {
            Toast::success(format!("Withdrawal #{id} approved and wallet debited"))
        }
        Ok(Outcome::AlreadyProcessed) => {
            Toast::info(format!("Withdrawal #{id} was already processed"))
        }
        Err(WorkflowError::Store(e)) => return Err(e.into()),
        Err(e) => Toast::error(e.to_string()),
    };
    Ok((
        set_toast(jar, &toast),
        Redirect::to("/admin/withdrawals/pending"),
    ))
}

/// POST /admin/withdrawals/:id/reject
pub async fn reject(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let toast = match state.engine.reject_withdrawal(id).await {
        Ok(Outcome::Completed(_)) => Toast::success(format!("Withdrawal #{id} rejected")),
        Ok(Outcome::AlreadyProcessed) => {
            Toast::info(format!("Withdrawal #{id} was already processed"))
        }
        Err(WorkflowError::Store(e)) => return Err(e.into()),
        Err(e) => Toast::error(e.to_string()),
    };
    Ok((
        set_toast(jar, &toast),
        Redirect::to("/admin/withdrawals/pending"),
    ))
}
