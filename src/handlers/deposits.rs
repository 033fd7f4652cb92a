//! Deposit review screens and the approve/reject actions.

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
    let deposits = state.stores.deposits.list(filter).await?;
    let (jar, toast) = take_toast(jar);
    Ok((
        jar,
        Json(json!({
            "success": true,
            "data": deposits,
            "filter": filter.unwrap_or("all"),
            "toast": toast,
        })),
    ))
}

/// GET /admin/deposits/pending
pub async fn list_pending(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    list(state, jar, Some(status::PENDING)).await
}

/// GET /admin/deposits/approved
pub async fn list_approved(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    list(state, jar, Some(status::APPROVED)).await
}

/// GET /admin/deposits/rejected
pub async fn list_rejected(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    list(state, jar, Some(status::REJECTED)).await
}

/// GET /admin/deposits/all
pub async fn list_all(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    list(state, jar, None).await
}

/// POST /admin/deposits/:id/approve
pub async fn approve(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let toast = match state.engine.approve_deposit(id).await {
        Ok(Outcome::Completed(_)) => Toast::success(format!("Deposit #{id} approved")),
        Ok(Outcome::AlreadyProcessed) => {
            Toast::info(format!("Deposit #{id} was already processed"))
        }
        Err(WorkflowError::Store(e)) => return Err(e.into()),
        Err(e) => Toast::error(e.to_string()),
    };
    Ok((set_toast(jar, &toast), Redirect::to("/admin/deposits/pending")))
}

/// POST /admin/deposits/:id/reject
pub async fn reject(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let toast = match state.engine.reject_deposit(id).await {
        Ok(Outcome::Completed(_)) => Toast::success(format!("Deposit #{id} rejected")),
        Ok(Outcome::AlreadyProcessed) => {
            Toast::info(format!("Deposit #{id} was already processed"))
        }
        Err(WorkflowError::Store(e)) => return Err(e.into()),
        Err(e) => Toast::error(e.to_string()),
    };
    Ok((set_toast(jar, &toast), Redirect::to("/admin/deposits/pending")))
}
