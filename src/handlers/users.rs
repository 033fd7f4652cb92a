//! User administration: listing, manual account creation, and status changes.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::flash::{set_toast, take_toast, Toast};
use crate::notify::Notice;
use crate::state::AppState;
use crate::store::models::ProfileFields;

const ALLOWED_STATUSES: &[&str] = &["active", "suspended", "pending"];

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub send_welcome: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// GET /admin/users
pub async fn list(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let profiles = state.stores.profiles.list(limit).await?;
    let (jar, toast) = take_toast(jar);
    Ok((
        jar,
        Json(json!({ "success": true, "data": profiles, "toast": toast })),
    ))
}

/// POST /admin/users - create the identity in the directory first, then the
/// profile row keyed by the returned id.
pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CreateUserForm>,
) -> Result<impl IntoResponse, ApiError> {
    let email = form.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if form.password.len() < 8 {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }
    if state.stores.profiles.find_by_email(&email).await?.is_some() {
        let jar = set_toast(jar, &Toast::error(format!("{email} already has an account")));
        return Ok((jar, Redirect::to("/admin/users")));
    }

    let user_id = state.stores.directory.create_user(&email, &form.password).await?;
    let first_name = trimmed(form.first_name);
    state
        .stores
        .profiles
        .upsert(ProfileFields {
            id: user_id,
            email: email.clone(),
            username: trimmed(form.username),
            first_name: first_name.clone(),
            last_name: trimmed(form.last_name),
        })
        .await?;

    info!(user_id = %user_id, email = %email, "User created by admin");
    if matches!(form.send_welcome.as_deref(), Some("on" | "true" | "1")) {
        state.dispatcher.spawn(Notice::Welcome {
            email: email.clone(),
            first_name,
        });
    }

    let jar = set_toast(jar, &Toast::success(format!("Account created for {email}")));
    Ok((jar, Redirect::to("/admin/users")))
}

/// GET /admin/users/:id - profile plus that user's earnings history.
pub async fn detail(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .stores
        .profiles
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {id} not found")))?;
    let earnings = state.stores.earnings.for_user_email(&profile.email).await?;
    let (jar, toast) = take_toast(jar);
    Ok((
        jar,
        Json(json!({
            "success": true,
            "data": { "profile": profile, "earnings": earnings },
            "toast": toast,
        })),
    ))
}

/// POST /admin/users/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    Form(form): Form<StatusForm>,
) -> Result<impl IntoResponse, ApiError> {
    let status = form.status.trim().to_lowercase();
    if !ALLOWED_STATUSES.contains(&status.as_str()) {
        return Err(ApiError::bad_request(format!(
            "Status must be one of: {}",
            ALLOWED_STATUSES.join(", ")
        )));
    }
    let toast = match state.stores.profiles.update_status(id, &status).await? {
        Some(profile) => Toast::success(format!("{} is now {status}", profile.email)),
        None => Toast::error(format!("User {id} not found")),
    };
    Ok((set_toast(jar, &toast), Redirect::to("/admin/users")))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
