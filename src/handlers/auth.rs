//! Operator sign-in against the credentials configured for the console.
//! There is a single admin identity; sessions are stateless signed tokens
//! carried in a cookie.

use axum::{
    extract::{Extension, Query, State},
    response::{IntoResponse, Redirect},
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::middleware::flash::{set_toast, take_toast, Toast};
use crate::middleware::session::{issue_session, AdminUser, SESSION_COOKIE};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// GET /admin/login
pub async fn login_page(jar: CookieJar, Query(query): Query<LoginQuery>) -> impl IntoResponse {
    let (jar, toast) = take_toast(jar);
    (
        jar,
        Json(json!({
            "success": true,
            "data": { "next": query.next },
            "toast": toast,
        })),
    )
}

/// POST /admin/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, ApiError> {
    let admin = &state.config.admin;
    let email_ok = form.email.trim().eq_ignore_ascii_case(&admin.email);
    if !email_ok || form.password != admin.password {
        warn!(email = %form.email.trim(), "Failed admin login attempt");
        let jar = set_toast(jar, &Toast::error("Invalid email or password"));
        return Ok((jar, Redirect::to("/admin/login")));
    }

    let token = issue_session(&admin.email, &admin.session_secret, admin.session_hours)
        .map_err(|e| ApiError::internal(format!("Failed to issue session: {e}")))?;
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    info!(email = %admin.email, "Admin signed in");
    let destination = sanitize_next(form.next.as_deref());
    Ok((jar.add(cookie), Redirect::to(&destination)))
}

/// POST /admin/logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let removal = Cookie::build(SESSION_COOKIE).path("/").build();
    (jar.remove(removal), Redirect::to("/admin/login"))
}

/// GET /admin/session
pub async fn session(Extension(admin): Extension<AdminUser>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": { "email": admin.email },
    }))
}

/// Only same-site absolute paths are honored as a post-login destination.
fn sanitize_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/admin".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_must_be_a_local_path() {
        assert_eq!(sanitize_next(Some("/admin/deposits/pending")), "/admin/deposits/pending");
        assert_eq!(sanitize_next(Some("https://evil.example")), "/admin");
        assert_eq!(sanitize_next(Some("//evil.example")), "/admin");
        assert_eq!(sanitize_next(None), "/admin");
    }
}
