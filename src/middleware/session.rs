use axum::{
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "vd_session";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    pub fn new(email: &str, hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: email.to_string(),
            exp: (now + Duration::hours(hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Signed-in operator, injected as a request extension by [`require_admin`].
#[derive(Clone, Debug)]
pub struct AdminUser {
    pub email: String,
}

pub fn issue_session(
    email: &str,
    secret: &str,
    hours: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = SessionClaims::new(email, hours);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_session(token: &str, secret: &str) -> Option<AdminUser> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;
    Some(AdminUser {
        email: data.claims.sub,
    })
}

/// Gate for `/admin` pages. An unauthenticated request is redirected to the
/// login screen with the original path carried in `next` so the operator
/// lands back where they were headed.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let admin = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| verify_session(cookie.value(), &state.config.admin.session_secret));

    match admin {
        Some(admin) => {
            request.extensions_mut().insert(admin);
            next.run(request).await
        }
        None => {
            // Nested routers see a prefix-stripped URI; OriginalUri keeps
            // the full path for the post-login redirect.
            let wanted = request
                .extensions()
                .get::<OriginalUri>()
                .and_then(|uri| uri.0.path_and_query())
                .map(|pq| pq.as_str())
                .unwrap_or("/admin");
            debug!(path = wanted, "Unauthenticated admin request, redirecting");
            let encoded: String = url::form_urlencoded::byte_serialize(wanted.as_bytes()).collect();
            Redirect::to(&format!("/admin/login?next={encoded}")).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_session_round_trips() {
        let token = issue_session("ops@example.com", "secret", 12).unwrap();
        let admin = verify_session(&token, "secret").unwrap();
        assert_eq!(admin.email, "ops@example.com");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_session("ops@example.com", "secret", 12).unwrap();
        assert!(verify_session(&token, "other").is_none());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_session("not-a-jwt", "secret").is_none());
    }
}
