//! HTTP-level tests for the admin console routes: the session gate, login
//! flow, and the form-driven management screens.

mod common;

use axum::http::{header, StatusCode};
use common::{assert_redirect, body_json, location, TestApp, ADMIN_EMAIL, ADMIN_PASSWORD};
use rust_decimal::Decimal;
use uuid::Uuid;
use vaultdesk::store::models::status;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[tokio::test]
async fn unauthenticated_requests_are_sent_to_login() {
    let app = TestApp::new();
    let response = app.get("/admin/deposits/pending", false).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/admin/login?next=%2Fadmin%2Fdeposits%2Fpending"
    );
}

#[tokio::test]
async fn login_with_wrong_password_bounces_back() {
    let app = TestApp::new();
    let form = format!("email={ADMIN_EMAIL}&password=wrong");
    let response = app.post_form("/admin/login", &form, false).await;
    assert_redirect(&response, "/admin/login");
    let issued_session = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .any(|v| v.to_str().unwrap_or_default().starts_with("vd_session="));
    assert!(!issued_session);
}

#[tokio::test]
async fn login_sets_a_session_and_honors_next() {
    let app = TestApp::new();
    let form = format!(
        "email={ADMIN_EMAIL}&password={ADMIN_PASSWORD}&next=%2Fadmin%2Fplans"
    );
    let response = app.post_form("/admin/login", &form, false).await;
    assert_redirect(&response, "/admin/plans");
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("vd_session="));
}

#[tokio::test]
async fn offsite_next_is_ignored() {
    let app = TestApp::new();
    let form = format!(
        "email={ADMIN_EMAIL}&password={ADMIN_PASSWORD}&next=https%3A%2F%2Fevil.example"
    );
    let response = app.post_form("/admin/login", &form, false).await;
    assert_redirect(&response, "/admin");
}

#[tokio::test]
async fn dashboard_aggregates_counts() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    app.store.seed_profile(user, "user@example.com");
    app.store
        .seed_deposit_with_email(user, "BTC", dec("100"), "user@example.com");
    app.store.seed_withdrawal(user, "BTC", dec("40"), dec("1"));

    let response = app.get("/admin", true).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["deposits"]["pending"], 1);
    assert_eq!(body["data"]["withdrawals"]["pending"], 1);
    assert_eq!(body["data"]["users"]["total"], 1);
    assert_eq!(body["data"]["deposits"]["volume_usd"], "$100.00");
}

#[tokio::test]
async fn pending_list_shows_seeded_deposits() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let id = app
        .store
        .seed_deposit_with_email(user, "BTC", dec("25"), "user@example.com");

    let response = app.get("/admin/deposits/pending", true).await;
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"], id);
    assert_eq!(body["data"][0]["status"], "pending");
}

#[tokio::test]
async fn approve_action_redirects_with_a_toast() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let id = app
        .store
        .seed_deposit_with_email(user, "BTC", dec("25"), "user@example.com");

    let response = app
        .post_form(&format!("/admin/deposits/{id}/approve"), "", true)
        .await;
    assert_redirect(&response, "/admin/deposits/pending");
    let flash = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(flash.starts_with("vd_flash="));
    assert_eq!(app.store.deposit(id).unwrap().status, status::APPROVED);
}

#[tokio::test]
async fn approve_action_requires_a_session() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let id = app
        .store
        .seed_deposit_with_email(user, "BTC", dec("25"), "user@example.com");

    let response = app
        .post_form(&format!("/admin/deposits/{id}/approve"), "", false)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/admin/login?next="));
    assert_eq!(app.store.deposit(id).unwrap().status, status::PENDING);
}

#[tokio::test]
async fn withdrawal_approval_with_short_balance_reports_the_error() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    app.store.seed_profile(user, "user@example.com");
    app.store.set_balance(user, "BTC", dec("50"));
    let id = app.store.seed_withdrawal(user, "BTC", dec("100"), dec("1"));

    let response = app
        .post_form(&format!("/admin/withdrawals/{id}/approve"), "", true)
        .await;
    assert_redirect(&response, "/admin/withdrawals/pending");
    assert_eq!(app.store.withdrawal(id).unwrap().status, status::PENDING);
    assert_eq!(app.store.balance(user, "BTC"), Some(dec("50")));
}

#[tokio::test]
async fn plans_can_be_created_through_the_form() {
    let app = TestApp::new();
    let form = "name=Starter&percentage=2.5&min_amount=100&duration_days=30&is_active=on";
    let response = app.post_form("/admin/plans", form, true).await;
    assert_redirect(&response, "/admin/plans");

    let body = body_json(app.get("/admin/plans", true).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Starter");
    assert_eq!(body["data"][0]["is_active"], true);
}

#[tokio::test]
async fn plan_with_zero_percentage_is_rejected() {
    let app = TestApp::new();
    let form = "name=Broken&percentage=0";
    let response = app.post_form("/admin/plans", form, true).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn default_wallet_is_exclusive_per_coin() {
    let app = TestApp::new();
    let first = "coin=btc&address=addr-one&is_active=on&is_default=on";
    let second = "coin=BTC&address=addr-two&is_active=on&is_default=on";
    app.post_form("/admin/wallets", first, true).await;
    app.post_form("/admin/wallets", second, true).await;

    let body = body_json(app.get("/admin/wallets", true).await).await;
    let wallets = body["data"].as_array().unwrap();
    assert_eq!(wallets.len(), 2);
    let defaults: Vec<&str> = wallets
        .iter()
        .filter(|w| w["is_default"] == true)
        .map(|w| w["address"].as_str().unwrap())
        .collect();
    assert_eq!(defaults, vec!["addr-two"]);
}

#[tokio::test]
async fn creating_a_user_provisions_identity_and_profile() {
    let app = TestApp::new();
    let form =
        "email=New%40Example.com&password=longenough1&first_name=Ada&send_welcome=on";
    let response = app.post_form("/admin/users", form, true).await;
    assert_redirect(&response, "/admin/users");

    let body = body_json(app.get("/admin/users", true).await).await;
    assert_eq!(body["data"][0]["email"], "new@example.com");

    app.wait_for_mail(1).await;
    let sent = app.mailer.sent();
    assert_eq!(sent[0].to, "new@example.com");
    assert_eq!(sent[0].subject, "Welcome to CryptoPrime");
}

#[tokio::test]
async fn short_password_is_rejected_on_user_creation() {
    let app = TestApp::new();
    let form = "email=new%40example.com&password=short";
    let response = app.post_form("/admin/users", form, true).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_updates_are_limited_to_known_values() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    app.store.seed_profile(user, "user@example.com");

    let response = app
        .post_form(&format!("/admin/users/{user}/status"), "status=banana", true)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_form(
            &format!("/admin/users/{user}/status"),
            "status=suspended",
            true,
        )
        .await;
    assert_redirect(&response, "/admin/users");
}

#[tokio::test]
async fn earnings_require_a_known_email() {
    let app = TestApp::new();
    let response = app
        .post_form(
            "/admin/earnings",
            "user_email=ghost%40example.com&amount=25",
            true,
        )
        .await;
    assert_redirect(&response, "/admin/earnings");
    let flash = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/admin/earnings")
        .header(
            header::COOKIE,
            format!("{}; {}", app.session_cookie(), flash),
        )
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router(), request).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["recent"].as_array().unwrap().len(), 0);
    assert_eq!(body["toast"]["kind"], "error");
}

#[tokio::test]
async fn earnings_credit_lands_in_the_ledger() {
    let app = TestApp::new();
    app.store.seed_profile(Uuid::new_v4(), "user@example.com");
    let response = app
        .post_form(
            "/admin/earnings",
            "user_email=user%40example.com&amount=25.5&note=march+yield",
            true,
        )
        .await;
    assert_redirect(&response, "/admin/earnings");

    let body = body_json(app.get("/admin/earnings", true).await).await;
    let recent = body["data"]["recent"].as_array().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["user_email"], "user@example.com");
    assert_eq!(recent[0]["note"], "march yield");
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let app = TestApp::new();
    let response = app.post_form("/admin/logout", "", true).await;
    assert_redirect(&response, "/admin/login");
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.contains("vd_session="));
}

#[tokio::test]
async fn toast_from_a_redirect_is_consumed_once() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let id = app
        .store
        .seed_deposit_with_email(user, "BTC", dec("25"), "user@example.com");
    let response = app
        .post_form(&format!("/admin/deposits/{id}/approve"), "", true)
        .await;
    let flash = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    // Replay the flash cookie against the list screen; the toast appears
    // once and the cookie is cleared.
    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/admin/deposits/pending")
        .header(
            header::COOKIE,
            format!("{}; {}", app.session_cookie(), flash),
        )
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router(), request).await.unwrap();
    let clears_flash = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .any(|v| v.to_str().unwrap_or_default().starts_with("vd_flash="));
    let body = body_json(response).await;
    assert_eq!(body["toast"]["kind"], "success");
    assert!(clears_flash);
}
