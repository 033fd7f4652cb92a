#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use vaultdesk::config::{
    AdminConfig, AppConfig, DatabaseConfig, MailConfig, NotifyConfig, ServerConfig,
};
use vaultdesk::middleware::session::{issue_session, SESSION_COOKIE};
use vaultdesk::notify::RecordingMailer;
use vaultdesk::routes;
use vaultdesk::state::{AppState, Stores};
use vaultdesk::store::MemoryStore;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";
pub const NOTIFY_KEY: &str = "notify-test-key";

pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig { port: 0 },
        database: DatabaseConfig {
            url: "postgres://unused".into(),
            max_connections: 1,
            connect_timeout_secs: 1,
        },
        admin: AdminConfig {
            email: ADMIN_EMAIL.into(),
            password: ADMIN_PASSWORD.into(),
            session_secret: "test-session-secret".into(),
            session_hours: 12,
        },
        mail: MailConfig {
            endpoint: "https://mail.invalid".into(),
            api_key: "mail-key".into(),
            from: "no-reply@example.com".into(),
            brand: "CryptoPrime".into(),
            dashboard_url: "https://app.example.com".into(),
            admin_alert_emails: vec!["ops@example.com".into(), "risk@example.com".into()],
        },
        notify: NotifyConfig {
            api_key: Some(NOTIFY_KEY.into()),
            timeout_secs: 2,
            allowed_origins: vec![],
            directory_url: "http://directory.invalid".into(),
            directory_key: "directory-key".into(),
        },
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: MemoryStore,
    pub mailer: RecordingMailer,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        let mailer = RecordingMailer::new();
        let state = AppState::new(config, Stores::from_memory(&store), Arc::new(mailer.clone()));
        Self {
            state,
            store,
            mailer,
        }
    }

    pub fn router(&self) -> Router {
        routes::router(self.state.clone())
    }

    pub fn session_cookie(&self) -> String {
        let admin = &self.state.config.admin;
        let token = issue_session(&admin.email, &admin.session_secret, admin.session_hours)
            .expect("session token");
        format!("{SESSION_COOKIE}={token}")
    }

    pub async fn get(&self, path: &str, authed: bool) -> Response {
        let mut request = Request::builder().method("GET").uri(path);
        if authed {
            request = request.header(header::COOKIE, self.session_cookie());
        }
        self.router()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &str, authed: bool) -> Response {
        let mut request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if authed {
            request = request.header(header::COOKIE, self.session_cookie());
        }
        self.router()
            .oneshot(request.body(Body::from(form.to_string())).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_json(&self, path: &str, key: Option<&str>, body: Value) -> Response {
        let mut request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            request = request.header("x-notify-key", key);
        }
        self.router()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    /// Spawned notification tasks land asynchronously; poll until the
    /// recorder has at least `count` messages.
    pub async fn wait_for_mail(&self, count: usize) {
        for _ in 0..200 {
            if self.mailer.sent().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!(
            "expected at least {count} mails, saw {}",
            self.mailer.sent().len()
        );
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub fn assert_redirect(response: &Response, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), to);
}
