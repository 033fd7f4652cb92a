use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Immutable application configuration, built once at startup and passed to
/// every component through the shared state. The shared secret, alert
/// allow-list and mail credentials all live here; nothing reads env vars
/// after boot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub mail: MailConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

/// The single staff credential plus session signing material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    pub session_secret: String,
    pub session_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// HTTP mail provider endpoint; deliveries POST to `{endpoint}/send`.
    pub endpoint: String,
    pub api_key: String,
    pub from: String,
    pub brand: String,
    pub dashboard_url: String,
    /// Staff recipients for admin alert emails. Empty list disables alerts.
    pub admin_alert_emails: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Shared secret for the inbound notify API. None disables the check.
    pub api_key: Option<String>,
    /// Upper bound on any single outbound delivery.
    pub timeout_secs: u64,
    pub allowed_origins: Vec<String>,
    /// Base URL and service key of the identity provider's admin API.
    pub directory_url: String,
    pub directory_key: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let admin_email =
            env::var("ADMIN_EMAIL").map_err(|_| ConfigError::Missing("ADMIN_EMAIL"))?;
        let admin_password =
            env::var("ADMIN_PASSWORD").map_err(|_| ConfigError::Missing("ADMIN_PASSWORD"))?;
        let session_secret =
            env::var("SESSION_SECRET").map_err(|_| ConfigError::Missing("SESSION_SECRET"))?;

        Ok(Self {
            server: ServerConfig {
                port: parse_or("PORT", 5050)?,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
                connect_timeout_secs: parse_or("DATABASE_CONNECT_TIMEOUT", 30)?,
            },
            admin: AdminConfig {
                email: admin_email,
                password: admin_password,
                session_secret,
                session_hours: parse_or("SESSION_HOURS", 8)?,
            },
            mail: MailConfig {
                endpoint: env::var("MAIL_ENDPOINT")
                    .map_err(|_| ConfigError::Missing("MAIL_ENDPOINT"))?,
                api_key: env::var("MAIL_API_KEY")
                    .map_err(|_| ConfigError::Missing("MAIL_API_KEY"))?,
                from: env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "\"VaultDesk\" <no-reply@vaultdesk.app>".to_string()),
                brand: env::var("MAIL_BRAND").unwrap_or_else(|_| "VaultDesk".to_string()),
                dashboard_url: env::var("DASHBOARD_URL")
                    .unwrap_or_else(|_| "https://vaultdesk.app/login".to_string()),
                admin_alert_emails: split_list(env::var("ADMIN_ALERT_EMAILS").ok()),
            },
            notify: NotifyConfig {
                api_key: env::var("NOTIFY_API_KEY").ok().filter(|k| !k.is_empty()),
                timeout_secs: parse_or("NOTIFY_TIMEOUT_SECS", 8)?,
                allowed_origins: split_list(env::var("ALLOWED_ORIGINS").ok()),
                directory_url: env::var("DIRECTORY_URL").unwrap_or_default(),
                directory_key: env::var("DIRECTORY_SERVICE_KEY").unwrap_or_default(),
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{} ({})", key, raw))),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    })
    .unwrap_or_default()
}
