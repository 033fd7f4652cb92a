use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::store::error::StoreError;

pub type DynUserDirectory = Arc<dyn UserDirectory + Send + Sync>;

/// Identity provider user directory. Consulted as the last stop in the
/// recipient resolution chain, and used to mint accounts when an admin
/// creates a user from the console.
#[async_trait]
pub trait UserDirectory {
    async fn email_for(&self, user_id: Uuid) -> Result<Option<String>, StoreError>;
    async fn create_user(&self, email: &str, password: &str) -> Result<Uuid, StoreError>;
}

/// Directory client for the hosted identity provider's admin API.
pub struct HttpUserDirectory {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

#[derive(Deserialize)]
struct DirectoryUser {
    id: Option<Uuid>,
    email: Option<String>,
}

#[derive(Deserialize)]
struct DirectoryEnvelope {
    user: Option<DirectoryUser>,
    email: Option<String>,
    id: Option<Uuid>,
}

impl HttpUserDirectory {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            service_key: service_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn email_for(&self, user_id: Uuid) -> Result<Option<String>, StoreError> {
        let res = self
            .client
            .get(self.url(&format!("/admin/users/{}", user_id)))
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| StoreError::Query(format!("directory lookup failed: {}", e)))?;

        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(StoreError::Query(format!(
                "directory lookup returned {}",
                res.status()
            )));
        }

        let body: DirectoryEnvelope = res
            .json()
            .await
            .map_err(|e| StoreError::Query(format!("directory response invalid: {}", e)))?;

        // Some deployments nest the user object, some return it flat.
        Ok(body.user.and_then(|u| u.email).or(body.email))
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<Uuid, StoreError> {
        let res = self
            .client
            .post(self.url("/admin/users"))
            .bearer_auth(&self.service_key)
            .json(&json!({ "email": email, "password": password, "email_confirm": true }))
            .send()
            .await
            .map_err(|e| StoreError::Query(format!("directory create failed: {}", e)))?;

        if !res.status().is_success() {
            return Err(StoreError::Query(format!(
                "directory create returned {}",
                res.status()
            )));
        }

        let body: DirectoryEnvelope = res
            .json()
            .await
            .map_err(|e| StoreError::Query(format!("directory response invalid: {}", e)))?;

        body.user
            .and_then(|u| u.id)
            .or(body.id)
            .ok_or_else(|| StoreError::Query("directory create returned no user id".into()))
    }
}
