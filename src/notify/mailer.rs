use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::MailConfig;
use crate::notify::templates::RenderedMail;
use crate::notify::NotifyError;

#[async_trait]
pub trait MailTransport {
    async fn send(&self, to: &str, mail: &RenderedMail) -> Result<(), NotifyError>;
}

pub type DynMailTransport = Arc<dyn MailTransport + Send + Sync>;

/// Sends through the provider's HTTP API. One message per request; the
/// provider handles queueing and retries on its side.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(mail: &MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: mail.endpoint.trim_end_matches('/').to_string(),
            api_key: mail.api_key.clone(),
            from: mail.from.clone(),
        }
    }
}

#[async_trait]
impl MailTransport for HttpMailer {
    async fn send(&self, to: &str, mail: &RenderedMail) -> Result<(), NotifyError> {
        let url = format!("{}/send", self.endpoint);
        let body = json!({
            "from": self.from,
            "to": to,
            "subject": mail.subject,
            "html": mail.html,
            "text": mail.text,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(NotifyError::Transport(format!(
                "provider returned {status}: {detail}"
            )));
        }

        debug!(to = %to, subject = %mail.subject, "Mail accepted by provider");
        Ok(())
    }
}

/// Test transport that records every send instead of talking to a provider.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
    fail: Arc<Mutex<bool>>,
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Makes every subsequent send fail, for exercising error paths.
    pub fn fail_next_sends(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, to: &str, mail: &RenderedMail) -> Result<(), NotifyError> {
        if *self.fail.lock().unwrap() {
            return Err(NotifyError::Transport("simulated provider outage".into()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: mail.subject.clone(),
            text: mail.text.clone(),
        });
        Ok(())
    }
}
