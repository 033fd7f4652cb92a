use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::MailConfig;
use crate::notify::mailer::DynMailTransport;
use crate::notify::{templates, Notice, NotifyError};

/// Renders and delivers notices. Approval flows use [`Dispatcher::spawn`] so
/// a slow or broken provider never blocks or fails the workflow; the notify
/// API uses [`Dispatcher::deliver`] and reports transport failures upstream.
pub struct Dispatcher {
    transport: DynMailTransport,
    mail: MailConfig,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(transport: DynMailTransport, mail: MailConfig, timeout_secs: u64) -> Self {
        Self {
            transport,
            mail,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn admin_recipients(&self) -> &[String] {
        &self.mail.admin_alert_emails
    }

    pub async fn deliver(&self, notice: &Notice) -> Result<(), NotifyError> {
        let rendered = templates::render(notice, &self.mail);
        let to = notice.recipient();
        match tokio::time::timeout(self.timeout, self.transport.send(to, &rendered)).await {
            Ok(result) => {
                if result.is_ok() {
                    debug!(kind = notice.kind(), to = %to, "Notice delivered");
                }
                result
            }
            Err(_) => Err(NotifyError::Timeout(self.timeout.as_secs())),
        }
    }

    /// Fire-and-forget delivery. Failures are logged and swallowed.
    pub fn spawn(self: &Arc<Self>, notice: Notice) {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = dispatcher.deliver(&notice).await {
                warn!(kind = notice.kind(), to = notice.recipient(), error = %e,
                      "Notice delivery failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::mailer::RecordingMailer;
    use crate::notify::MailTransport;

    fn mail_config() -> MailConfig {
        MailConfig {
            endpoint: "https://mail.example.com".into(),
            api_key: "k".into(),
            from: "no-reply@example.com".into(),
            brand: "CryptoPrime".into(),
            dashboard_url: "https://app.example.com".into(),
            admin_alert_emails: vec!["ops@example.com".into()],
        }
    }

    #[tokio::test]
    async fn deliver_renders_and_sends() {
        let recorder = RecordingMailer::new();
        let dispatcher = Dispatcher::new(Arc::new(recorder.clone()), mail_config(), 8);

        dispatcher
            .deliver(&Notice::Welcome {
                email: "new@example.com".into(),
                first_name: None,
            })
            .await
            .unwrap();

        let sent = recorder.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "new@example.com");
        assert_eq!(sent[0].subject, "Welcome to CryptoPrime");
    }

    #[tokio::test]
    async fn deliver_surfaces_transport_failure() {
        let recorder = RecordingMailer::new();
        recorder.fail_next_sends();
        let dispatcher = Dispatcher::new(Arc::new(recorder), mail_config(), 8);

        let err = dispatcher
            .deliver(&Notice::Welcome {
                email: "new@example.com".into(),
                first_name: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)));
    }

    #[tokio::test]
    async fn deliver_times_out_on_stuck_transport() {
        struct StuckTransport;

        #[async_trait::async_trait]
        impl MailTransport for StuckTransport {
            async fn send(
                &self,
                _to: &str,
                _mail: &crate::notify::RenderedMail,
            ) -> Result<(), NotifyError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }

        tokio::time::pause();
        let dispatcher = Dispatcher::new(Arc::new(StuckTransport), mail_config(), 8);
        let err = dispatcher
            .deliver(&Notice::Welcome {
                email: "new@example.com".into(),
                first_name: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::Timeout(8)));
    }
}
