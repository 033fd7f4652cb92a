pub mod dispatcher;
pub mod mailer;
pub mod templates;

pub use dispatcher::Dispatcher;
pub use mailer::{DynMailTransport, HttpMailer, MailTransport, RecordingMailer, SentMail};
pub use templates::RenderedMail;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Delivery timed out after {0}s")]
    Timeout(u64),
}

/// The transfer facts a notification carries. Deposits leave `fee` and
/// `txid` unset; withdrawals fill them in.
#[derive(Debug, Clone)]
pub struct TransferDetails {
    pub id: i64,
    pub coin: String,
    pub amount: Decimal,
    pub fee: Option<Decimal>,
    pub address: Option<String>,
    pub txid: Option<String>,
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

/// One variant per (entity kind x event). Ephemeral: rendered, handed to the
/// transport, and never persisted or retried.
#[derive(Debug, Clone)]
pub enum Notice {
    Welcome {
        email: String,
        first_name: Option<String>,
    },
    DepositPending {
        email: String,
        details: TransferDetails,
    },
    DepositStatus {
        email: String,
        status: String,
        details: TransferDetails,
    },
    WithdrawalPending {
        email: String,
        details: TransferDetails,
    },
    WithdrawalStatus {
        email: String,
        status: String,
        details: TransferDetails,
    },
    AdminDepositAlert {
        admin_to: String,
        user_email: String,
        details: TransferDetails,
    },
    AdminWithdrawalAlert {
        admin_to: String,
        user_email: String,
        details: TransferDetails,
    },
}

impl Notice {
    pub fn recipient(&self) -> &str {
        match self {
            Notice::Welcome { email, .. }
            | Notice::DepositPending { email, .. }
            | Notice::DepositStatus { email, .. }
            | Notice::WithdrawalPending { email, .. }
            | Notice::WithdrawalStatus { email, .. } => email,
            Notice::AdminDepositAlert { admin_to, .. }
            | Notice::AdminWithdrawalAlert { admin_to, .. } => admin_to,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notice::Welcome { .. } => "welcome",
            Notice::DepositPending { .. } => "deposit-pending",
            Notice::DepositStatus { .. } => "deposit-status",
            Notice::WithdrawalPending { .. } => "withdrawal-pending",
            Notice::WithdrawalStatus { .. } => "withdrawal-status",
            Notice::AdminDepositAlert { .. } => "admin-deposit-alert",
            Notice::AdminWithdrawalAlert { .. } => "admin-withdrawal-alert",
        }
    }
}
