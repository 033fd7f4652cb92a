pub mod engine;
pub mod recipient;

pub use engine::ApprovalEngine;
pub use recipient::{RecipientResolver, ResolvedRecipient};

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    RecipientUnresolved(String),

    #[error("{0}")]
    InsufficientFunds(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a conditional transition. `AlreadyProcessed` means another
/// actor won the race and the record is no longer pending; callers report
/// it as information, not as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    AlreadyProcessed,
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }
}
