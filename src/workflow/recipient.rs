use tracing::{debug, warn};
use uuid::Uuid;

use crate::store::{DynProfileStore, DynUserDirectory};
use crate::workflow::WorkflowError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecipient {
    pub email: String,
    /// Which source produced the address: `record`, `profile` or `directory`.
    pub source: &'static str,
}

/// Resolves the notification recipient for a transfer request. Sources are
/// consulted in a fixed order: the email denormalized onto the record, then
/// the profiles table, then the identity directory. A source that errors is
/// logged and skipped so a flaky directory cannot mask an address the
/// profiles table already has.
pub struct RecipientResolver {
    profiles: DynProfileStore,
    directory: DynUserDirectory,
}

impl RecipientResolver {
    pub fn new(profiles: DynProfileStore, directory: DynUserDirectory) -> Self {
        Self {
            profiles,
            directory,
        }
    }

    pub async fn resolve(
        &self,
        record_email: Option<&str>,
        user_id: Uuid,
    ) -> Result<ResolvedRecipient, WorkflowError> {
        if let Some(email) = record_email.map(str::trim).filter(|e| !e.is_empty()) {
            return Ok(ResolvedRecipient {
                email: email.to_string(),
                source: "record",
            });
        }

        match self.profiles.email_for(user_id).await {
            Ok(Some(email)) => {
                return Ok(ResolvedRecipient {
                    email,
                    source: "profile",
                })
            }
            Ok(None) => debug!(user_id = %user_id, "No profile email, trying directory"),
            Err(e) => warn!(user_id = %user_id, error = %e, "Profile lookup failed"),
        }

        match self.directory.email_for(user_id).await {
            Ok(Some(email)) => {
                return Ok(ResolvedRecipient {
                    email,
                    source: "directory",
                })
            }
            Ok(None) => {}
            Err(e) => warn!(user_id = %user_id, error = %e, "Directory lookup failed"),
        }

        Err(WorkflowError::RecipientUnresolved(format!(
            "No email address on file for user {user_id}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn resolver(store: &MemoryStore) -> RecipientResolver {
        RecipientResolver::new(Arc::new(store.clone()), Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn record_email_wins_over_profile() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.seed_profile(user, "profile@example.com");

        let got = resolver(&store)
            .resolve(Some("record@example.com"), user)
            .await
            .unwrap();
        assert_eq!(got.email, "record@example.com");
        assert_eq!(got.source, "record");
    }

    #[tokio::test]
    async fn blank_record_email_falls_through_to_profile() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.seed_profile(user, "profile@example.com");

        let got = resolver(&store).resolve(Some("   "), user).await.unwrap();
        assert_eq!(got.email, "profile@example.com");
        assert_eq!(got.source, "profile");
    }

    #[tokio::test]
    async fn directory_is_the_last_resort() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.seed_directory_email(user, "directory@example.com");

        let got = resolver(&store).resolve(None, user).await.unwrap();
        assert_eq!(got.email, "directory@example.com");
        assert_eq!(got.source, "directory");
    }

    #[tokio::test]
    async fn exhausted_chain_is_unresolved() {
        let store = MemoryStore::new();
        let err = resolver(&store)
            .resolve(None, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::RecipientUnresolved(_)));
    }
}
