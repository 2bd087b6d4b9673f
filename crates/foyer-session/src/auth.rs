//! Login verification.
//!
//! The connection handler doesn't know where credentials are kept. It asks
//! an [`Authenticator`], which either vouches for the claimed name or says
//! why not. [`StoreAuthenticator`] checks the credential against the
//! player record created at registration.

use std::future::Future;
use std::sync::Arc;

use foyer_protocol::Credentials;
use foyer_store::records::PlayerRecord;
use foyer_store::{DocumentStore, StoreError};

use crate::{PlayerDirectory, SessionError};

/// Verifies a client's login message.
///
/// `Send + Sync + 'static` because one authenticator is shared by every
/// connection task for the lifetime of the server.
pub trait Authenticator: Send + Sync + 'static {
    /// Checks the credentials and returns the player's record on success.
    ///
    /// # Errors
    /// - [`SessionError::InvalidPlayer`]: nobody is registered under the name
    /// - [`SessionError::InvalidCredential`]: the credential does not match
    /// - [`SessionError::Store`]: the lookup itself failed
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<PlayerRecord, SessionError>> + Send;
}

/// Authenticates against player records in a [`DocumentStore`].
pub struct StoreAuthenticator<S: DocumentStore> {
    players: PlayerDirectory<S>,
}

impl<S: DocumentStore> StoreAuthenticator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            players: PlayerDirectory::new(store),
        }
    }
}

impl<S: DocumentStore> Authenticator for StoreAuthenticator<S> {
    async fn authenticate(&self, credentials: &Credentials) -> Result<PlayerRecord, SessionError> {
        let record = match self.players.get(&credentials.name).await {
            Ok(record) => record,
            Err(StoreError::NotFound(_)) => {
                return Err(SessionError::InvalidPlayer(credentials.name.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        if record.password != credentials.credential {
            return Err(SessionError::InvalidCredential(credentials.name.clone()));
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use foyer_protocol::PlayerName;
    use foyer_store::records;
    use foyer_store::MemoryStore;

    use super::*;

    async fn auth_with_alice() -> StoreAuthenticator<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        PlayerDirectory::new(Arc::clone(&store))
            .create(
                &PlayerName::new("alice"),
                &PlayerRecord {
                    password: "s3cret".into(),
                    status_code: 0,
                    created_at: records::now_millis(),
                },
            )
            .await
            .unwrap();
        StoreAuthenticator::new(store)
    }

    fn creds(name: &str, credential: &str) -> Credentials {
        Credentials {
            name: PlayerName::new(name),
            credential: credential.into(),
            room_ref: None,
        }
    }

    #[tokio::test]
    async fn test_authenticate_matching_credential_returns_record() {
        let auth = auth_with_alice().await;
        let record = auth.authenticate(&creds("alice", "s3cret")).await.unwrap();
        assert_eq!(record.password, "s3cret");
    }

    #[tokio::test]
    async fn test_authenticate_unknown_player_is_invalid_player() {
        let auth = auth_with_alice().await;
        let result = auth.authenticate(&creds("mallory", "s3cret")).await;
        assert!(matches!(result, Err(SessionError::InvalidPlayer(_))));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_credential_is_invalid_credential() {
        let auth = auth_with_alice().await;
        let result = auth.authenticate(&creds("alice", "guess")).await;
        match result {
            Err(e @ SessionError::InvalidCredential(_)) => {
                assert_eq!(e.close_reason().as_str(), "Invalid password");
            }
            other => panic!("expected InvalidCredential, got {other:?}"),
        }
    }
}
