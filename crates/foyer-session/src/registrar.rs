//! Player registration and expiry of unconfirmed registrations.

use std::sync::Arc;
use std::time::Duration;

use foyer_protocol::{PlayerName, RegisterRequest, Registration};
use foyer_store::records::{self, PlayerRecord};
use foyer_store::{DocumentStore, StoreError};

use crate::pending::{PendingRegistrations, Ticket};
use crate::{generate_credential, PlayerDirectory, SessionConfig, SessionError};

/// Longest accepted player name, in characters.
pub const MAX_NAME_LEN: usize = 20;

/// Creates player records and deletes the ones nobody logs in to.
///
/// Every successful [`register`](Self::register) spawns one timer task. The
/// task waits for either a login ([`confirm`](Self::confirm)) or the expiry
/// window, and on expiry deletes the record.
pub struct Registrar<S: DocumentStore> {
    players: PlayerDirectory<S>,
    pending: PendingRegistrations,
    expiry: Duration,
}

impl<S: DocumentStore> Registrar<S> {
    pub fn new(store: Arc<S>, config: &SessionConfig) -> Self {
        Self {
            players: PlayerDirectory::new(store),
            pending: PendingRegistrations::new(),
            expiry: config.registration_expiry,
        }
    }

    pub fn pending(&self) -> &PendingRegistrations {
        &self.pending
    }

    /// Registers a new player and arms its expiry timer.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// - [`SessionError::Validation`]: the name is empty or too long
    /// - [`SessionError::AlreadyExists`]: a record under the name exists
    /// - [`SessionError::Store`]: the record could not be written
    pub async fn register(&self, request: &RegisterRequest) -> Result<Registration, SessionError> {
        let name = validate_name(&request.name)?;
        let credential = generate_credential();

        let record = PlayerRecord {
            password: credential.clone(),
            status_code: 0,
            created_at: records::now_millis(),
        };
        match self.players.create(&name, &record).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists(_)) => return Err(SessionError::AlreadyExists(name)),
            Err(e) => return Err(e.into()),
        }

        let (ticket, cancelled) = self.pending.insert(name.clone()).await;
        self.spawn_expiry(name.clone(), ticket, cancelled);

        tracing::info!(player = %name, expiry = ?self.expiry, "player registered");
        Ok(Registration { name, credential })
    }

    /// Cancels the expiry for `name` after a successful login.
    ///
    /// Returns `false` if no expiry was pending, which happens when the
    /// timer already fired or the player logged in before. Never blocks.
    pub async fn confirm(&self, name: &PlayerName) -> bool {
        let confirmed = self.pending.confirm(name).await;
        if confirmed {
            tracing::debug!(player = %name, "registration confirmed");
        }
        confirmed
    }

    fn spawn_expiry(
        &self,
        name: PlayerName,
        ticket: Ticket,
        cancelled: tokio::sync::oneshot::Receiver<()>,
    ) {
        let players = self.players.clone();
        let pending = self.pending.clone();
        let expiry = self.expiry;

        tokio::spawn(async move {
            tokio::select! {
                // A dropped sender means the entry was superseded; either way
                // this timer is done.
                _ = cancelled => return,
                () = tokio::time::sleep(expiry) => {}
            }

            if !pending.expire(&name, ticket).await {
                return;
            }
            match players.remove(&name).await {
                Ok(()) => tracing::info!(player = %name, "unconfirmed registration expired"),
                Err(e) => {
                    tracing::warn!(player = %name, error = %e, "failed to delete expired registration");
                }
            }
        });
    }
}

fn validate_name(raw: &str) -> Result<PlayerName, SessionError> {
    if raw.trim().is_empty() {
        return Err(SessionError::Validation("name is required".into()));
    }
    let name = PlayerName::new(raw);
    if name.char_len() > MAX_NAME_LEN {
        return Err(SessionError::Validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use foyer_store::MemoryStore;

    use super::*;
    use crate::CREDENTIAL_LEN;

    const EXPIRY: Duration = Duration::from_secs(120);

    fn registrar() -> (Arc<MemoryStore>, Registrar<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = SessionConfig {
            registration_expiry: EXPIRY,
            ..SessionConfig::default()
        };
        (Arc::clone(&store), Registrar::new(store, &config))
    }

    fn request(name: &str) -> RegisterRequest {
        RegisterRequest { name: name.into() }
    }

    async fn is_registered(store: &MemoryStore, name: &str) -> bool {
        store
            .contains(&records::player_key(&PlayerName::new(name)))
            .await
    }

    /// Lets spawned timer tasks run after the clock moves.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_returns_generated_credential() {
        let (store, registrar) = registrar();

        let registration = registrar.register(&request("alice")).await.unwrap();

        assert_eq!(registration.name.as_str(), "alice");
        assert_eq!(registration.credential.chars().count(), CREDENTIAL_LEN);
        let record = PlayerDirectory::new(store)
            .get(&PlayerName::new("alice"))
            .await
            .unwrap();
        assert_eq!(record.password, registration.credential);
        assert_eq!(record.status_code, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_same_name_twice_already_exists() {
        let (_store, registrar) = registrar();
        registrar.register(&request("alice")).await.unwrap();

        let result = registrar.register(&request("alice")).await;

        assert!(matches!(result, Err(SessionError::AlreadyExists(ref n)) if n.as_str() == "alice"));
        assert_eq!(registrar.pending().len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_empty_name_is_validation_error() {
        let (store, registrar) = registrar();

        let result = registrar.register(&request("  ")).await;

        assert!(matches!(result, Err(SessionError::Validation(_))));
        assert_eq!(store.count(records::PLAYERS).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_name_too_long_is_validation_error() {
        let (_store, registrar) = registrar();

        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            registrar.register(&request(&long)).await,
            Err(SessionError::Validation(_))
        ));

        let exact = "x".repeat(MAX_NAME_LEN);
        assert!(registrar.register(&request(&exact)).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconfirmed_registration_deleted_after_expiry() {
        let (store, registrar) = registrar();
        registrar.register(&request("alice")).await.unwrap();

        tokio::time::sleep(EXPIRY - Duration::from_secs(1)).await;
        settle().await;
        assert!(is_registered(&store, "alice").await);

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        assert!(!is_registered(&store, "alice").await);
        assert!(registrar.pending().is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_registration_survives_expiry() {
        let (store, registrar) = registrar();
        registrar.register(&request("alice")).await.unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(registrar.confirm(&PlayerName::new("alice")).await);

        tokio::time::sleep(EXPIRY * 2).await;
        settle().await;
        assert!(is_registered(&store, "alice").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_after_expiry_is_safe_noop() {
        let (store, registrar) = registrar();
        registrar.register(&request("alice")).await.unwrap();

        tokio::time::sleep(EXPIRY + Duration::from_secs(1)).await;
        settle().await;

        assert!(!registrar.confirm(&PlayerName::new("alice")).await);
        assert!(!registrar.confirm(&PlayerName::new("alice")).await);
        assert!(!is_registered(&store, "alice").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_name_can_be_registered_again_after_expiry() {
        let (store, registrar) = registrar();
        registrar.register(&request("alice")).await.unwrap();

        tokio::time::sleep(EXPIRY + Duration::from_secs(1)).await;
        settle().await;

        registrar.register(&request("alice")).await.unwrap();
        assert!(is_registered(&store, "alice").await);
    }
}
