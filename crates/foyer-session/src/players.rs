//! Typed access to player records.

use std::sync::Arc;

use foyer_protocol::PlayerName;
use foyer_store::records::{self, PlayerRecord};
use foyer_store::{DocumentStore, StoreError};

/// Reads and updates player records through a shared store handle.
pub struct PlayerDirectory<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> Clone for PlayerDirectory<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> PlayerDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Loads a player's record.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the player is not registered.
    pub async fn get(&self, name: &PlayerName) -> Result<PlayerRecord, StoreError> {
        let doc = self.store.get(&records::player_key(name)).await?;
        records::from_document(doc)
    }

    /// Creates the record for a new registration.
    ///
    /// # Errors
    /// [`StoreError::AlreadyExists`] if the name is taken.
    pub async fn create(&self, name: &PlayerName, record: &PlayerRecord) -> Result<(), StoreError> {
        let doc = records::to_document(record)?;
        self.store.create(&records::player_key(name), doc).await
    }

    /// Sets the player's presence status code.
    pub async fn set_status(&self, name: &PlayerName, status_code: i64) -> Result<(), StoreError> {
        self.store
            .update(
                &records::player_key(name),
                records::STATUS_CODE,
                status_code.into(),
            )
            .await
    }

    /// Deletes the player's record.
    pub async fn remove(&self, name: &PlayerName) -> Result<(), StoreError> {
        self.store.delete(&records::player_key(name)).await
    }
}

#[cfg(test)]
mod tests {
    use foyer_store::MemoryStore;

    use super::*;

    fn record() -> PlayerRecord {
        PlayerRecord {
            password: "pw".into(),
            status_code: 0,
            created_at: records::now_millis(),
        }
    }

    #[tokio::test]
    async fn test_set_status_updates_record() {
        let players = PlayerDirectory::new(Arc::new(MemoryStore::new()));
        let alice = PlayerName::new("alice");
        players.create(&alice, &record()).await.unwrap();

        players.set_status(&alice, 4).await.unwrap();

        assert_eq!(players.get(&alice).await.unwrap().status_code, 4);
    }

    #[tokio::test]
    async fn test_set_status_for_unknown_player_fails() {
        let players = PlayerDirectory::new(Arc::new(MemoryStore::new()));
        let result = players.set_status(&PlayerName::new("ghost"), 1).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_deletes_record() {
        let players = PlayerDirectory::new(Arc::new(MemoryStore::new()));
        let alice = PlayerName::new("alice");
        players.create(&alice, &record()).await.unwrap();

        players.remove(&alice).await.unwrap();

        assert!(matches!(players.get(&alice).await, Err(StoreError::NotFound(_))));
    }
}
