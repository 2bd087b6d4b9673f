//! Per-room chat logs.

use std::sync::Arc;

use foyer_protocol::{PlayerName, RoomId};
use foyer_store::records::{self, ChatMessage};
use foyer_store::{DocumentStore, StoreError};

use crate::RoomError;

/// Appends messages to room chat logs.
pub struct ChatLog<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> Clone for ChatLog<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> ChatLog<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Appends one message, stamped with the current time, to the room's
    /// chat log.
    ///
    /// Does not check that `author` is a member of the room.
    pub async fn append(
        &self,
        room: &RoomId,
        author: &PlayerName,
        content: &str,
    ) -> Result<(), RoomError> {
        let message = ChatMessage {
            timestamp: records::now_millis(),
            player_name: author.clone(),
            content: content.to_owned(),
        };
        self.store
            .array_append(
                &records::chat_key(room),
                records::MESSAGES,
                records::to_value(&message)?,
            )
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => RoomError::NotFound(room.clone()),
                other => RoomError::Store(other),
            })?;
        tracing::debug!(%room, %author, "chat message appended");
        Ok(())
    }
}
