//! Room creation, joining and leaving.

use std::sync::Arc;

use foyer_protocol::{PlayerName, RoomId, RoomSpec};
use foyer_session::PlayerDirectory;
use foyer_store::records::{self, ChatRecord, RoomRecord};
use foyer_store::{DocumentStore, StoreError};

use crate::RoomError;

/// Status code a player gets on joining a room.
const JOINED_STATUS: i64 = 0;

/// Runs room operations against a shared store handle.
///
/// Holds no room state of its own; cloning is cheap and every clone sees
/// the same rooms.
pub struct RoomController<S: DocumentStore> {
    store: Arc<S>,
    players: PlayerDirectory<S>,
}

impl<S: DocumentStore> Clone for RoomController<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            players: self.players.clone(),
        }
    }
}

impl<S: DocumentStore> RoomController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            players: PlayerDirectory::new(Arc::clone(&store)),
            store,
        }
    }

    /// Creates an empty room and its chat log, returning the room's id.
    ///
    /// The room is written first so the store generates the id, then the
    /// chat log is created under that same id. If the chat log cannot be
    /// created the room is deleted again.
    ///
    /// # Errors
    /// - [`RoomError::InvalidSpec`]: `max_players` is zero
    /// - [`RoomError::Inconsistent`]: the chat log could not be created;
    ///   the room is removed again if possible
    /// - [`RoomError::Store`]: the room record could not be written
    pub async fn create_room(&self, spec: &RoomSpec) -> Result<RoomId, RoomError> {
        if spec.max_players == 0 {
            return Err(RoomError::InvalidSpec("maxPlayers must be at least 1".into()));
        }

        let created_at = records::now_millis();
        let room = RoomRecord {
            status_code: 0,
            members: Vec::new(),
            name: spec.name.clone(),
            max_players: spec.max_players,
            kind: spec.kind.clone(),
            created_at,
        };
        let id = RoomId::new(
            self.store
                .add(records::ROOMS, records::to_document(&room)?)
                .await?,
        );

        let chat = ChatRecord {
            messages: Vec::new(),
            created_at,
        };
        let chat_result = match records::to_document(&chat) {
            Ok(doc) => self.store.create(&records::chat_key(&id), doc).await,
            Err(e) => Err(e),
        };
        if let Err(e) = chat_result {
            return Err(self.undo_create(id, e).await);
        }

        tracing::info!(room = %id, name = %spec.name, max_players = spec.max_players, "room created");
        Ok(id)
    }

    /// Deletes a room whose chat log could not be created.
    async fn undo_create(&self, id: RoomId, cause: StoreError) -> RoomError {
        tracing::warn!(room = %id, error = %cause, "chat log creation failed, removing room");
        let detail = match self.store.delete(&records::room_key(&id)).await {
            Ok(()) => format!("chat log not created ({cause}), room removed"),
            Err(e) => {
                tracing::error!(room = %id, error = %e, "room left without a chat log");
                format!("chat log not created ({cause}) and room not removed ({e})")
            }
        };
        RoomError::Inconsistent { room: id, detail }
    }

    /// Adds `player` to the room and resets the player's status code.
    ///
    /// The capacity check reads the member count and then adds the player
    /// in a separate store call. Two joins racing for the last seat can
    /// both pass the check, so a room may briefly exceed `maxPlayers`
    /// under concurrent joins. The add itself is unique per player.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`]: no room has this id
    /// - [`RoomError::RoomFull`]: the room already has `maxPlayers` members
    pub async fn join_room(&self, id: &RoomId, player: &PlayerName) -> Result<(), RoomError> {
        let room = self.load(id).await?;
        if room.members.len() >= room.max_players as usize {
            return Err(RoomError::RoomFull(id.clone()));
        }

        self.store
            .array_union(&records::room_key(id), records::MEMBERS, records::to_value(player)?)
            .await?;
        self.players.set_status(player, JOINED_STATUS).await?;

        tracing::info!(room = %id, %player, "player joined room");
        Ok(())
    }

    /// Removes `player` from the room, deleting the room and its chat log
    /// if nobody is left.
    ///
    /// An empty `id` means the player is not in a room and is a no-op.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`]: no room has this id
    /// - [`RoomError::Inconsistent`]: the room was deleted but its chat
    ///   log was not
    pub async fn leave_room(&self, id: &RoomId, player: &PlayerName) -> Result<(), RoomError> {
        if id.is_empty() {
            return Ok(());
        }

        let key = records::room_key(id);
        self.store
            .array_remove(&key, records::MEMBERS, records::to_value(player)?)
            .await
            .map_err(|e| not_found_as_room(e, id))?;
        tracing::info!(room = %id, %player, "player left room");

        let room = match self.load(id).await {
            Ok(room) => room,
            // Another leave emptied and deleted it in between.
            Err(RoomError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        };
        if room.members.is_empty() {
            self.delete_room(id).await?;
        }
        Ok(())
    }

    async fn delete_room(&self, id: &RoomId) -> Result<(), RoomError> {
        self.store.delete(&records::room_key(id)).await?;
        if let Err(e) = self.store.delete(&records::chat_key(id)).await {
            tracing::error!(room = %id, error = %e, "room deleted but chat log orphaned");
            return Err(RoomError::Inconsistent {
                room: id.clone(),
                detail: format!("chat log not deleted: {e}"),
            });
        }
        tracing::info!(room = %id, "empty room deleted");
        Ok(())
    }

    async fn load(&self, id: &RoomId) -> Result<RoomRecord, RoomError> {
        let doc = self
            .store
            .get(&records::room_key(id))
            .await
            .map_err(|e| not_found_as_room(e, id))?;
        Ok(records::from_document(doc)?)
    }
}

fn not_found_as_room(e: StoreError, id: &RoomId) -> RoomError {
    match e {
        StoreError::NotFound(_) => RoomError::NotFound(id.clone()),
        other => RoomError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use foyer_store::records::PlayerRecord;
    use foyer_store::MemoryStore;

    use super::*;

    async fn setup(players: &[&str]) -> (Arc<MemoryStore>, RoomController<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let directory = PlayerDirectory::new(Arc::clone(&store));
        for name in players {
            let record = PlayerRecord {
                password: "pw".into(),
                status_code: 7,
                created_at: records::now_millis(),
            };
            directory.create(&PlayerName::new(*name), &record).await.unwrap();
        }
        (Arc::clone(&store), RoomController::new(store))
    }

    fn spec(max_players: u32) -> RoomSpec {
        RoomSpec {
            name: "r1".into(),
            max_players,
            kind: "casual".into(),
        }
    }

    async fn members(store: &MemoryStore, id: &RoomId) -> Vec<PlayerName> {
        let doc = store.get(&records::room_key(id)).await.unwrap();
        records::from_document::<RoomRecord>(doc).unwrap().members
    }

    #[tokio::test]
    async fn test_create_room_reads_back_with_empty_members() {
        let (store, rooms) = setup(&[]).await;

        let id = rooms.create_room(&spec(2)).await.unwrap();

        let doc = store.get(&records::room_key(&id)).await.unwrap();
        let room: RoomRecord = records::from_document(doc).unwrap();
        assert_eq!(room.max_players, 2);
        assert_eq!(room.name, "r1");
        assert_eq!(room.kind, "casual");
        assert!(room.members.is_empty());
        assert!(store.contains(&records::chat_key(&id)).await);
    }

    #[tokio::test]
    async fn test_create_room_zero_capacity_rejected() {
        let (store, rooms) = setup(&[]).await;

        let result = rooms.create_room(&spec(0)).await;

        assert!(matches!(result, Err(RoomError::InvalidSpec(_))));
        assert_eq!(store.count(records::ROOMS).await, 0);
    }

    #[tokio::test]
    async fn test_join_room_adds_member_and_resets_status() {
        let (store, rooms) = setup(&["alice"]).await;
        let id = rooms.create_room(&spec(2)).await.unwrap();
        let alice = PlayerName::new("alice");

        rooms.join_room(&id, &alice).await.unwrap();

        assert_eq!(members(&store, &id).await, vec![alice.clone()]);
        let player = PlayerDirectory::new(store).get(&alice).await.unwrap();
        assert_eq!(player.status_code, 0);
    }

    #[tokio::test]
    async fn test_join_room_twice_keeps_one_membership() {
        let (store, rooms) = setup(&["alice"]).await;
        let id = rooms.create_room(&spec(3)).await.unwrap();
        let alice = PlayerName::new("alice");

        rooms.join_room(&id, &alice).await.unwrap();
        rooms.join_room(&id, &alice).await.unwrap();

        assert_eq!(members(&store, &id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_join_full_room_returns_room_full() {
        let (store, rooms) = setup(&["alice", "bob"]).await;
        let id = rooms.create_room(&spec(1)).await.unwrap();
        rooms.join_room(&id, &PlayerName::new("alice")).await.unwrap();

        let result = rooms.join_room(&id, &PlayerName::new("bob")).await;

        assert!(matches!(result, Err(RoomError::RoomFull(ref r)) if *r == id));
        assert_eq!(members(&store, &id).await, vec![PlayerName::new("alice")]);
    }

    #[tokio::test]
    async fn test_join_unknown_room_returns_not_found() {
        let (_store, rooms) = setup(&["alice"]).await;
        let result = rooms
            .join_room(&RoomId::new("missing"), &PlayerName::new("alice"))
            .await;
        assert!(matches!(result, Err(RoomError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_leave_room_empty_id_is_noop() {
        let (_store, rooms) = setup(&[]).await;
        rooms
            .leave_room(&RoomId::new(""), &PlayerName::new("alice"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_leave_room_last_member_deletes_room_and_chat() {
        let (store, rooms) = setup(&["alice"]).await;
        let id = rooms.create_room(&spec(2)).await.unwrap();
        let alice = PlayerName::new("alice");
        rooms.join_room(&id, &alice).await.unwrap();

        rooms.leave_room(&id, &alice).await.unwrap();

        assert!(!store.contains(&records::room_key(&id)).await);
        assert!(!store.contains(&records::chat_key(&id)).await);
    }

    #[tokio::test]
    async fn test_leave_room_with_others_remaining_keeps_room() {
        let (store, rooms) = setup(&["alice", "bob"]).await;
        let id = rooms.create_room(&spec(2)).await.unwrap();
        rooms.join_room(&id, &PlayerName::new("alice")).await.unwrap();
        rooms.join_room(&id, &PlayerName::new("bob")).await.unwrap();

        rooms.leave_room(&id, &PlayerName::new("alice")).await.unwrap();

        assert_eq!(members(&store, &id).await, vec![PlayerName::new("bob")]);
        assert!(store.contains(&records::chat_key(&id)).await);
    }

    #[tokio::test]
    async fn test_leave_unknown_room_returns_not_found() {
        let (_store, rooms) = setup(&[]).await;
        let result = rooms
            .leave_room(&RoomId::new("missing"), &PlayerName::new("alice"))
            .await;
        assert!(matches!(result, Err(RoomError::NotFound(_))));
    }
}
