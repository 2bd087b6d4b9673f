//! The table of registrations still waiting for their first login.
//!
//! Three parties touch it: the registrar inserts, a login confirms, and the
//! expiry timer claims its own entry when it fires. All three go through one
//! mutex, and each entry carries a [`Ticket`] so a timer can only ever
//! remove the entry it was armed for.

use std::collections::HashMap;
use std::sync::Arc;

use foyer_protocol::PlayerName;
use tokio::sync::{oneshot, Mutex};

/// Identifies one armed expiry timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

struct Pending {
    ticket: Ticket,
    cancel: oneshot::Sender<()>,
}

#[derive(Default)]
struct PendingTable {
    next_ticket: u64,
    entries: HashMap<PlayerName, Pending>,
}

/// Shared, lock-guarded map from player name to cancellation signal.
///
/// Cheap to clone: clones share the same table.
#[derive(Clone, Default)]
pub struct PendingRegistrations {
    inner: Arc<Mutex<PendingTable>>,
}

impl PendingRegistrations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a new entry for `name`, returning its ticket and the receiver
    /// the timer task waits on.
    ///
    /// A previous entry under the same name is superseded: its sender is
    /// dropped, which wakes its timer as if cancelled.
    pub async fn insert(&self, name: PlayerName) -> (Ticket, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let mut table = self.inner.lock().await;
        table.next_ticket += 1;
        let ticket = Ticket(table.next_ticket);
        if table
            .entries
            .insert(name.clone(), Pending { ticket, cancel: tx })
            .is_some()
        {
            tracing::warn!(player = %name, "superseded pending registration");
        }
        (ticket, rx)
    }

    /// Cancels the pending expiry for `name`.
    ///
    /// Returns `false` if nothing was pending, e.g. the timer already fired.
    /// Never blocks on the timer task and is safe to call repeatedly.
    pub async fn confirm(&self, name: &PlayerName) -> bool {
        let pending = self.inner.lock().await.entries.remove(name);
        match pending {
            Some(pending) => {
                // The timer may be mid-exit; a closed receiver is fine.
                let _ = pending.cancel.send(());
                true
            }
            None => false,
        }
    }

    /// Called by the timer for `ticket` when it fires. Removes the entry and
    /// returns `true` only if that timer still owns it; `false` means a
    /// login won the race and the record must be left alone.
    pub async fn expire(&self, name: &PlayerName, ticket: Ticket) -> bool {
        let mut table = self.inner.lock().await;
        match table.entries.get(name) {
            Some(pending) if pending.ticket == ticket => {
                table.entries.remove(name);
                true
            }
            _ => false,
        }
    }

    pub async fn contains(&self, name: &PlayerName) -> bool {
        self.inner.lock().await.entries.contains_key(name)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> PlayerName {
        PlayerName::new(n)
    }

    #[tokio::test]
    async fn test_confirm_signals_receiver_and_removes_entry() {
        let pending = PendingRegistrations::new();
        let (_ticket, rx) = pending.insert(name("alice")).await;

        assert!(pending.confirm(&name("alice")).await);

        assert!(rx.await.is_ok(), "receiver should get the cancel signal");
        assert!(!pending.contains(&name("alice")).await);
    }

    #[tokio::test]
    async fn test_confirm_twice_is_a_noop() {
        let pending = PendingRegistrations::new();
        let (_ticket, _rx) = pending.insert(name("alice")).await;

        assert!(pending.confirm(&name("alice")).await);
        assert!(!pending.confirm(&name("alice")).await);
    }

    #[tokio::test]
    async fn test_confirm_unknown_name_does_not_block() {
        let pending = PendingRegistrations::new();
        assert!(!pending.confirm(&name("ghost")).await);
    }

    #[tokio::test]
    async fn test_confirm_after_receiver_dropped_is_safe() {
        let pending = PendingRegistrations::new();
        let (_ticket, rx) = pending.insert(name("alice")).await;
        drop(rx);

        assert!(pending.confirm(&name("alice")).await);
    }

    #[tokio::test]
    async fn test_expire_with_matching_ticket_claims_entry() {
        let pending = PendingRegistrations::new();
        let (ticket, _rx) = pending.insert(name("alice")).await;

        assert!(pending.expire(&name("alice"), ticket).await);
        assert!(pending.is_empty().await);
        // Confirming afterwards is a safe no-op.
        assert!(!pending.confirm(&name("alice")).await);
    }

    #[tokio::test]
    async fn test_expire_after_confirm_returns_false() {
        let pending = PendingRegistrations::new();
        let (ticket, _rx) = pending.insert(name("alice")).await;
        pending.confirm(&name("alice")).await;

        assert!(!pending.expire(&name("alice"), ticket).await);
    }

    #[tokio::test]
    async fn test_stale_ticket_cannot_expire_newer_entry() {
        let pending = PendingRegistrations::new();
        let (old, old_rx) = pending.insert(name("alice")).await;
        let (new, _new_rx) = pending.insert(name("alice")).await;

        // The superseded timer is woken by its dropped sender.
        assert!(old_rx.await.is_err());
        assert!(!pending.expire(&name("alice"), old).await);
        assert!(pending.expire(&name("alice"), new).await);
    }
}
