use comms::event::Event;
use tokio::sync::{
    broadcast::{self, error::TryRecvError},
    Mutex,
};
use tracing::{debug, info};

use super::{ConnectionId, IntentError, SessionState};

const BROADCAST_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug)]
/// [SessionStore] owns the one planning poker session and the broadcast channel of its updates.
///
/// Every command is validated, applied and broadcasted while holding the state lock,
/// so commands are processed one after another and updates go out in the order they happened.
/// Updates always carry the complete state of whatever changed, never a diff.
pub struct SessionStore {
    state: Mutex<SessionState>,
    broadcast_tx: broadcast::Sender<Event>,
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CHANNEL_CAPACITY);

        SessionStore {
            state: Mutex::new(SessionState::new()),
            broadcast_tx,
        }
    }

    /// Receive every update broadcasted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.broadcast_tx.subscribe()
    }

    fn broadcast(&self, event: Event) {
        // nobody listening is not an error, the next connection asks for a snapshot
        let _ = self.broadcast_tx.send(event);
    }

    /// Add a participant owned by the connection, then broadcast participants and votes
    pub async fn join(&self, connection: &ConnectionId, name: &str) -> Result<(), IntentError> {
        let mut state = self.state.lock().await;
        let name = state.join(connection, name)?;

        info!(%connection, %name, "participant joined");
        self.broadcast(state.participants_event());
        self.broadcast(state.votes_event());

        Ok(())
    }

    /// Record a vote, then broadcast votes
    pub async fn vote(&self, name: &str, value: u32) -> Result<(), IntentError> {
        let mut state = self.state.lock().await;
        let card = state.vote(name, value)?;

        debug!(name, %card, "vote recorded");
        self.broadcast(state.votes_event());

        Ok(())
    }

    /// Clear all votes, then broadcast the empty votes
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.reset();

        info!("votes reset");
        self.broadcast(state.votes_event());
    }

    /// Remove a participant joined by this connection, then broadcast participants and votes
    pub async fn leave(&self, connection: &ConnectionId, name: &str) -> Result<(), IntentError> {
        let mut state = self.state.lock().await;
        let name = state.leave(connection, name)?;

        info!(%connection, %name, "participant left");
        self.broadcast(state.participants_event());
        self.broadcast(state.votes_event());

        Ok(())
    }

    /// Remove every participant joined by a connection which went away.
    /// Broadcasts only if somebody was removed.
    pub async fn disconnect(&self, connection: &ConnectionId) -> Vec<String> {
        let mut state = self.state.lock().await;
        let removed = state.leave_all(connection);

        info!(%connection, ?removed, "connection closed");
        if !removed.is_empty() {
            self.broadcast(state.participants_event());
            self.broadcast(state.votes_event());
        }

        removed
    }

    /// Current participants and votes
    pub async fn snapshot(&self) -> [Event; 2] {
        self.state.lock().await.snapshot()
    }

    /// Bring a subscriber up to date.
    ///
    /// Discards whatever is still queued for the receiver and returns a snapshot instead.
    /// Both happen under the state lock, so every discarded update is older than the snapshot
    /// and every update received afterwards is newer.
    pub async fn resync(&self, broadcast_rx: &mut broadcast::Receiver<Event>) -> [Event; 2] {
        let state = self.state.lock().await;

        loop {
            match broadcast_rx.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        state.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use comms::{
        card::Card,
        event::{ParticipantsUpdatedEvent, VotesUpdatedEvent},
    };

    use super::*;

    fn participants(names: &[&str]) -> Event {
        Event::ParticipantsUpdated(ParticipantsUpdatedEvent {
            participants: names.iter().map(|name| name.to_string()).collect(),
        })
    }

    fn votes(entries: &[(&str, u32)]) -> Event {
        Event::VotesUpdated(VotesUpdatedEvent {
            votes: entries
                .iter()
                .map(|(name, value)| (name.to_string(), Card::try_from(*value).unwrap()))
                .collect(),
        })
    }

    fn drain(broadcast_rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = broadcast_rx.try_recv() {
            events.push(event);
        }

        events
    }

    #[tokio::test]
    async fn test_every_mutation_broadcasts_full_state() {
        let store = SessionStore::new();
        let mut broadcast_rx = store.subscribe();
        let connection = ConnectionId::from("c1");

        store.join(&connection, "alice").await.unwrap();
        store.vote("alice", 5).await.unwrap();
        store.join(&connection, "bob").await.unwrap();
        store.vote("bob", 8).await.unwrap();
        store.reset().await;

        assert_eq!(
            drain(&mut broadcast_rx),
            vec![
                participants(&["alice"]),
                votes(&[]),
                votes(&[("alice", 5)]),
                participants(&["alice", "bob"]),
                votes(&[("alice", 5)]),
                votes(&[("alice", 5), ("bob", 8)]),
                votes(&[]),
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_commands_do_not_broadcast() {
        let store = SessionStore::new();
        let connection = ConnectionId::from("c1");
        store.join(&connection, "alice").await.unwrap();
        let mut broadcast_rx = store.subscribe();

        assert!(store.join(&ConnectionId::from("c2"), "alice").await.is_err());
        assert!(store.vote("alice", 6).await.is_err());
        assert!(store.vote("nobody", 5).await.is_err());
        assert!(store.leave(&ConnectionId::from("c2"), "alice").await.is_err());

        assert!(drain(&mut broadcast_rx).is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_removes_owned_participants() {
        let store = SessionStore::new();
        let first_tab = ConnectionId::from("c1");
        let second_tab = ConnectionId::from("c2");
        store.join(&first_tab, "alice").await.unwrap();
        store.join(&second_tab, "bob").await.unwrap();
        store.vote("alice", 3).await.unwrap();
        let mut broadcast_rx = store.subscribe();

        let removed = store.disconnect(&first_tab).await;

        assert_eq!(removed, vec!["alice".to_string()]);
        assert_eq!(
            drain(&mut broadcast_rx),
            vec![participants(&["bob"]), votes(&[])]
        );
    }

    #[tokio::test]
    async fn test_disconnect_without_participants_is_silent() {
        let store = SessionStore::new();
        let mut broadcast_rx = store.subscribe();

        assert!(store.disconnect(&ConnectionId::from("c1")).await.is_empty());
        assert!(drain(&mut broadcast_rx).is_empty());
    }

    #[tokio::test]
    async fn test_resync_replaces_queued_updates_with_snapshot() {
        let store = SessionStore::new();
        let mut broadcast_rx = store.subscribe();
        let connection = ConnectionId::from("c1");
        store.join(&connection, "alice").await.unwrap();
        store.vote("alice", 20).await.unwrap();

        let snapshot = store.resync(&mut broadcast_rx).await;

        assert_eq!(
            snapshot,
            [participants(&["alice"]), votes(&[("alice", 20)])]
        );
        assert!(drain(&mut broadcast_rx).is_empty());

        store.reset().await;
        assert_eq!(drain(&mut broadcast_rx), vec![votes(&[])]);
    }

    #[tokio::test]
    async fn test_resync_recovers_lagged_receiver() {
        let store = SessionStore::new();
        let mut broadcast_rx = store.subscribe();
        let connection = ConnectionId::from("c1");
        store.join(&connection, "alice").await.unwrap();

        for _ in 0..BROADCAST_CHANNEL_CAPACITY + 10 {
            store.reset().await;
        }

        let snapshot = store.resync(&mut broadcast_rx).await;

        assert_eq!(snapshot, [participants(&["alice"]), votes(&[])]);
        assert!(matches!(
            broadcast_rx.try_recv(),
            Err(TryRecvError::Empty)
        ));
    }
}
