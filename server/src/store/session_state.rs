use std::collections::{BTreeMap, HashMap};

use comms::{
    card::Card,
    event::{Event, ParticipantsUpdatedEvent, VotesUpdatedEvent},
};

use super::{ConnectionId, IntentError};

/// [SessionState] is the authoritative participant list and vote mapping.
///
/// Every participant is owned by the connection that joined it, so the
/// participant can be removed when that connection goes away.
/// Keeps the invariant that every vote belongs to a current participant.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Participant names in join order
    participants: Vec<String>,
    /// Which connection joined which participant
    owners: HashMap<String, ConnectionId>,
    votes: BTreeMap<String, Card>,
}

fn normalize_name(name: &str) -> Result<&str, IntentError> {
    let name = name.trim();

    if name.is_empty() {
        Err(IntentError::EmptyName)
    } else {
        Ok(name)
    }
}

impl SessionState {
    pub fn new() -> Self {
        SessionState::default()
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn votes(&self) -> &BTreeMap<String, Card> {
        &self.votes
    }

    fn is_participant(&self, name: &str) -> bool {
        self.owners.contains_key(name)
    }

    /// Add a participant owned by the given connection and clear any vote under that name.
    /// Returns the name as it was stored.
    pub fn join(&mut self, owner: &ConnectionId, name: &str) -> Result<String, IntentError> {
        let name = normalize_name(name)?;

        if self.is_participant(name) {
            return Err(IntentError::NameTaken(String::from(name)));
        }

        self.participants.push(String::from(name));
        self.owners.insert(String::from(name), owner.clone());
        self.votes.remove(name);

        Ok(String::from(name))
    }

    /// Set or overwrite the vote of a current participant
    pub fn vote(&mut self, name: &str, value: u32) -> Result<Card, IntentError> {
        let card = Card::try_from(value)?;
        let name = normalize_name(name)?;

        if !self.is_participant(name) {
            return Err(IntentError::UnknownParticipant(String::from(name)));
        }

        self.votes.insert(String::from(name), card);

        Ok(card)
    }

    /// Clear every vote, participants stay
    pub fn reset(&mut self) {
        self.votes.clear();
    }

    /// Remove a participant and its vote, only the owning connection may do so
    pub fn leave(&mut self, owner: &ConnectionId, name: &str) -> Result<String, IntentError> {
        let name = normalize_name(name)?;

        match self.owners.get(name) {
            Some(current_owner) if current_owner == owner => {
                self.remove(name);
                Ok(String::from(name))
            }
            _ => Err(IntentError::NotJoined(String::from(name))),
        }
    }

    /// Remove every participant owned by the given connection.
    /// Returns the removed names in join order.
    pub fn leave_all(&mut self, owner: &ConnectionId) -> Vec<String> {
        let owned: Vec<String> = self
            .participants
            .iter()
            .filter(|name| self.owners.get(name.as_str()) == Some(owner))
            .cloned()
            .collect();

        for name in owned.iter() {
            self.remove(name);
        }

        owned
    }

    fn remove(&mut self, name: &str) {
        self.participants.retain(|participant| participant != name);
        self.owners.remove(name);
        self.votes.remove(name);
    }

    pub fn participants_event(&self) -> Event {
        Event::ParticipantsUpdated(ParticipantsUpdatedEvent {
            participants: self.participants.clone(),
        })
    }

    pub fn votes_event(&self) -> Event {
        Event::VotesUpdated(VotesUpdatedEvent {
            votes: self.votes.clone(),
        })
    }

    /// Both halves of the session, participants first
    pub fn snapshot(&self) -> [Event; 2] {
        [self.participants_event(), self.votes_event()]
    }
}

#[cfg(test)]
mod tests {
    use comms::card::InvalidCard;

    use super::*;

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::from(id)
    }

    fn card(value: u32) -> Card {
        Card::try_from(value).unwrap()
    }

    #[test]
    fn test_distinct_joins_keep_join_order() {
        let mut state = SessionState::new();
        let owner = connection("c1");

        for name in ["carol", "alice", "bob"] {
            state.join(&owner, name).unwrap();
        }

        assert_eq!(state.participants(), ["carol", "alice", "bob"]);
    }

    #[test]
    fn test_duplicate_join_is_rejected() {
        let mut state = SessionState::new();
        state.join(&connection("c1"), "alice").unwrap();

        assert_eq!(
            state.join(&connection("c2"), "alice"),
            Err(IntentError::NameTaken("alice".into()))
        );
        // the same connection can not double join either
        assert_eq!(
            state.join(&connection("c1"), " alice "),
            Err(IntentError::NameTaken("alice".into()))
        );
        assert_eq!(state.participants(), ["alice"]);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut state = SessionState::new();

        assert_eq!(state.join(&connection("c1"), ""), Err(IntentError::EmptyName));
        assert_eq!(state.join(&connection("c1"), "   "), Err(IntentError::EmptyName));
        assert!(state.participants().is_empty());
    }

    #[test]
    fn test_names_are_trimmed() {
        let mut state = SessionState::new();

        assert_eq!(state.join(&connection("c1"), "  dave "), Ok("dave".into()));
        assert_eq!(state.vote("dave ", 3), Ok(card(3)));
        assert_eq!(state.votes().get("dave"), Some(&card(3)));
    }

    #[test]
    fn test_join_vote_reset_keeps_participant() {
        let mut state = SessionState::new();
        state.join(&connection("c1"), "alice").unwrap();
        state.vote("alice", 5).unwrap();

        state.reset();

        assert!(state.votes().is_empty());
        assert_eq!(state.participants(), ["alice"]);
    }

    #[test]
    fn test_vote_overwrites_previous_vote() {
        let mut state = SessionState::new();
        state.join(&connection("c1"), "alice").unwrap();

        state.vote("alice", 5).unwrap();
        state.vote("alice", 40).unwrap();

        assert_eq!(state.votes().len(), 1);
        assert_eq!(state.votes().get("alice"), Some(&card(40)));
    }

    #[test]
    fn test_vote_outside_the_deck_is_rejected() {
        let mut state = SessionState::new();
        state.join(&connection("c1"), "alice").unwrap();

        assert_eq!(
            state.vote("alice", 4),
            Err(IntentError::InvalidCard(InvalidCard(4)))
        );
        assert!(state.votes().is_empty());
    }

    #[test]
    fn test_vote_for_non_participant_is_always_rejected() {
        let mut state = SessionState::new();
        let owner = connection("c1");

        // before anybody joined
        assert_eq!(
            state.vote("ghost", 5),
            Err(IntentError::UnknownParticipant("ghost".into()))
        );

        // after leaving
        state.join(&owner, "alice").unwrap();
        state.leave(&owner, "alice").unwrap();
        assert_eq!(
            state.vote("alice", 5),
            Err(IntentError::UnknownParticipant("alice".into()))
        );

        // after the owning connection disconnected
        state.join(&owner, "bob").unwrap();
        state.leave_all(&owner);
        assert_eq!(
            state.vote("bob", 5),
            Err(IntentError::UnknownParticipant("bob".into()))
        );

        assert!(state.votes().is_empty());
    }

    #[test]
    fn test_leave_removes_vote() {
        let mut state = SessionState::new();
        let owner = connection("c1");
        state.join(&owner, "alice").unwrap();
        state.join(&connection("c2"), "bob").unwrap();
        state.vote("alice", 8).unwrap();
        state.vote("bob", 8).unwrap();

        state.leave(&owner, "alice").unwrap();

        assert_eq!(state.participants(), ["bob"]);
        assert_eq!(state.votes().keys().collect::<Vec<_>>(), vec!["bob"]);
    }

    #[test]
    fn test_leave_from_foreign_connection_is_rejected() {
        let mut state = SessionState::new();
        state.join(&connection("c1"), "alice").unwrap();

        assert_eq!(
            state.leave(&connection("c2"), "alice"),
            Err(IntentError::NotJoined("alice".into()))
        );
        assert_eq!(
            state.leave(&connection("c1"), "nobody"),
            Err(IntentError::NotJoined("nobody".into()))
        );
        assert_eq!(state.participants(), ["alice"]);
    }

    #[test]
    fn test_leave_all_only_removes_owned_participants() {
        let mut state = SessionState::new();
        let first_tab = connection("c1");
        let second_tab = connection("c2");
        state.join(&first_tab, "alice").unwrap();
        state.join(&second_tab, "bob").unwrap();
        state.join(&first_tab, "alice-2").unwrap();
        state.vote("alice", 1).unwrap();
        state.vote("bob", 2).unwrap();

        let removed = state.leave_all(&first_tab);

        assert_eq!(removed, vec!["alice".to_string(), "alice-2".to_string()]);
        assert_eq!(state.participants(), ["bob"]);
        assert_eq!(state.votes().keys().collect::<Vec<_>>(), vec!["bob"]);
    }

    #[test]
    fn test_rejoin_starts_without_a_vote() {
        let mut state = SessionState::new();
        let owner = connection("c1");
        state.join(&owner, "alice").unwrap();
        state.vote("alice", 13).unwrap();
        state.leave(&owner, "alice").unwrap();

        state.join(&connection("c2"), "alice").unwrap();

        assert_eq!(state.votes().get("alice"), None);
    }

    #[test]
    fn test_votes_always_belong_to_participants() {
        let mut state = SessionState::new();
        let owners = [connection("c1"), connection("c2")];

        for (idx, name) in ["a", "b", "c", "d"].iter().enumerate() {
            let owner = &owners[idx % 2];
            state.join(owner, name).unwrap();
            let _ = state.vote(name, 8);
        }
        state.leave_all(&owners[0]);
        let _ = state.vote("a", 3);

        assert!(state
            .votes()
            .keys()
            .all(|name| state.participants().contains(name)));
    }
}
