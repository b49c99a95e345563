use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// The full, ordered list of participants after a change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantsUpdatedEvent {
    /// Participant names in the order they joined
    pub participants: Vec<String>,
}

/// The full vote mapping after a change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotesUpdatedEvent {
    /// Participant name to the card they picked
    pub votes: BTreeMap<String, Card>,
}

/// Why the server declined to apply a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    EmptyName,
    NameTaken,
    InvalidCard,
    UnknownParticipant,
    NotJoined,
}

/// A command sent by this connection was not applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRejectedEvent {
    /// Machine readable cause
    pub reason: RejectionReason,
    /// Human readable explanation
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
/// Events that can be sent to the client
/// Updates are broadcasted to every connection, rejections are only sent to the connection that caused them
pub enum Event {
    ParticipantsUpdated(ParticipantsUpdatedEvent),
    VotesUpdated(VotesUpdatedEvent),
    IntentRejected(IntentRejectedEvent),
}
