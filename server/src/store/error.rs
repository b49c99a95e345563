use comms::{
    card::InvalidCard,
    event::{Event, IntentRejectedEvent, RejectionReason},
};

/// Reasons for the session store to refuse a command.
/// A refused command leaves the session untouched and broadcasts nothing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntentError {
    #[error("a non-empty name is required")]
    EmptyName,
    #[error("the name '{0}' is already taken")]
    NameTaken(String),
    #[error(transparent)]
    InvalidCard(#[from] InvalidCard),
    #[error("'{0}' has not joined the session")]
    UnknownParticipant(String),
    #[error("'{0}' was not joined from this connection")]
    NotJoined(String),
}

impl IntentError {
    pub fn reason(&self) -> RejectionReason {
        match self {
            IntentError::EmptyName => RejectionReason::EmptyName,
            IntentError::NameTaken(_) => RejectionReason::NameTaken,
            IntentError::InvalidCard(_) => RejectionReason::InvalidCard,
            IntentError::UnknownParticipant(_) => RejectionReason::UnknownParticipant,
            IntentError::NotJoined(_) => RejectionReason::NotJoined,
        }
    }

    /// The event sent back to the connection that issued the refused command
    pub fn to_event(&self) -> Event {
        Event::IntentRejected(IntentRejectedEvent {
            reason: self.reason(),
            message: self.to_string(),
        })
    }
}
