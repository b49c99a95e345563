use std::collections::BTreeMap;

use crate::{card::Card, event::Event};

/// What a participant's row should show to everyone else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteStatus {
    /// Has not picked a card this round
    Waiting,
    /// Picked a card, kept hidden until everybody voted
    Voted,
    /// Everybody voted, the card is revealed
    Revealed(Card),
}

/// [SessionMirror] is the client side copy of the session.
///
/// It is a pure function of the latest broadcasts: every update event replaces
/// the matching half of the mirror wholesale, nothing is merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionMirror {
    participants: Vec<String>,
    votes: BTreeMap<String, Card>,
}

impl SessionMirror {
    /// Apply a server event. Returns true if the event carried session state.
    pub fn apply(&mut self, event: &Event) -> bool {
        match event {
            Event::ParticipantsUpdated(event) => {
                self.participants = event.participants.clone();
                true
            }
            Event::VotesUpdated(event) => {
                self.votes = event.votes.clone();
                true
            }
            Event::IntentRejected(_) => false,
        }
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn votes(&self) -> &BTreeMap<String, Card> {
        &self.votes
    }

    pub fn has_joined(&self, name: &str) -> bool {
        self.participants.iter().any(|participant| participant == name)
    }

    pub fn vote_of(&self, name: &str) -> Option<Card> {
        self.votes.get(name).copied()
    }

    /// True when there is at least one participant and every participant has voted
    pub fn all_votes_submitted(&self) -> bool {
        !self.participants.is_empty()
            && self
                .participants
                .iter()
                .all(|participant| self.votes.contains_key(participant))
    }

    /// Votes of current participants, in join order.
    /// A vote of somebody who already left is ignored until the next votes update drops it.
    fn participant_votes(&self) -> impl Iterator<Item = Card> + '_ {
        self.participants
            .iter()
            .filter_map(|participant| self.votes.get(participant).copied())
    }

    /// Number of current participants who voted this round
    pub fn votes_cast(&self) -> usize {
        self.participant_votes().count()
    }

    /// Mean of the participants' votes rounded to one decimal place.
    /// Only available once [SessionMirror::all_votes_submitted] holds.
    pub fn average_vote(&self) -> Option<f64> {
        if !self.all_votes_submitted() {
            return None;
        }

        let sum: u32 = self.participant_votes().map(Card::value).sum();
        let mean = f64::from(sum) / self.participants.len() as f64;

        Some((mean * 10.0).round() / 10.0)
    }

    /// Participants in join order paired with what their row should show
    pub fn statuses(&self) -> Vec<(String, VoteStatus)> {
        let reveal = self.all_votes_submitted();

        self.participants
            .iter()
            .map(|participant| {
                let status = match (self.votes.get(participant), reveal) {
                    (Some(card), true) => VoteStatus::Revealed(*card),
                    (Some(_), false) => VoteStatus::Voted,
                    (None, _) => VoteStatus::Waiting,
                };

                (participant.clone(), status)
            })
            .collect()
    }
}
