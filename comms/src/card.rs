use std::fmt;

use serde::{Deserialize, Serialize};

/// Values printed on the estimate cards, in the order they are dealt.
pub const CARD_VALUES: [u32; 10] = [0, 1, 2, 3, 5, 8, 13, 20, 40, 100];

/// A number was offered as a card but is not part of [CARD_VALUES]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not one of the estimate cards")]
pub struct InvalidCard(pub u32);

/// A single estimate card.
///
/// Can only be constructed from one of the [CARD_VALUES], so holding a [Card]
/// means holding a valid estimate. Serialized as the plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Card(u32);

impl Card {
    pub fn value(self) -> u32 {
        self.0
    }

    /// The whole deck, lowest card first
    pub fn deck() -> impl Iterator<Item = Card> {
        CARD_VALUES.into_iter().map(Card)
    }

    /// Position of this card within the deck
    pub fn index(self) -> usize {
        CARD_VALUES
            .iter()
            .position(|value| *value == self.0)
            .unwrap_or_default()
    }
}

impl TryFrom<u32> for Card {
    type Error = InvalidCard;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if CARD_VALUES.contains(&value) {
            Ok(Card(value))
        } else {
            Err(InvalidCard(value))
        }
    }
}

impl From<Card> for u32 {
    fn from(card: Card) -> Self {
        card.0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
