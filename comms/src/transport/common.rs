use std::pin::Pin;

use serde::de::DeserializeOwned;
use tokio_stream::Stream;
use tokio_tungstenite::tungstenite::{self, Message};

pub type BoxedStream<Item> = Pin<Box<dyn Stream<Item = Item> + Send>>;

/// Failure while reading a frame from the other side of the socket
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The socket itself failed, no further frames will arrive
    #[error("websocket transport failed: {0}")]
    Transport(#[from] tungstenite::Error),
    /// A text frame arrived but did not hold a valid document, the socket is still usable
    #[error("could not parse frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl FrameError {
    /// Whether the connection can keep being read after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FrameError::Malformed(_))
    }
}

/// Turns a raw websocket frame into a typed document.
/// Control and binary frames carry no documents and are skipped.
pub(super) fn parse_frame<T: DeserializeOwned>(
    frame: Result<Message, tungstenite::Error>,
) -> Option<Result<T, FrameError>> {
    match frame {
        Ok(Message::Text(text)) => Some(serde_json::from_str::<T>(text.as_str()).map_err(Into::into)),
        Ok(_) => None,
        Err(err) => Some(Err(err.into())),
    }
}

/// Serializes a document into a text frame
pub(super) fn to_frame<T: serde::Serialize>(document: &T) -> serde_json::Result<Message> {
    Ok(Message::text(serde_json::to_string(document)?))
}
