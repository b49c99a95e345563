use std::fmt;

use nanoid::nanoid;

pub use self::error::IntentError;
pub use self::session_state::SessionState;
pub use self::session_store::SessionStore;

mod error;
mod session_state;
mod session_store;

/// Identifies a single client connection for the lifetime of its socket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Generate a random id, there is no login system to hand one out
    pub fn generate() -> Self {
        ConnectionId(nanoid!())
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        ConnectionId(String::from(id))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
