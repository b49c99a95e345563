pub mod action;
mod state;
mod state_store;

pub use self::state::{ServerConnectionStatus, State};
pub use self::state_store::StateStore;
