/// The fixed deck of estimate cards
pub mod card;
/// Set of commands (intents) which the server can receive and process
pub mod command;
/// Set of events the server pushes to its connections
pub mod event;
/// Client side copy of the session, rebuilt from events
pub mod mirror;
/// Implementation of event and command transportation over WebSockets.
/// Requires 'server' or 'client' features to be enabled and will bring in tokio dependency alongside with other dependencies
pub mod transport;
