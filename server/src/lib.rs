/// Environment driven server configuration
pub mod config;
/// Per connection command handling and event forwarding
pub mod connection;
/// Accept loop with graceful shutdown
pub mod server;
/// The authoritative planning poker session
pub mod store;
