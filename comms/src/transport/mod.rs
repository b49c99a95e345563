/// Transport over WebSockets for a client to be able to interact with the server
#[cfg(feature = "client")]
pub mod client;
#[cfg(any(feature = "client", feature = "server"))]
mod common;
/// Transport over WebSockets for a server to interact with a single client connection
#[cfg(feature = "server")]
pub mod server;

#[cfg(any(feature = "client", feature = "server"))]
pub use common::{BoxedStream, FrameError};
