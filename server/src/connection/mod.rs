use std::{net::SocketAddr, sync::Arc};

use comms::transport::{
    self,
    server::{CommandStream, EventWriter},
};
use tokio::{net::TcpStream, sync::broadcast};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::{
    config::ServerConfig,
    store::{ConnectionId, SessionStore},
};

use self::poker_connection::PokerConnection;

mod poker_connection;

/// Given a tcp stream and the session store, handles a single client connection
/// until the client closes the socket, the socket fails, or the server shuts down.
///
/// Whatever happens, participants joined through this connection leave the session afterwards.
pub async fn handle_connection(
    store: Arc<SessionStore>,
    config: Arc<ServerConfig>,
    quit_rx: broadcast::Receiver<()>,
    stream: TcpStream,
    peer: SocketAddr,
) -> anyhow::Result<()> {
    // Upgrade to a websocket, browsers from unknown origins are turned away here
    let (commands, event_writer) =
        transport::server::accept(stream, &config.allowed_origins).await?;

    let connection = PokerConnection::new(ConnectionId::generate(), store);
    info!(connection = %connection.connection_id(), %peer, "client connected");

    let (connection, result) = serve_connection(connection, commands, event_writer, quit_rx).await;
    connection.disconnect().await;

    result
}

async fn serve_connection(
    mut connection: PokerConnection,
    mut commands: CommandStream,
    mut event_writer: EventWriter,
    mut quit_rx: broadcast::Receiver<()>,
) -> (PokerConnection, anyhow::Result<()>) {
    let result = loop {
        tokio::select! {
            cmd = commands.next() => match cmd {
                // The client closed the socket
                None => break Ok(()),
                Some(Ok(cmd)) => {
                    debug!(connection = %connection.connection_id(), ?cmd, "received command");
                    connection.handle_user_command(cmd).await;
                }
                // A frame we could not understand, could be a bug in the client or breaking api changes
                Some(Err(err)) if err.is_recoverable() => {
                    warn!(connection = %connection.connection_id(), %err, "ignoring malformed frame");
                }
                Some(Err(err)) => {
                    debug!(connection = %connection.connection_id(), %err, "socket failed");
                    break Ok(());
                }
            },
            // Updates and replies are sent to the client in the order they happened
            Some(event) = connection.recv() => {
                if let Err(err) = event_writer.write(&event).await {
                    break Err(err);
                }
            }
            // The server is shutting down, close the socket politely
            Ok(_) = quit_rx.recv() => {
                let _ = event_writer.close().await;
                info!(connection = %connection.connection_id(), "closing connection for shutdown");
                break Ok(());
            }
        }
    };

    (connection, result)
}
