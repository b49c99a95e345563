use std::sync::Arc;

use tokio::{net::TcpListener, sync::broadcast, task::JoinSet};
use tracing::{info, warn};

use crate::{config::ServerConfig, connection, store::SessionStore};

/// Accepts connections until a quit signal arrives, then waits for every connection to wind down
pub async fn serve(
    listener: TcpListener,
    store: Arc<SessionStore>,
    config: Arc<ServerConfig>,
    mut quit_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let mut join_set: JoinSet<anyhow::Result<()>> = JoinSet::new();

    loop {
        tokio::select! {
            _ = quit_rx.recv() => {
                info!("Server interrupted. Gracefully shutting down.");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    join_set.spawn(connection::handle_connection(
                        store.clone(),
                        config.clone(),
                        quit_rx.resubscribe(),
                        socket,
                        peer,
                    ));
                }
                Err(err) => warn!(%err, "could not accept a connection"),
            },
            // reap finished connections so the join set does not grow forever
            Some(finished) = join_set.join_next() => log_connection_result(finished),
        }
    }

    while let Some(finished) = join_set.join_next().await {
        log_connection_result(finished);
    }

    Ok(())
}

fn log_connection_result(finished: Result<anyhow::Result<()>, tokio::task::JoinError>) {
    match finished {
        Ok(Ok(())) => (),
        Ok(Err(err)) => warn!("connection ended with an error: {:#}", err),
        Err(err) => warn!(%err, "connection task failed"),
    }
}
