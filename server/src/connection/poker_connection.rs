use std::sync::Arc;

use comms::{command::UserCommand, event::Event};
use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        mpsc,
    },
    task::JoinSet,
};
use tracing::{debug, warn};

use crate::store::{ConnectionId, SessionStore};

const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Answer owed to this connection alone, as opposed to a broadcast
#[derive(Debug)]
enum Reply {
    Snapshot,
    Rejection(Event),
}

/// [PokerConnection] ties a single client connection to the session store.
///
/// Broadcasted updates, requested snapshots and rejections are funneled through
/// one ordered channel, so the client never sees an older state after a newer one
/// and a rejection never overtakes the updates caused by earlier commands.
pub(super) struct PokerConnection {
    connection_id: ConnectionId,
    store: Arc<SessionStore>,
    join_set: JoinSet<()>,
    reply_tx: mpsc::UnboundedSender<Reply>,
    mpsc_rx: mpsc::Receiver<Event>,
}

impl PokerConnection {
    pub fn new(connection_id: ConnectionId, store: Arc<SessionStore>) -> Self {
        let (mpsc_tx, mpsc_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        // unbounded, the command loop must never wait on its own consumer
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let mut join_set = JoinSet::new();

        // spawn a task to forward broadcasted updates and replies to this connection's mpsc channel
        join_set.spawn(forward_events(
            store.clone(),
            store.subscribe(),
            reply_rx,
            mpsc_tx,
        ));

        PokerConnection {
            connection_id,
            store,
            join_set,
            reply_tx,
            mpsc_rx,
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    /// Handle a command sent by the client.
    /// A refused command queues an `intent-rejected` event behind the updates already broadcasted.
    pub async fn handle_user_command(&self, cmd: UserCommand) {
        let result = match cmd {
            UserCommand::Join(cmd) => self.store.join(&self.connection_id, &cmd.name).await,
            UserCommand::Vote(cmd) => self.store.vote(&cmd.name, cmd.value).await,
            UserCommand::Reset(_) => {
                self.store.reset().await;
                Ok(())
            }
            UserCommand::Leave(cmd) => self.store.leave(&self.connection_id, &cmd.name).await,
            UserCommand::RequestSnapshot(_) => {
                self.reply(Reply::Snapshot);
                Ok(())
            }
        };

        if let Err(err) = result {
            debug!(connection = %self.connection_id, %err, "command rejected");
            self.reply(Reply::Rejection(err.to_event()));
        }
    }

    fn reply(&self, reply: Reply) {
        // the forwarder is only gone once the connection is shutting down
        if self.reply_tx.send(reply).is_err() {
            debug!(connection = %self.connection_id, "dropping reply, forwarder stopped");
        }
    }

    /// Receive the next event for this connection
    pub async fn recv(&mut self) -> Option<Event> {
        self.mpsc_rx.recv().await
    }

    /// Stop forwarding updates and remove the participants this connection joined
    pub async fn disconnect(mut self) {
        self.join_set.abort_all();
        self.store.disconnect(&self.connection_id).await;
    }
}

/// Forwards broadcasted updates and replies to a single connection.
/// Lagging behind the broadcast channel or a snapshot request is answered with a fresh snapshot.
async fn forward_events(
    store: Arc<SessionStore>,
    mut broadcast_rx: broadcast::Receiver<Event>,
    mut reply_rx: mpsc::UnboundedReceiver<Reply>,
    mpsc_tx: mpsc::Sender<Event>,
) {
    loop {
        let events: Vec<Event> = tokio::select! {
            // updates of earlier commands are already queued when a reply arrives, drain them first
            biased;

            received = broadcast_rx.recv() => match received {
                Ok(event) => vec![event],
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "connection lagged behind the session, sending a snapshot");
                    store.resync(&mut broadcast_rx).await.into()
                }
                Err(RecvError::Closed) => break,
            },
            Some(reply) = reply_rx.recv() => match reply {
                Reply::Snapshot => store.resync(&mut broadcast_rx).await.into(),
                Reply::Rejection(event) => vec![event],
            },
        };

        for event in events {
            if mpsc_tx.send(event).await.is_err() {
                return;
            }
        }
    }
}
