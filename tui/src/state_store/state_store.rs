use std::time::Duration;

use comms::transport::{
    self,
    client::{CommandWriter, EventStream},
};
use tokio::{
    sync::{
        broadcast,
        mpsc::{self, UnboundedReceiver, UnboundedSender},
    },
    time::{interval, Interval, MissedTickBehavior},
};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::{
    config::ClientConfig,
    termination::{Interrupted, Terminator},
};

use super::{action::Action, State};

const RECONNECT_INTERVAL: Duration = Duration::from_secs(3);

pub struct StateStore {
    config: ClientConfig,
    state_tx: UnboundedSender<State>,
}

impl StateStore {
    pub fn new(config: ClientConfig) -> (Self, UnboundedReceiver<State>) {
        let (state_tx, state_rx) = mpsc::unbounded_channel::<State>();

        (StateStore { config, state_tx }, state_rx)
    }
}

type ServerHandle = (EventStream, CommandWriter);

/// Connects and sends the commands every fresh connection starts with
async fn create_server_handle(addr: &str, state: &State) -> anyhow::Result<ServerHandle> {
    let (event_stream, mut command_writer) = transport::client::connect(addr).await?;

    for command in state.on_connect_commands() {
        command_writer.write(&command).await?;
    }

    Ok((event_stream, command_writer))
}

/// Sends an explicit leave for the joined name and closes the socket
async fn leave_session(state: &mut State, command_writer: &mut CommandWriter) {
    if let Some(command) = state.leave_command() {
        if let Err(err) = command_writer.write(&command).await {
            warn!("could not leave the session: {:#}", err);
        }
    }

    if let Err(err) = command_writer.close().await {
        debug!("could not close the connection: {:#}", err);
    }
}

fn reconnect_ticker() -> Interval {
    let mut ticker = interval(RECONNECT_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

impl StateStore {
    pub async fn main_loop(
        self,
        mut terminator: Terminator,
        mut action_rx: UnboundedReceiver<Action>,
        mut interrupt_rx: broadcast::Receiver<Interrupted>,
    ) -> anyhow::Result<Interrupted> {
        let mut opt_server_handle: Option<ServerHandle> = None;
        let mut state = State::new(self.config.server_url.clone());

        // the initial state once
        self.state_tx.send(state.clone())?;

        let mut ticker = interval(Duration::from_secs(1));
        let mut reconnect_ticker = reconnect_ticker();

        let result = loop {
            if let Some((event_stream, command_writer)) = opt_server_handle.as_mut() {
                tokio::select! {
                    // Handle the server events as they come in
                    maybe_event = event_stream.next() => match maybe_event {
                        Some(Ok(event)) => {
                            state.handle_server_event(&event);
                        },
                        Some(Err(err)) if err.is_recoverable() => {
                            warn!("skipping a malformed event: {}", err);
                        },
                        // server went away, keep the last snapshot on screen and retry in the background
                        Some(Err(err)) => {
                            opt_server_handle = None;
                            state.mark_connection_lost(err.to_string());
                            reconnect_ticker.reset();
                        },
                        None => {
                            opt_server_handle = None;
                            state.mark_connection_lost("server closed the connection");
                            reconnect_ticker.reset();
                        },
                    },
                    // Handle the actions coming from the UI
                    // and process them to do async operations
                    Some(action) = action_rx.recv() => match action {
                        Action::Exit => {
                            leave_session(&mut state, command_writer).await;
                            let _ = terminator.terminate(Interrupted::UserInt);

                            break Interrupted::UserInt;
                        },
                        action => {
                            if let Some(command) = state.command_for(action) {
                                if let Err(err) = command_writer.write(&command).await {
                                    opt_server_handle = None;
                                    state.mark_connection_lost(format!("{:#}", err));
                                    reconnect_ticker.reset();
                                }
                            }
                        },
                    },
                    // Tick to terminate the select every N milliseconds
                    _ = ticker.tick() => {
                        state.tick_timer();
                    },
                    // Catch and handle interrupt signal to gracefully shutdown
                    Ok(interrupted) = interrupt_rx.recv() => {
                        leave_session(&mut state, command_writer).await;

                        break interrupted;
                    }
                }
            } else {
                tokio::select! {
                    Some(action) = action_rx.recv() => match action {
                        Action::ConnectToServerRequest { addr } => {
                            state.mark_connection_request_start();
                            // emit event to re-render any part depending on the connection status
                            self.state_tx.send(state.clone())?;

                            match create_server_handle(&addr, &state).await {
                                Ok(server_handle) => {
                                    info!("connected to {}", addr);
                                    // set the server handle and change status for further processing
                                    let _ = opt_server_handle.insert(server_handle);
                                    state.process_connection_request_result(Ok(addr));
                                    // ticker needs to be resetted to avoid showing time spent connecting to the server
                                    ticker.reset();
                                },
                                Err(err) => {
                                    warn!("could not connect to {}: {:#}", addr, err);
                                    state.process_connection_request_result(Err(err));
                                }
                            }
                        },
                        Action::Exit => {
                            let _ = terminator.terminate(Interrupted::UserInt);

                            break Interrupted::UserInt;
                        },
                        // the description is local, everything else needs a connection
                        action @ Action::SetTaskDescription { .. } => {
                            state.command_for(action);
                        },
                        _ => (),
                    },
                    _ = reconnect_ticker.tick(), if state.reconnect_addr().is_some() => {
                        let addr = state.reconnect_addr().map(String::from).unwrap_or_default();

                        match create_server_handle(&addr, &state).await {
                            Ok(server_handle) => {
                                info!("reconnected to {}", addr);
                                let _ = opt_server_handle.insert(server_handle);
                                state.process_connection_request_result(Ok(addr));
                            },
                            Err(err) => {
                                debug!("reconnect to {} failed: {:#}", addr, err);
                                state.process_connection_request_result(Err(err));
                            }
                        }
                    },
                    // Catch and handle interrupt signal to gracefully shutdown
                    Ok(interrupted) = interrupt_rx.recv() => {
                        break interrupted;
                    }
                }
            }

            self.state_tx.send(state.clone())?;
        };

        Ok(result)
    }
}
