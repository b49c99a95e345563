use circular_queue::CircularQueue;
use comms::{
    card::Card,
    command::{JoinCommand, LeaveCommand, RequestSnapshotCommand, ResetCommand, UserCommand, VoteCommand},
    event::{Event, RejectionReason},
    mirror::SessionMirror,
};

use super::action::Action;

const MAX_NOTICES_TO_STORE: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub enum ServerConnectionStatus {
    Uninitialized,
    Connecting,
    Connected { addr: String },
    /// Lost an established connection, retrying in the background
    Reconnecting { addr: String, err: String },
    Errored { err: String },
}

/// State holds the state of the application
#[derive(Debug, Clone)]
pub struct State {
    pub server_connection_status: ServerConnectionStatus,
    /// Url the client connects (and reconnects) to
    pub server_url: String,
    /// Copy of the session as last broadcasted by the server
    pub mirror: SessionMirror,
    /// Name this client joined under, kept across reconnects
    pub username: Option<String>,
    /// The card this client picked, never sent back by the server
    pub selected_card: Option<Card>,
    /// Free text about what is being estimated, only kept locally
    pub task_description: String,
    /// Rejections and connection changes worth telling the user about
    pub notices: CircularQueue<String>,
    /// Seconds spent connected
    pub timer: usize,
}

impl State {
    pub fn new(server_url: impl Into<String>) -> Self {
        State {
            server_connection_status: ServerConnectionStatus::Uninitialized,
            server_url: server_url.into(),
            mirror: SessionMirror::default(),
            username: None,
            selected_card: None,
            task_description: String::new(),
            notices: CircularQueue::with_capacity(MAX_NOTICES_TO_STORE),
            timer: 0,
        }
    }

    pub fn handle_server_event(&mut self, event: &Event) {
        self.mirror.apply(event);

        match event {
            Event::ParticipantsUpdated(_) => {}
            Event::VotesUpdated(_) => {
                // somebody reset the round, or our vote got dropped
                if let Some(username) = self.username.as_deref() {
                    if self.mirror.vote_of(username).is_none() {
                        self.selected_card = None;
                    }
                }
            }
            Event::IntentRejected(event) => {
                if matches!(
                    event.reason,
                    RejectionReason::EmptyName | RejectionReason::NameTaken
                ) && !self.has_joined()
                {
                    self.username = None;
                }

                self.notices.push(event.message.clone());
            }
        }
    }

    /// True once the server lists the name this client joined under
    pub fn has_joined(&self) -> bool {
        self.username
            .as_deref()
            .is_some_and(|username| self.mirror.has_joined(username))
    }

    /// Turns a UI action into the command to send, applying the local guards.
    /// Returns None when nothing should go over the wire.
    pub fn command_for(&mut self, action: Action) -> Option<UserCommand> {
        match action {
            Action::Join { name } => self.join_command(&name),
            Action::Vote { card } => {
                let name = self.username.clone().filter(|_| self.has_joined());
                let Some(name) = name else {
                    self.notices.push("Join the session before voting".to_string());
                    return None;
                };

                self.selected_card = Some(card);

                Some(UserCommand::Vote(VoteCommand {
                    name,
                    value: card.value(),
                }))
            }
            Action::Reset => {
                self.selected_card = None;

                Some(UserCommand::Reset(ResetCommand))
            }
            Action::Leave => self.leave_command(),
            Action::SetTaskDescription { text } => {
                self.task_description = text;

                None
            }
            Action::ConnectToServerRequest { .. } | Action::Exit => None,
        }
    }

    fn join_command(&mut self, name: &str) -> Option<UserCommand> {
        let name = name.trim();

        if name.is_empty() {
            self.notices.push("Enter a name to join".to_string());
            return None;
        }
        if self.has_joined() {
            self.notices.push("Leave the session before joining under another name".to_string());
            return None;
        }
        if self.mirror.has_joined(name) {
            self.notices.push(format!("{} is already taken", name));
            return None;
        }

        self.username = Some(name.to_string());
        self.selected_card = None;

        Some(UserCommand::Join(JoinCommand {
            name: name.to_string(),
        }))
    }

    /// Leave command for the joined name, forgetting it locally
    pub fn leave_command(&mut self) -> Option<UserCommand> {
        let name = self.username.take()?;
        self.selected_card = None;

        Some(UserCommand::Leave(LeaveCommand { name }))
    }

    /// Commands to send right after (re)connecting: a snapshot request and a rejoin if
    /// this client had joined before the connection dropped.
    pub fn on_connect_commands(&self) -> Vec<UserCommand> {
        let mut commands = vec![UserCommand::RequestSnapshot(RequestSnapshotCommand)];

        if let Some(name) = self.username.clone() {
            commands.push(UserCommand::Join(JoinCommand { name }));
        }

        commands
    }

    pub fn mark_connection_request_start(&mut self) {
        self.server_connection_status = ServerConnectionStatus::Connecting;
    }

    /// Processes the result of a connection request to change the state of the application
    pub fn process_connection_request_result(&mut self, result: anyhow::Result<String>) {
        let status = match result {
            Ok(addr) => {
                self.notices.push(format!("Connected to {}", addr));
                ServerConnectionStatus::Connected { addr }
            }
            Err(err) => match self.reconnect_addr() {
                Some(addr) => ServerConnectionStatus::Reconnecting {
                    addr: addr.to_string(),
                    err: format!("{:#}", err),
                },
                None => ServerConnectionStatus::Errored {
                    err: format!("{:#}", err),
                },
            },
        };

        self.server_connection_status = status;
    }

    /// The connection dropped. The mirror stays as it was so the last snapshot keeps showing.
    pub fn mark_connection_lost(&mut self, err: impl Into<String>) {
        let err = err.into();
        let addr = match &self.server_connection_status {
            ServerConnectionStatus::Connected { addr } => addr.clone(),
            _ => self.server_url.clone(),
        };

        self.notices.push(format!("Lost connection: {}", err));
        self.server_connection_status = ServerConnectionStatus::Reconnecting { addr, err };
    }

    /// Address to retry, if the client is waiting to reconnect
    pub fn reconnect_addr(&self) -> Option<&str> {
        match &self.server_connection_status {
            ServerConnectionStatus::Reconnecting { addr, .. } => Some(addr),
            _ => None,
        }
    }

    pub fn tick_timer(&mut self) {
        self.timer += 1;
    }
}
