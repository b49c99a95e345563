use serde::{Deserialize, Serialize};

/// User Command for joining the session under a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinCommand {
    // The display name, also the participant's key.
    pub name: String,
}

/// User Command for casting or changing a vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteCommand {
    // The participant who votes.
    pub name: String,
    // The raw card value, validated by the server.
    pub value: u32,
}

/// User Command for clearing every vote of the current round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetCommand;

/// User Command for leaving the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveCommand {
    // The participant to remove.
    pub name: String,
}

/// User Command for asking the server to resend the whole session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSnapshotCommand;

/// A user command (intent) which can be sent to the server by a single connection.
/// The server validates every command before it touches the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum UserCommand {
    Join(JoinCommand),
    Vote(VoteCommand),
    Reset(ResetCommand),
    Leave(LeaveCommand),
    RequestSnapshot(RequestSnapshotCommand),
}
