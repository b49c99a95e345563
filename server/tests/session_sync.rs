use std::{sync::Arc, time::Duration};

use comms::{
    card::Card,
    command::{JoinCommand, LeaveCommand, RequestSnapshotCommand, ResetCommand, UserCommand, VoteCommand},
    event::{Event, RejectionReason},
    mirror::SessionMirror,
    transport::{
        self,
        client::{CommandWriter, EventStream},
    },
};
use poker_server::{config::ServerConfig, server, store::SessionStore};
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::StreamExt;
use tokio_tungstenite::tungstenite::{
    client::IntoClientRequest,
    http::{header, HeaderValue},
};

const TIMEOUT: Duration = Duration::from_secs(5);
const ALLOWED_ORIGIN: &str = "http://localhost:3000";

struct TestServer {
    url: String,
    store: Arc<SessionStore>,
    _quit_tx: broadcast::Sender<()>,
}

/// Boot a server on an ephemeral port
async fn boot_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let store = Arc::new(SessionStore::new());
    let config = Arc::new(ServerConfig {
        allowed_origins: vec![ALLOWED_ORIGIN.to_string()],
        ..ServerConfig::default()
    });
    let (quit_tx, quit_rx) = broadcast::channel(1);

    tokio::spawn(server::serve(listener, store.clone(), config, quit_rx));

    TestServer {
        url,
        store,
        _quit_tx: quit_tx,
    }
}

/// A minimal session client: a socket and a mirror rebuilt from broadcasts
struct TestClient {
    events: EventStream,
    commands: CommandWriter,
    mirror: SessionMirror,
    rejections: Vec<RejectionReason>,
}

impl TestClient {
    async fn connect(server: &TestServer) -> Self {
        let (events, mut commands) = transport::client::connect(&server.url).await.unwrap();
        commands
            .write(&UserCommand::RequestSnapshot(RequestSnapshotCommand))
            .await
            .unwrap();

        TestClient {
            events,
            commands,
            mirror: SessionMirror::default(),
            rejections: Vec::new(),
        }
    }

    async fn send(&mut self, command: UserCommand) {
        self.commands.write(&command).await.unwrap();
    }

    async fn join(&mut self, name: &str) {
        self.send(UserCommand::Join(JoinCommand { name: name.into() }))
            .await;
    }

    async fn vote(&mut self, name: &str, value: u32) {
        self.send(UserCommand::Vote(VoteCommand {
            name: name.into(),
            value,
        }))
        .await;
    }

    /// Apply incoming events until the condition holds
    async fn sync_until(&mut self, condition: impl Fn(&TestClient) -> bool) {
        tokio::time::timeout(TIMEOUT, async {
            while !condition(self) {
                let event = self
                    .events
                    .next()
                    .await
                    .expect("server closed the connection")
                    .expect("could not read event");

                if let Event::IntentRejected(rejection) = &event {
                    self.rejections.push(rejection.reason);
                }
                self.mirror.apply(&event);
            }
        })
        .await
        .expect("timed out waiting for the session to sync");
    }
}

fn card(value: u32) -> Card {
    Card::try_from(value).unwrap()
}

#[tokio::test]
async fn every_client_sees_joins_and_votes() {
    let server = boot_server().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;

    alice.join("alice").await;
    bob.sync_until(|c| c.mirror.has_joined("alice")).await;
    bob.join("bob").await;
    alice.vote("alice", 3).await;
    bob.vote("bob", 5).await;

    for client in [&mut alice, &mut bob] {
        // alice's vote may land before bob's join, so wait for both participants too
        client
            .sync_until(|c| c.mirror.participants().len() == 2 && c.mirror.all_votes_submitted())
            .await;

        assert_eq!(client.mirror.participants(), ["alice", "bob"]);
        assert_eq!(client.mirror.vote_of("alice"), Some(card(3)));
        assert_eq!(client.mirror.average_vote(), Some(4.0));
    }
}

#[tokio::test]
async fn reset_clears_votes_but_keeps_participants() {
    let server = boot_server().await;
    let mut alice = TestClient::connect(&server).await;

    alice.join("alice").await;
    alice.vote("alice", 8).await;
    alice.sync_until(|c| c.mirror.vote_of("alice").is_some()).await;
    alice.send(UserCommand::Reset(ResetCommand)).await;
    alice.sync_until(|c| c.mirror.votes().is_empty()).await;

    assert_eq!(alice.mirror.participants(), ["alice"]);
    assert!(!alice.mirror.all_votes_submitted());
}

#[tokio::test]
async fn duplicate_join_is_rejected_for_the_sender_only() {
    let server = boot_server().await;
    let mut first_tab = TestClient::connect(&server).await;
    let mut second_tab = TestClient::connect(&server).await;

    first_tab.join("alice").await;
    second_tab.sync_until(|c| c.mirror.has_joined("alice")).await;
    second_tab.join("alice").await;
    second_tab.sync_until(|c| !c.rejections.is_empty()).await;

    assert_eq!(second_tab.rejections, vec![RejectionReason::NameTaken]);
    assert_eq!(second_tab.mirror.participants(), ["alice"]);

    // the first tab keeps working and never heard about the rejection
    first_tab.vote("alice", 1).await;
    first_tab.sync_until(|c| c.mirror.vote_of("alice").is_some()).await;
    assert!(first_tab.rejections.is_empty());
}

#[tokio::test]
async fn invalid_votes_are_rejected() {
    let server = boot_server().await;
    let mut client = TestClient::connect(&server).await;

    client.vote("nobody", 5).await;
    client.join("carol").await;
    client.vote("carol", 7).await;
    client.sync_until(|c| c.rejections.len() == 2).await;

    assert_eq!(
        client.rejections,
        vec![
            RejectionReason::UnknownParticipant,
            RejectionReason::InvalidCard
        ]
    );
    assert!(client.mirror.votes().is_empty());
}

#[tokio::test]
async fn leaving_and_disconnecting_remove_participants() {
    let server = boot_server().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;

    alice.join("alice").await;
    alice.join("alice-2").await;
    alice.vote("alice", 13).await;
    bob.sync_until(|c| c.mirror.vote_of("alice").is_some()).await;

    alice
        .send(UserCommand::Leave(LeaveCommand {
            name: "alice-2".into(),
        }))
        .await;
    bob.sync_until(|c| c.mirror.participants() == ["alice"]).await;
    assert_eq!(bob.mirror.vote_of("alice"), Some(card(13)));

    // a removal broadcasts participants and then votes, wait for both halves
    drop(alice);
    bob.sync_until(|c| c.mirror.participants().is_empty() && c.mirror.votes().is_empty())
        .await;

    let mut expected = SessionMirror::default();
    for event in server.store.snapshot().await {
        expected.apply(&event);
    }
    assert_eq!(bob.mirror, expected);
}

#[tokio::test]
async fn late_client_converges_through_a_snapshot() {
    let server = boot_server().await;
    let mut alice = TestClient::connect(&server).await;

    alice.join("alice").await;
    alice.join("bob").await;
    alice.vote("bob", 20).await;
    alice.sync_until(|c| c.mirror.vote_of("bob").is_some()).await;

    // a client that missed everything asks for a snapshot on connect
    let mut latecomer = TestClient::connect(&server).await;
    latecomer
        .sync_until(|c| c.mirror.vote_of("bob").is_some())
        .await;

    assert_eq!(latecomer.mirror, alice.mirror);

    let mut expected = SessionMirror::default();
    for event in server.store.snapshot().await {
        expected.apply(&event);
    }
    assert_eq!(latecomer.mirror, expected);
}

#[tokio::test]
async fn foreign_browser_origin_is_refused() {
    let server = boot_server().await;

    let mut request = server.url.as_str().into_client_request().unwrap();
    request
        .headers_mut()
        .insert(header::ORIGIN, HeaderValue::from_static("http://evil.example"));
    assert!(tokio_tungstenite::connect_async(request).await.is_err());

    let mut request = server.url.as_str().into_client_request().unwrap();
    request
        .headers_mut()
        .insert(header::ORIGIN, HeaderValue::from_static(ALLOWED_ORIGIN));
    assert!(tokio_tungstenite::connect_async(request).await.is_ok());
}
