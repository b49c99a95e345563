use std::collections::BTreeMap;

use comms::{
    card::Card,
    command::{self, UserCommand},
    event::{self, Event},
    transport,
};
use tokio::net::TcpListener;
use tokio_stream::StreamExt;

#[tokio::test]
async fn assert_server_client_transport() {
    // bind to an ephemeral port so parallel test runs do not collide
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("could not bind to a port");
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let (server_collected_commands, client_collected_events) =
        tokio::join!(execute_server(listener), execute_client(&url));

    assert!(server_collected_commands.is_ok());
    assert!(client_collected_events.is_ok());

    assert_eq!(
        server_collected_commands.unwrap(),
        vec![
            UserCommand::Join(command::JoinCommand {
                name: "alice".into(),
            }),
            UserCommand::Vote(command::VoteCommand {
                name: "alice".into(),
                value: 8,
            }),
        ]
    );

    assert_eq!(
        client_collected_events.unwrap(),
        vec![Event::VotesUpdated(event::VotesUpdatedEvent {
            votes: BTreeMap::from([("alice".to_string(), Card::try_from(5).unwrap())]),
        })]
    );
}

async fn execute_server(listener: TcpListener) -> anyhow::Result<Vec<command::UserCommand>> {
    // accept the only client connection we will have
    let tcp_stream = match listener.accept().await {
        Ok((tcp_stream, _addr)) => tcp_stream,
        Err(e) => return Err(anyhow::anyhow!("failed to accept client: {}", e)),
    };

    // upgrade the client connection and break it into higher level API for ease of use
    let (mut command_stream, mut event_writer) =
        transport::server::accept(tcp_stream, &["http://localhost:3000".to_string()]).await?;
    // store commands received from the client
    let mut collected_commands = Vec::new();

    // greet the client with the current votes
    event_writer
        .write(&Event::VotesUpdated(event::VotesUpdatedEvent {
            votes: BTreeMap::from([("alice".to_string(), Card::try_from(5).unwrap())]),
        }))
        .await?;

    // listen for commands from the client until the connection is closed
    while let Some(result) = command_stream.next().await {
        match result {
            // client has sent a valid command which we could read and parse
            Ok(command) => collected_commands.push(command),
            // the client closed the socket without waiting for our close frame
            Err(e) if !e.is_recoverable() => break,
            // client has sent a command which we could not parse
            Err(e) => return Err(anyhow::anyhow!("failed to read command: {}", e)),
        }
    }

    Ok(collected_commands)
}

async fn execute_client(url: &str) -> anyhow::Result<Vec<event::Event>> {
    // open a websocket connection and break it into higher level API for ease of use
    let (mut event_stream, mut command_writer) = transport::client::connect(url).await?;
    // store events received from the server
    let mut collected_events = Vec::new();

    // read the greeting from the server
    match event_stream.next().await {
        // server has sent a valid event which we could read and parse
        Some(Ok(event)) => collected_events.push(event),
        // server has sent an event which we could not read or parse
        Some(Err(e)) => return Err(anyhow::anyhow!("could not parse event: {}", e)),
        // server has closed the connection, return an error
        None => return Err(anyhow::anyhow!("server closed the connection")),
    }

    // send some commands to the server
    command_writer
        .write(&UserCommand::Join(command::JoinCommand {
            name: "alice".into(),
        }))
        .await?;

    command_writer
        .write(&UserCommand::Vote(command::VoteCommand {
            name: "alice".into(),
            value: 8,
        }))
        .await?;

    command_writer.close().await?;

    Ok(collected_events)
}
