use anyhow::Context;
use comms::{
    command::{self, UserCommand},
    event::{self, Event},
    mirror::SessionMirror,
    transport,
};
use tokio::net::TcpListener;
use tokio_stream::StreamExt;

const PORT: u16 = 8081;

async fn server_example(listener: TcpListener) -> anyhow::Result<()> {
    // accept the only client connection we will have
    let tcp_stream = match listener.accept().await {
        Ok((tcp_stream, _addr)) => tcp_stream,
        Err(e) => return Err(anyhow::anyhow!("failed to accept client: {}", e)),
    };

    // upgrade the client connection into higher level API for ease of use
    let (mut command_stream, mut event_writer) =
        transport::server::accept(tcp_stream, &["*".to_string()]).await?;

    // welcome the user with the current participant list
    event_writer
        .write(&Event::ParticipantsUpdated(event::ParticipantsUpdatedEvent {
            participants: vec!["alice".into(), "bob".into()],
        }))
        .await?;

    // listen for commands from the client until the connection is closed
    while let Some(result) = command_stream.next().await {
        match result {
            // client has sent a valid command which we could read and parse
            Ok(command) => println!("SERVER: received command: {:?}", command),
            // the socket is gone, nothing more will arrive
            Err(e) if !e.is_recoverable() => break,
            // client has sent a frame which we could not parse
            // could be a bug in the client, malicious client, breaking api changes etc.
            Err(e) => println!("SERVER: failed to read command: {}", e),
        }
    }

    Ok(())
}

async fn client_example() -> anyhow::Result<()> {
    // open a websocket connection to the server
    let (mut event_stream, mut command_writer) =
        transport::client::connect(&format!("ws://localhost:{}", PORT)).await?;
    let mut mirror = SessionMirror::default();

    // read the welcome event from the server
    match event_stream.next().await {
        // server has sent a valid event which we could read and parse
        Some(Ok(event)) => {
            mirror.apply(&event);
            println!("CLIENT: participants are now {:?}", mirror.participants());
        }
        // server has sent an event which we could not read or parse
        Some(Err(e)) => println!("CLIENT: failed to read event: {}", e),
        // server has closed the connection, return an error
        None => return Err(anyhow::anyhow!("server closed the connection")),
    }

    // send some commands to the server
    command_writer
        .write(&UserCommand::Join(command::JoinCommand {
            name: "carol".into(),
        }))
        .await?;

    command_writer
        .write(&UserCommand::Vote(command::VoteCommand {
            name: "carol".into(),
            value: 13,
        }))
        .await?;

    command_writer.close().await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // bind before the client starts so the connection can not race the listener
    let listener = TcpListener::bind(format!("127.0.0.1:{}", PORT))
        .await
        .context("could not bind to the port")?;

    tokio::try_join!(server_example(listener), client_example())
        .context("one of the examples failed")?;

    println!("example ran without problems");

    Ok(())
}
