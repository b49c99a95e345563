use anyhow::Context;
use futures_util::{stream::SplitSink, SinkExt};
use tokio::net::TcpStream;
use tokio_stream::StreamExt;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::{command, event};

use super::common::{parse_frame, to_frame, BoxedStream, FrameError};

/// [EventStream] is a stream of [crate::event::Event]s sent by the server
///
/// # Cancel Safety
///
/// This stream is cancel-safe, meaning that it can be used in [tokio::select]
/// without the risk of missing events.
pub type EventStream = BoxedStream<Result<event::Event, FrameError>>;

type ClientSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// [CommandWriter] is a wrapper around a websocket sink which writes [crate::command::UserCommand]s to the server
pub struct CommandWriter {
    sink: SplitSink<ClientSocket, Message>,
}

impl CommandWriter {
    pub fn new(sink: SplitSink<ClientSocket, Message>) -> Self {
        Self { sink }
    }

    /// Send a [crate::command::UserCommand] as a single text frame
    ///
    /// # Cancel Safety
    ///
    /// This method is not cancellation safe. If it is used as the event
    /// in a [tokio::select!] statement and some other
    /// branch completes first, then the provided [crate::command::UserCommand] may have been
    /// partially written to the socket.
    pub async fn write(&mut self, command: &command::UserCommand) -> anyhow::Result<()> {
        let frame = to_frame(command).context("could not serialize command")?;

        self.sink
            .send(frame)
            .await
            .context("could not write command to the server")?;

        Ok(())
    }

    /// Send a close frame and flush the socket
    pub async fn close(&mut self) -> anyhow::Result<()> {
        self.sink
            .close()
            .await
            .context("could not close the server socket")
    }
}

/// Opens a websocket connection and splits it into a stream of events and a command writer.
///
/// # Arguments
///
/// - `url` - The websocket url of the server, e.g. `ws://localhost:3001`
pub async fn connect(url: &str) -> anyhow::Result<(EventStream, CommandWriter)> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .with_context(|| format!("could not connect to the server at {}", url))?;

    let (sink, stream) = futures_util::StreamExt::split(ws_stream);

    Ok((
        Box::pin(stream.filter_map(parse_frame::<event::Event>)),
        CommandWriter::new(sink),
    ))
}
