use anyhow::Context;
use futures_util::{stream::SplitSink, SinkExt};
use tokio::net::TcpStream;
use tokio_stream::StreamExt;
use tokio_tungstenite::{
    accept_hdr_async,
    tungstenite::{
        handshake::server::{ErrorResponse, Request, Response},
        http::{header, StatusCode},
        Message,
    },
    WebSocketStream,
};

use crate::{command, event};

use super::common::{parse_frame, to_frame, BoxedStream, FrameError};

/// [CommandStream] is a stream of [crate::command::UserCommand]s sent by the client
///
/// # Cancel Safety
///
/// This stream is cancel-safe, meaning that it can be used in [tokio::select!]
/// without the risk of missing commands.
pub type CommandStream = BoxedStream<Result<command::UserCommand, FrameError>>;

/// [EventWriter] is a wrapper around a websocket sink which writes [crate::event::Event]s to the client
pub struct EventWriter {
    sink: SplitSink<WebSocketStream<TcpStream>, Message>,
}

impl EventWriter {
    pub fn new(sink: SplitSink<WebSocketStream<TcpStream>, Message>) -> Self {
        Self { sink }
    }

    /// Send a [crate::event::Event] as a single text frame
    ///
    /// # Cancel Safety
    ///
    /// This method is not cancellation safe. If it is used as the event
    /// in a [tokio::select!] statement and some other
    /// branch completes first, then the provided [crate::event::Event] may have been
    /// partially written to the socket.
    pub async fn write(&mut self, event: &event::Event) -> anyhow::Result<()> {
        let frame = to_frame(event).context("could not serialize event")?;

        self.sink
            .send(frame)
            .await
            .context("could not write event to the client")?;

        Ok(())
    }

    /// Send a close frame and flush the socket
    pub async fn close(&mut self) -> anyhow::Result<()> {
        self.sink
            .close()
            .await
            .context("could not close the client socket")
    }
}

/// Decides whether a handshake is allowed based on its `Origin` header.
///
/// Requests without an `Origin` header come from non-browser clients and are accepted.
/// Browser requests must come from one of the allowed origins, `*` allows any origin.
/// Accepted browser origins are echoed back in `Access-Control-Allow-Origin`.
pub fn check_origin(
    request: &Request,
    mut response: Response,
    allowed_origins: &[String],
) -> Result<Response, ErrorResponse> {
    let Some(origin) = request.headers().get(header::ORIGIN) else {
        return Ok(response);
    };

    let is_allowed = origin
        .to_str()
        .map(|origin| {
            allowed_origins
                .iter()
                .any(|allowed| allowed == "*" || allowed == origin)
        })
        .unwrap_or(false);

    if !is_allowed {
        let mut rejection = ErrorResponse::new(Some(String::from("origin is not allowed")));
        *rejection.status_mut() = StatusCode::FORBIDDEN;

        return Err(rejection);
    }

    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());

    Ok(response)
}

/// Performs the websocket handshake on a freshly accepted TCP stream and
/// splits the connection into a stream of commands and an event writer.
///
/// # Arguments
///
/// - `stream` - A [TcpStream] accepted by the server
/// - `allowed_origins` - Browser origins which may open a connection
pub async fn accept(
    stream: TcpStream,
    allowed_origins: &[String],
) -> anyhow::Result<(CommandStream, EventWriter)> {
    let ws_stream = accept_hdr_async(stream, |request: &Request, response: Response| {
        check_origin(request, response, allowed_origins)
    })
    .await
    .context("websocket handshake with the client failed")?;

    let (sink, stream) = futures_util::StreamExt::split(ws_stream);

    Ok((
        Box::pin(stream.filter_map(parse_frame::<command::UserCommand>)),
        EventWriter::new(sink),
    ))
}
