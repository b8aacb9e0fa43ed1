//! Per-connection handler: register, then pump events both ways until the
//! socket closes.

use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;

use futures_util::{FutureExt, Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use roomcast_common::{unix_millis, ClientEvent, ConnectionId};

use crate::outbound::OutboundQueue;
use crate::session::SessionManager;

/// Handle a single WebSocket connection.
pub async fn handle_connection<S>(ws: S, addr: SocketAddr, sessions: SessionManager)
where
    S: Stream<Item = Result<Message, WsError>> + Sink<Message, Error = WsError> + Unpin,
{
    let (conn, queue) = sessions.connect().await;
    tracing::info!(peer = %addr, %conn, "client connected");

    // Membership must be released even if event handling panics.
    let pumped = AssertUnwindSafe(pump(ws, addr, conn, queue, &sessions))
        .catch_unwind()
        .await;
    if pumped.is_err() {
        tracing::error!(peer = %addr, %conn, "connection handler panicked");
    }

    tracing::info!(peer = %addr, %conn, "client disconnected");
    sessions.disconnect(conn).await;
}

async fn pump<S>(
    ws: S,
    addr: SocketAddr,
    conn: ConnectionId,
    queue: OutboundQueue,
    sessions: &SessionManager,
) where
    S: Stream<Item = Result<Message, WsError>> + Sink<Message, Error = WsError> + Unpin,
{
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            // Queued events → this client's socket
            Some(outbound) = queue.recv() => {
                if sink.send(Message::Text(outbound.text)).await.is_err() {
                    break;
                }
            }

            // This client's socket → session manager
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => match ClientEvent::from_json(&text) {
                        Ok(event) => sessions.handle_event(conn, event, unix_millis()).await,
                        Err(e) => {
                            tracing::warn!(peer = %addr, %conn, error = %e, "rejected client event");
                        }
                    },
                    Some(Ok(Message::Binary(_))) => {
                        tracing::warn!(peer = %addr, %conn, "binary frame ignored");
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(peer = %addr, %conn, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
}
