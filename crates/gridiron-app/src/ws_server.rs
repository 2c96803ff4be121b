// WebSocket server for communication with the draft client.

use std::fmt::Display;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info, warn};

/// Events emitted by the WebSocket server to the application layer.
#[derive(Debug, PartialEq)]
pub enum WsEvent {
    /// A new WebSocket client has connected.
    Connected { addr: String },
    /// The current WebSocket client has disconnected.
    Disconnected,
    /// A text message was received from the client (raw JSON string).
    Message(String),
}

/// Run the WebSocket server on the given port.
///
/// Binds `127.0.0.1:{port}` and serves one client at a time. Inbound text
/// frames are forwarded through `tx`; every string arriving on `out_rx` is
/// written back to the connected client. Runs until either channel closes.
pub async fn run(
    port: u16,
    tx: mpsc::Sender<WsEvent>,
    mut out_rx: mpsc::Receiver<String>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    let local_addr = listener.local_addr()?;
    info!("WebSocket server listening on {local_addr}");

    loop {
        let (stream, addr) = listener.accept().await?;
        let addr_str = addr.to_string();
        info!("Accepted TCP connection from {addr_str}");

        let ws_stream = match tokio_tungstenite::accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                warn!("WebSocket handshake failed for {addr_str}: {e}");
                continue;
            }
        };

        // Replies meant for a previous client are stale.
        while out_rx.try_recv().is_ok() {}

        if tx
            .send(WsEvent::Connected {
                addr: addr_str.clone(),
            })
            .await
            .is_err()
        {
            break;
        }

        let (write, read) = ws_stream.split();
        if serve_connection(read, write, &tx, &mut out_rx, &addr_str)
            .await
            .is_err()
        {
            break;
        }

        if tx.send(WsEvent::Disconnected).await.is_err() {
            break;
        }
    }

    Ok(())
}

/// Pump one connection: forward inbound text through `tx` and write
/// everything from `out_rx` to `write`. Pending replies are written before
/// the next inbound frame is read.
///
/// Returns `Err(())` if either channel is closed, signalling the caller to
/// stop. Generic over the stream and sink so it can be tested without
/// opening TCP ports.
pub async fn serve_connection<St, Si>(
    mut read: St,
    mut write: Si,
    tx: &mpsc::Sender<WsEvent>,
    out_rx: &mut mpsc::Receiver<String>,
    addr: &str,
) -> Result<(), ()>
where
    St: Stream<Item = Result<Message, WsError>> + Unpin,
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
{
    loop {
        tokio::select! {
            biased;

            outbound = out_rx.recv() => {
                let Some(text) = outbound else {
                    return Err(());
                };
                if let Err(e) = write.send(Message::Text(text.into())).await {
                    warn!("failed to write to {addr}: {e}");
                    break;
                }
            }

            inbound = read.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        if tx.send(WsEvent::Message(text.to_string())).await.is_err() {
                            return Err(());
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client {addr} sent close frame");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error from {addr}: {e}");
                        break;
                    }
                    Some(Ok(other)) => {
                        debug!("ignoring non-text frame from {addr}: {other:?}");
                    }
                    None => break,
                }
            }
        }
    }
    Ok(())
}
