// WebSocket transport: socket tasks forward lifecycle events to the event loop over a channel.
// Invariants: a socket task never touches dashboard state; every event carries its connection id.

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    Open,
    Message(String),
    Error(String),
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SocketEvent {
    pub connection_id: u64,
    pub event: TransportEvent,
}

/// Starts one connection attempt. The spawned task must finish with `Closed` unless aborted.
pub trait Connector: Send + 'static {
    fn connect(
        &self,
        connection_id: u64,
        url: Url,
        events: mpsc::Sender<SocketEvent>,
    ) -> JoinHandle<()>;
}

#[derive(Clone, Debug, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(
        &self,
        connection_id: u64,
        url: Url,
        events: mpsc::Sender<SocketEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(socket_task(connection_id, url, events))
    }
}

async fn socket_task(connection_id: u64, url: Url, events: mpsc::Sender<SocketEvent>) {
    let emit = |event| {
        let events = events.clone();
        async move {
            events
                .send(SocketEvent {
                    connection_id,
                    event,
                })
                .await
                .is_ok()
        }
    };

    info!(%url, connection_id, "connecting");
    let mut stream = match connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(err) => {
            if emit(TransportEvent::Error(err.to_string())).await {
                emit(TransportEvent::Closed).await;
            }
            return;
        }
    };
    if !emit(TransportEvent::Open).await {
        return;
    }

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if !emit(TransportEvent::Message(text)).await {
                    return;
                }
            }
            Ok(Message::Close(frame)) => {
                debug!(connection_id, ?frame, "close frame received");
                break;
            }
            Ok(Message::Binary(bytes)) => {
                debug!(connection_id, len = bytes.len(), "ignoring binary frame");
            }
            Ok(_) => {}
            Err(err) => {
                if !emit(TransportEvent::Error(err.to_string())).await {
                    return;
                }
                break;
            }
        }
    }

    emit(TransportEvent::Closed).await;
}
