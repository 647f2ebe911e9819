//! WebSocket JSON-RPC transport.
//!
//! A background task owns the socket and multiplexes requests over it by ID.
//! The transport does not reconnect: when the socket drops, every pending
//! and future request fails with [`TransportError::Closed`] and the owner is
//! expected to build a new session.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::transport::RpcTransport;

type Reply = oneshot::Sender<Result<JsonRpcResponse, TransportError>>;
type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Configuration for the WebSocket transport.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Upper bound on TCP + TLS + WebSocket upgrade.
    pub connect_timeout: Duration,
    /// Upper bound on a single request/response round-trip.
    pub request_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Command sent from callers to the background socket task.
enum WsCommand {
    Send { req: JsonRpcRequest, tx: Reply },
    Close,
}

/// WebSocket JSON-RPC transport bound to a single endpoint.
pub struct WsTransport {
    url: String,
    cmd_tx: mpsc::UnboundedSender<WsCommand>,
    connected: Arc<AtomicBool>,
    request_timeout: Duration,
}

impl WsTransport {
    /// Open the socket to `url` and start the background task.
    ///
    /// Fails fast: an unreachable endpoint or a stalled upgrade is reported
    /// here rather than on the first request.
    pub async fn connect(url: impl Into<String>, config: WsConfig) -> Result<Self, TransportError> {
        let url = url.into();
        tracing::info!(url = %url, "connecting via WebSocket");

        let (socket, _) = time::timeout(
            config.connect_timeout,
            tokio_tungstenite::connect_async(url.as_str()),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            ms: config.connect_timeout.as_millis() as u64,
        })?
        .map_err(|e| TransportError::Connect {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));
        tokio::spawn(ws_task(url.clone(), socket, cmd_rx, connected.clone()));

        Ok(Self {
            url,
            cmd_tx,
            connected,
            request_timeout: config.request_timeout,
        })
    }

    fn closed(&self) -> TransportError {
        TransportError::Closed {
            url: self.url.clone(),
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(WsCommand::Close);
    }
}

#[async_trait]
impl RpcTransport for WsTransport {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(WsCommand::Send { req, tx })
            .map_err(|_| self.closed())?;
        match time::timeout(self.request_timeout, rx).await {
            Err(_) => Err(TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }),
            Ok(Err(_)) => Err(self.closed()),
            Ok(Ok(result)) => result,
        }
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

/// Background task that owns the socket until it closes.
async fn ws_task(
    url: String,
    socket: Socket,
    mut cmd_rx: mpsc::UnboundedReceiver<WsCommand>,
    connected: Arc<AtomicBool>,
) {
    let (mut sink, mut stream) = socket.split();
    let mut pending: HashMap<u64, Reply> = HashMap::new();

    let reason = loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                None | Some(WsCommand::Close) => {
                    let _ = sink.close().await;
                    break None;
                }
                Some(WsCommand::Send { req, tx }) => {
                    let text = match serde_json::to_string(&req) {
                        Ok(text) => text,
                        Err(e) => {
                            let _ = tx.send(Err(e.into()));
                            continue;
                        }
                    };
                    if let Some(id) = req.id.as_u64() {
                        track(&mut pending, id, tx);
                    }
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        break Some(e.to_string());
                    }
                }
            },
            msg = stream.next() => match msg {
                None => break Some("stream ended".to_string()),
                Some(Err(e)) => break Some(e.to_string()),
                Some(Ok(Message::Text(text))) => handle_message(text.as_str(), &mut pending),
                Some(Ok(Message::Close(frame))) => {
                    break Some(frame.map_or_else(|| "closed by peer".to_string(), |f| f.reason.to_string()));
                }
                Some(Ok(_)) => {}
            },
        }
    };

    connected.store(false, Ordering::Release);
    match reason {
        Some(reason) => tracing::warn!(url = %url, %reason, pending = pending.len(), "WS disconnected"),
        None => tracing::debug!(url = %url, "WS closed"),
    }
    for (_, tx) in pending.drain() {
        let _ = tx.send(Err(TransportError::Closed { url: url.clone() }));
    }
}

/// Register a reply slot, first dropping slots whose caller stopped waiting
/// (timed out or cancelled) so unanswered ids do not pile up.
fn track(pending: &mut HashMap<u64, Reply>, id: u64, tx: Reply) {
    pending.retain(|_, waiting| !waiting.is_closed());
    pending.insert(id, tx);
}

fn handle_message(text: &str, pending: &mut HashMap<u64, Reply>) {
    let resp = match serde_json::from_str::<JsonRpcResponse>(text) {
        Ok(resp) => resp,
        Err(_) => {
            // subscription notifications and anything else without an id
            tracing::trace!("ignoring non-response WS message");
            return;
        }
    };
    let Some(id) = resp.id.as_u64() else {
        return;
    };
    match pending.remove(&id) {
        Some(tx) => {
            let _ = tx.send(Ok(resp));
        }
        None => tracing::debug!(id, "response for unknown request id"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_message_routes_by_id() {
        let mut pending = HashMap::new();
        let (tx, mut rx) = oneshot::channel();
        pending.insert(5, tx);

        handle_message(r#"{"jsonrpc":"2.0","id":5,"result":"Crab"}"#, &mut pending);

        let resp = rx.try_recv().unwrap().unwrap();
        assert_eq!(resp.into_result().unwrap(), "Crab");
        assert!(pending.is_empty());
    }

    #[test]
    fn notifications_are_ignored() {
        let mut pending: HashMap<u64, Reply> = HashMap::new();
        let (tx, mut rx) = oneshot::channel();
        pending.insert(1, tx);

        handle_message(
            r#"{"jsonrpc":"2.0","method":"chain_newHead","params":{"subscription":"x","result":{}}}"#,
            &mut pending,
        );

        assert_eq!(pending.len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn abandoned_requests_are_pruned() {
        let mut pending: HashMap<u64, Reply> = HashMap::new();
        let (gone_tx, gone_rx) = oneshot::channel();
        let (live_tx, _live_rx) = oneshot::channel();
        track(&mut pending, 1, gone_tx);
        track(&mut pending, 2, live_tx);
        drop(gone_rx);

        let (tx, mut rx) = oneshot::channel();
        track(&mut pending, 3, tx);
        let mut ids: Vec<_> = pending.keys().copied().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![2, 3]);

        handle_message(r#"{"jsonrpc":"2.0","id":1,"result":"late"}"#, &mut pending);
        handle_message(r#"{"jsonrpc":"2.0","id":3,"result":"Crab"}"#, &mut pending);
        assert_eq!(rx.try_recv().unwrap().unwrap().into_result().unwrap(), "Crab");
        assert_eq!(pending.len(), 1);
    }
}
