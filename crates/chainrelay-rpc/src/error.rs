//! Transport-level error types.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors that can occur while talking to the node.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not establish the WebSocket session.
    #[error("Connect to {url} failed: {reason}")]
    Connect { url: String, reason: String },

    /// Send/receive failure on an open socket.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// The socket closed while a request was outstanding.
    #[error("Connection to {url} closed")]
    Closed { url: String },

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl TransportError {
    /// Returns `true` for connection-level failures, where a fresh session
    /// may succeed.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::WebSocket(_) | Self::Closed { .. } | Self::Timeout { .. }
        )
    }
}
