//! The `RpcTransport` trait — the seam between the chain client and the wire.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// A single-endpoint JSON-RPC transport.
///
/// Implementations must be `Send + Sync`; the client stores them as
/// `Arc<dyn RpcTransport>`.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send one request and wait for its response.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;

    /// Endpoint URL, for logs.
    fn url(&self) -> &str;

    /// `false` once the underlying connection is known to be gone.
    fn is_connected(&self) -> bool {
        true
    }
}
