//! chainrelay-rpc — talking to a Substrate node over JSON-RPC.
//!
//! - [`RpcTransport`]: the object-safe seam between client and wire
//! - [`WsTransport`]: WebSocket transport, one socket per session, no
//!   internal reconnect
//! - [`Connector`]: opens a fresh transport per bootstrap attempt
//! - [`ChainClient`]: a transport bound to a [`TypeRegistry`] after a
//!   successful handshake
//!
//! [`TypeRegistry`]: chainrelay_types::TypeRegistry

pub mod client;
pub mod connector;
pub mod error;
pub mod metadata;
pub mod request;
pub mod transport;
pub mod ws;

pub use client::{ChainClient, ClientError, ClientOptions};
pub use connector::{Connector, WsConnector};
pub use error::TransportError;
pub use metadata::RuntimeVersion;
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use transport::RpcTransport;
pub use ws::{WsConfig, WsTransport};
