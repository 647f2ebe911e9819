//! `ChainClient`: a transport session bound to a validated type registry.
//!
//! A client only exists after a successful handshake, so holding one means
//! the node answered, reported a runtime, and served metadata the registry
//! can be used with.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chainrelay_types::{CodecError, ScaleCodec, ScaleValue, TypeRegistry};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::error::TransportError;
use crate::metadata::{self, RuntimeVersion};
use crate::request::JsonRpcRequest;
use crate::transport::RpcTransport;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The node is reachable but does not look like a chain this registry
    /// describes.
    #[error("schema mismatch: {reason}")]
    SchemaMismatch { reason: String },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ClientError {
    fn mismatch(reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            reason: reason.into(),
        }
    }
}

/// Handshake options.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// When set, the node's `specName` must match (ASCII case-insensitive).
    pub expected_spec_name: Option<String>,
}

/// Live client for one node session.
pub struct ChainClient {
    transport: Arc<dyn RpcTransport>,
    registry: Arc<TypeRegistry>,
    next_id: AtomicU64,
    chain: String,
    runtime: RuntimeVersion,
    genesis_hash: String,
    metadata_version: u8,
}

impl ChainClient {
    /// Run the handshake over `transport` and bind the result to `registry`.
    ///
    /// Issues `system_chain`, `state_getRuntimeVersion`,
    /// `chain_getBlockHash(0)` and `state_getMetadata` in that order.
    pub async fn connect(
        transport: Arc<dyn RpcTransport>,
        registry: Arc<TypeRegistry>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let mut client = Self {
            transport,
            registry,
            next_id: AtomicU64::new(1),
            chain: String::new(),
            runtime: RuntimeVersion {
                spec_name: String::new(),
                impl_name: String::new(),
                authoring_version: 0,
                spec_version: 0,
                impl_version: 0,
                transaction_version: 0,
            },
            genesis_hash: String::new(),
            metadata_version: 0,
        };

        client.chain = client.call("system_chain", vec![]).await?;
        client.runtime = client.call("state_getRuntimeVersion", vec![]).await?;
        if let Some(expected) = &options.expected_spec_name {
            if !client.runtime.spec_name.eq_ignore_ascii_case(expected) {
                return Err(ClientError::mismatch(format!(
                    "node runs spec '{}', expected '{expected}'",
                    client.runtime.spec_name
                )));
            }
        }

        let genesis: Option<String> = client
            .call("chain_getBlockHash", vec![Value::from(0u64)])
            .await?;
        client.genesis_hash = genesis.ok_or_else(|| ClientError::mismatch("node has no genesis block"))?;

        let raw: String = client.call("state_getMetadata", vec![]).await?;
        client.metadata_version = metadata::decode_hex(&raw)
            .and_then(|blob| metadata::metadata_version(&blob))
            .map_err(|e| ClientError::mismatch(e.to_string()))?;

        tracing::debug!(
            url = client.transport.url(),
            chain = %client.chain,
            spec = %client.runtime.spec_name,
            spec_version = client.runtime.spec_version,
            metadata = client.metadata_version,
            "handshake complete"
        );
        Ok(client)
    }

    /// Call `method` and deserialize its result into `T`.
    ///
    /// A result of the wrong shape is reported as
    /// [`ClientError::SchemaMismatch`].
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let resp = self
            .transport
            .send(JsonRpcRequest::new(id, method, params))
            .await?;
        let value = resp.into_result().map_err(TransportError::Rpc)?;
        serde_json::from_value(value)
            .map_err(|e| ClientError::mismatch(format!("unexpected {method} response: {e}")))
    }

    /// SCALE-encode `value` as the registry type `name`.
    pub fn encode(&self, name: &str, value: &ScaleValue) -> Result<Vec<u8>, ClientError> {
        Ok(ScaleCodec::new(&self.registry).encode_named(name, value)?)
    }

    /// SCALE-decode `bytes` as the registry type `name`.
    pub fn decode(&self, name: &str, bytes: &[u8]) -> Result<ScaleValue, ClientError> {
        Ok(ScaleCodec::new(&self.registry).decode_named(name, bytes)?)
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn runtime_version(&self) -> &RuntimeVersion {
        &self.runtime
    }

    pub fn genesis_hash(&self) -> &str {
        &self.genesis_hash
    }

    pub fn metadata_version(&self) -> u8 {
        self.metadata_version
    }

    pub fn url(&self) -> &str {
        self.transport.url()
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }
}

impl fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainClient")
            .field("url", &self.transport.url())
            .field("chain", &self.chain)
            .field("spec_name", &self.runtime.spec_name)
            .field("spec_version", &self.runtime.spec_version)
            .field("metadata_version", &self.metadata_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::JsonRpcResponse;
    use async_trait::async_trait;
    use chainrelay_types::darwinia;
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers handshake methods from a fixed table and records the calls.
    struct ScriptedNode {
        answers: Vec<(&'static str, Value)>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedNode {
        fn crab() -> Self {
            Self::with("state_getMetadata", json!("0x6d6574610c00"))
        }

        fn with(method: &'static str, answer: Value) -> Self {
            let mut answers = vec![
                ("system_chain", json!("Crab")),
                (
                    "state_getRuntimeVersion",
                    json!({"specName": "Crab", "implName": "Crab", "specVersion": 23, "implVersion": 0}),
                ),
                ("chain_getBlockHash", json!(format!("0x{}", "34".repeat(32)))),
                ("state_getMetadata", json!("0x6d6574610c00")),
            ];
            for entry in answers.iter_mut() {
                if entry.0 == method {
                    entry.1 = answer.clone();
                }
            }
            Self {
                answers,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RpcTransport for ScriptedNode {
        async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
            self.calls.lock().unwrap().push(req.method.clone());
            let id = req.id.as_u64().unwrap();
            Ok(match self.answers.iter().find(|(m, _)| *m == req.method) {
                Some((_, v)) => JsonRpcResponse::success(id, v.clone()),
                None => JsonRpcResponse::failure(id, -32601, "Method not found"),
            })
        }

        fn url(&self) -> &str {
            "mock://crab"
        }
    }

    fn registry() -> Arc<TypeRegistry> {
        Arc::new(darwinia::registry().unwrap())
    }

    #[tokio::test]
    async fn handshake_collects_chain_info() {
        let node = Arc::new(ScriptedNode::crab());
        let client = ChainClient::connect(node.clone(), registry(), ClientOptions::default())
            .await
            .unwrap();

        assert_eq!(client.chain(), "Crab");
        assert_eq!(client.runtime_version().spec_version, 23);
        assert_eq!(client.metadata_version(), 12);
        assert!(client.genesis_hash().starts_with("0x3434"));
        assert_eq!(
            *node.calls.lock().unwrap(),
            [
                "system_chain",
                "state_getRuntimeVersion",
                "chain_getBlockHash",
                "state_getMetadata"
            ]
        );
    }

    #[tokio::test]
    async fn wrong_spec_name_is_a_schema_mismatch() {
        let opts = ClientOptions {
            expected_spec_name: Some("Darwinia".into()),
        };
        let err = ChainClient::connect(Arc::new(ScriptedNode::crab()), registry(), opts)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::SchemaMismatch { .. }), "{err}");
    }

    #[tokio::test]
    async fn spec_name_match_ignores_case() {
        let opts = ClientOptions {
            expected_spec_name: Some("crab".into()),
        };
        assert!(ChainClient::connect(Arc::new(ScriptedNode::crab()), registry(), opts)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn foreign_metadata_is_a_schema_mismatch() {
        let node = ScriptedNode::with("state_getMetadata", json!("0xdeadbeef0c"));
        let err = ChainClient::connect(Arc::new(node), registry(), ClientOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::SchemaMismatch { .. }));
    }

    #[tokio::test]
    async fn malformed_runtime_version_is_a_schema_mismatch() {
        let node = ScriptedNode::with("state_getRuntimeVersion", json!("v1"));
        let err = ChainClient::connect(Arc::new(node), registry(), ClientOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::SchemaMismatch { .. }));
    }

    #[tokio::test]
    async fn missing_genesis_is_a_schema_mismatch() {
        let node = ScriptedNode::with("chain_getBlockHash", Value::Null);
        let err = ChainClient::connect(Arc::new(node), registry(), ClientOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::SchemaMismatch { .. }));
    }

    #[tokio::test]
    async fn node_errors_stay_transport_errors() {
        let client = ChainClient::connect(
            Arc::new(ScriptedNode::crab()),
            registry(),
            ClientOptions::default(),
        )
        .await
        .unwrap();
        let err = client
            .call::<Value>("eth_blockNumber", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::Rpc(_))));
    }

    #[tokio::test]
    async fn client_codec_uses_bound_registry() {
        let client = ChainClient::connect(
            Arc::new(ScriptedNode::crab()),
            registry(),
            ClientOptions::default(),
        )
        .await
        .unwrap();
        let reasons = ScaleValue::variant("All", None);
        let bytes = client.encode("LockReasons", &reasons).unwrap();
        assert_eq!(bytes, [0x02]);
        assert_eq!(client.decode("LockReasons", &bytes).unwrap(), reasons);
    }
}
