//! The `Connector` capability: how a fresh transport is opened for an attempt.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::transport::RpcTransport;
use crate::ws::{WsConfig, WsTransport};

/// Opens a new transport session to an endpoint.
///
/// The bootstrap loop calls this once per attempt, so a failed session is
/// always replaced rather than repaired.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn open(&self, url: &str) -> Result<Arc<dyn RpcTransport>, TransportError>;
}

/// Opens [`WsTransport`] sessions.
#[derive(Debug, Clone, Default)]
pub struct WsConnector {
    config: WsConfig,
}

impl WsConnector {
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn open(&self, url: &str) -> Result<Arc<dyn RpcTransport>, TransportError> {
        let transport = WsTransport::connect(url, self.config.clone()).await?;
        Ok(Arc::new(transport))
    }
}
