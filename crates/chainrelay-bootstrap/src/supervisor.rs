//! The connection supervisor: a sequential retry loop around one bootstrap
//! attempt.
//!
//! ```text
//! Disconnected -> Connecting -> Registering -> DerivingIdentity -> Ready
//!       ^              |              |                |
//!       +--- delay ----+--- Failed ---+----------------+
//! ```
//!
//! There is no attempt cap and no backoff: every failure waits the same
//! `retry_delay`. Once `Ready` is published the supervisor is done; it does
//! not watch the session afterwards.

use std::sync::Arc;

use chainrelay_rpc::{ChainClient, ClientError, ClientOptions, Connector};
use chainrelay_types::TypeRegistry;
use tokio::sync::watch;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::BootstrapConfig;
use crate::error::{BootstrapError, Shutdown};
use crate::identity;
use crate::state::{ConnectionHandle, ConnectionPhase, ConnectionState, ReadyConnection};

pub struct ConnectionSupervisor<C> {
    config: BootstrapConfig,
    registry: Arc<TypeRegistry>,
    connector: C,
    state: watch::Sender<ConnectionState>,
}

impl<C: Connector> ConnectionSupervisor<C> {
    /// The registry must already be built; a registry that fails validation
    /// never reaches the retry loop.
    pub fn new(config: BootstrapConfig, registry: Arc<TypeRegistry>, connector: C) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            registry,
            connector,
            state,
        }
    }

    pub fn handle(&self) -> ConnectionHandle {
        ConnectionHandle::new(self.state.subscribe())
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    fn publish(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    /// One bootstrap attempt. Nothing it builds survives a failure.
    pub async fn connect_once(&self) -> Result<ReadyConnection, BootstrapError> {
        let url = self.config.rpc_server.as_str();
        let timeout = self.config.handshake_timeout();

        self.publish(ConnectionState::Connecting);
        let transport = time::timeout(timeout, self.connector.open(url))
            .await
            .map_err(|_| BootstrapError::Timeout {
                phase: ConnectionPhase::Connecting,
                timeout,
            })?
            .map_err(|source| BootstrapError::Transport {
                phase: ConnectionPhase::Connecting,
                source,
            })?;

        self.publish(ConnectionState::Registering);
        let options = ClientOptions {
            expected_spec_name: self.config.expected_spec_name.clone(),
        };
        let client = time::timeout(
            timeout,
            ChainClient::connect(transport, self.registry.clone(), options),
        )
        .await
        .map_err(|_| BootstrapError::Timeout {
            phase: ConnectionPhase::Registering,
            timeout,
        })?
        .map_err(|e| match e {
            ClientError::Transport(source) => BootstrapError::Transport {
                phase: ConnectionPhase::Registering,
                source,
            },
            ClientError::SchemaMismatch { reason } => BootstrapError::SchemaMismatch { reason },
            ClientError::Codec(e) => BootstrapError::SchemaMismatch {
                reason: e.to_string(),
            },
        })?;

        self.publish(ConnectionState::DerivingIdentity);
        let identity = identity::derive_primary(&self.config.keyring)?;
        let secondary_identity = identity::secondary();

        Ok(ReadyConnection {
            client,
            identity,
            secondary_identity,
        })
    }

    /// Retry [`connect_once`](Self::connect_once) until it succeeds or
    /// `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) -> Result<Arc<ReadyConnection>, Shutdown> {
        let delay = self.config.retry_delay();
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            self.publish(ConnectionState::Disconnected);
            tracing::debug!(attempt, url = %self.config.rpc_server, "bootstrap attempt");

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                res = self.connect_once() => Some(res),
            };

            let err = match outcome {
                None => return Err(self.shut_down()),
                Some(Ok(ready)) => {
                    let ready = Arc::new(ready);
                    self.publish(ConnectionState::Ready(ready.clone()));
                    tracing::info!(
                        attempt,
                        url = ready.client.url(),
                        chain = ready.client.chain(),
                        spec_version = ready.client.runtime_version().spec_version,
                        identity = %ready.identity.source(),
                        public_key = %ready.identity.public_key_hex(),
                        "connected and ready"
                    );
                    return Ok(ready);
                }
                Some(Err(err)) => err,
            };

            tracing::warn!(
                attempt,
                phase = %err.phase(),
                error = %err,
                retry_in_secs = delay.as_secs(),
                "bootstrap attempt failed"
            );
            self.publish(ConnectionState::Failed {
                attempt,
                reason: err.to_string(),
            });

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.shut_down()),
                _ = time::sleep(delay) => {}
            }
        }
    }

    fn shut_down(&self) -> Shutdown {
        self.publish(ConnectionState::Disconnected);
        tracing::info!("bootstrap cancelled");
        Shutdown
    }
}
