//! Published connection state.
//!
//! The supervisor is the only writer. Everyone else reads through a
//! [`ConnectionHandle`]; `Ready` is only ever published with a complete
//! [`ReadyConnection`].

use std::fmt;
use std::sync::Arc;

use chainrelay_rpc::ChainClient;
use tokio::sync::watch;

use crate::identity::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionPhase {
    Disconnected,
    Connecting,
    Registering,
    DerivingIdentity,
    Ready,
    Failed,
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Registering => "registering",
            Self::DerivingIdentity => "deriving-identity",
            Self::Ready => "ready",
            Self::Failed => "failed",
        })
    }
}

/// A fully bootstrapped session: client and both identities.
#[derive(Debug)]
pub struct ReadyConnection {
    pub client: ChainClient,
    pub identity: Identity,
    pub secondary_identity: Identity,
}

#[derive(Debug, Clone)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Registering,
    DerivingIdentity,
    Ready(Arc<ReadyConnection>),
    Failed { attempt: u64, reason: String },
}

impl ConnectionState {
    pub fn phase(&self) -> ConnectionPhase {
        match self {
            Self::Disconnected => ConnectionPhase::Disconnected,
            Self::Connecting => ConnectionPhase::Connecting,
            Self::Registering => ConnectionPhase::Registering,
            Self::DerivingIdentity => ConnectionPhase::DerivingIdentity,
            Self::Ready(_) => ConnectionPhase::Ready,
            Self::Failed { .. } => ConnectionPhase::Failed,
        }
    }

    pub fn ready(&self) -> Option<&Arc<ReadyConnection>> {
        match self {
            Self::Ready(conn) => Some(conn),
            _ => None,
        }
    }
}

/// Read-only view of the published state.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    rx: watch::Receiver<ConnectionState>,
}

impl ConnectionHandle {
    pub(crate) fn new(rx: watch::Receiver<ConnectionState>) -> Self {
        Self { rx }
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.rx.borrow().phase()
    }

    /// The current connection, if `Ready`.
    pub fn ready(&self) -> Option<Arc<ReadyConnection>> {
        self.rx.borrow().ready().cloned()
    }

    /// Wait until a connection is published. `None` if the supervisor is
    /// dropped first.
    pub async fn wait_ready(&self) -> Option<Arc<ReadyConnection>> {
        let mut rx = self.rx.clone();
        let ready = match rx.wait_for(|s| s.ready().is_some()).await {
            Ok(state) => state.ready().cloned(),
            Err(_) => None,
        };
        ready
    }

    /// A receiver observing every published state change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.rx.clone()
    }
}
