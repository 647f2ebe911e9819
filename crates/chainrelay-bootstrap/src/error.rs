//! Bootstrap error types.

use std::time::Duration;

use chainrelay_rpc::TransportError;
use thiserror::Error;

use crate::identity::IdentityError;
use crate::state::ConnectionPhase;

/// Why a single bootstrap attempt failed. Every variant is recoverable.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("{phase}: transport error: {source}")]
    Transport {
        phase: ConnectionPhase,
        #[source]
        source: TransportError,
    },

    #[error("{phase}: timed out after {}s", .timeout.as_secs())]
    Timeout {
        phase: ConnectionPhase,
        timeout: Duration,
    },

    #[error("schema mismatch: {reason}")]
    SchemaMismatch { reason: String },

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl BootstrapError {
    /// The phase the attempt was in when it failed.
    pub fn phase(&self) -> ConnectionPhase {
        match self {
            Self::Transport { phase, .. } | Self::Timeout { phase, .. } => *phase,
            Self::SchemaMismatch { .. } => ConnectionPhase::Registering,
            Self::Identity(_) => ConnectionPhase::DerivingIdentity,
        }
    }
}

/// Returned by `run` when cancelled before a connection became ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bootstrap cancelled")]
pub struct Shutdown;
