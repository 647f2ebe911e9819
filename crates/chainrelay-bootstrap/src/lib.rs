//! chainrelay-bootstrap — bring a relay session up and keep trying until it is.
//!
//! [`ConnectionSupervisor::run`] loops over single attempts, each of which
//! opens a transport, handshakes a [`ChainClient`](chainrelay_rpc::ChainClient)
//! bound to the type registry, and derives the signing identities. Failures
//! are logged and retried after a fixed delay. The result is published as a
//! [`ConnectionState`] that readers observe through a [`ConnectionHandle`].

pub mod config;
pub mod error;
pub mod identity;
pub mod state;
pub mod supervisor;

pub use config::{BootstrapConfig, ConfigError, Secret};
pub use error::{BootstrapError, Shutdown};
pub use identity::{Identity, IdentityError, IdentitySource};
pub use state::{ConnectionHandle, ConnectionPhase, ConnectionState, ReadyConnection};
pub use supervisor::ConnectionSupervisor;
