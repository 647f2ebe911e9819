//! sr25519 signing identities.

use std::fmt;
use std::str::FromStr;

use subxt_signer::sr25519::{self, Keypair};
use subxt_signer::SecretUri;
use thiserror::Error;

use crate::config::Secret;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("keyring is not a valid secret URI: {0}")]
    InvalidUri(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),
}

/// Where an identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Derived from the configured keyring secret.
    Keyring,
    /// Well-known development account "alice".
    DevAlice,
    /// Well-known development account "bob".
    DevBob,
}

impl IdentitySource {
    pub fn is_dev(self) -> bool {
        !matches!(self, Self::Keyring)
    }
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Keyring => "keyring",
            Self::DevAlice => "dev:alice",
            Self::DevBob => "dev:bob",
        })
    }
}

/// An sr25519 key pair plus its provenance.
pub struct Identity {
    source: IdentitySource,
    keypair: Keypair,
}

impl Identity {
    pub fn source(&self) -> IdentitySource {
        self.source
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.keypair.public_key().0
    }

    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.public_key()))
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.keypair.sign(message).0
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("source", &self.source)
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

/// Derive the primary identity.
///
/// An empty secret falls back to the dev account "alice". That account's
/// keys are public, so the fallback is logged at `warn`. A secret made only
/// of whitespace is rejected rather than treated as empty.
pub fn derive_primary(secret: &Secret) -> Result<Identity, IdentityError> {
    if secret.is_empty() {
        tracing::warn!(
            account = "alice",
            "no keyring configured, signing with the public dev account alice"
        );
        return Ok(Identity {
            source: IdentitySource::DevAlice,
            keypair: sr25519::dev::alice(),
        });
    }

    if secret.is_blank() {
        return Err(IdentityError::InvalidUri("keyring is blank".into()));
    }

    let uri = SecretUri::from_str(secret.expose().trim())
        .map_err(|e| IdentityError::InvalidUri(e.to_string()))?;
    let keypair = Keypair::from_uri(&uri).map_err(|e| IdentityError::Derivation(e.to_string()))?;
    Ok(Identity {
        source: IdentitySource::Keyring,
        keypair,
    })
}

/// The secondary identity, always the dev account "bob".
pub fn secondary() -> Identity {
    Identity {
        source: IdentitySource::DevBob,
        keypair: sr25519::dev::bob(),
    }
}
