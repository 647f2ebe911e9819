//! Runtime version and metadata prefix checks used by the handshake.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `b"meta"`, the prefix of every encoded runtime metadata blob.
pub const METADATA_MAGIC: [u8; 4] = *b"meta";

/// Metadata versions whose custom types the registry is able to describe.
pub const SUPPORTED_METADATA_VERSIONS: RangeInclusive<u8> = 9..=15;

/// Result of `state_getRuntimeVersion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeVersion {
    pub spec_name: String,
    pub impl_name: String,
    #[serde(default)]
    pub authoring_version: u32,
    pub spec_version: u32,
    pub impl_version: u32,
    #[serde(default)]
    pub transaction_version: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("metadata is not valid hex: {0}")]
    Hex(String),

    #[error("metadata blob is {len} bytes, too short for a header")]
    TooShort { len: usize },

    #[error("metadata does not start with the 'meta' magic (got 0x{found})")]
    BadMagic { found: String },

    #[error("metadata version V{0} is not supported (expected V9..=V15)")]
    UnsupportedVersion(u8),
}

/// Decode a `0x`-prefixed hex string as returned by the node.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, MetadataError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| MetadataError::Hex(e.to_string()))
}

/// Check the metadata header and return its version byte.
pub fn metadata_version(blob: &[u8]) -> Result<u8, MetadataError> {
    if blob.len() < 5 {
        return Err(MetadataError::TooShort { len: blob.len() });
    }
    if blob[..4] != METADATA_MAGIC {
        return Err(MetadataError::BadMagic {
            found: hex::encode(&blob[..4]),
        });
    }
    let version = blob[4];
    if !SUPPORTED_METADATA_VERSIONS.contains(&version) {
        return Err(MetadataError::UnsupportedVersion(version));
    }
    Ok(version)
}
