//! Built-in wire primitives.
//!
//! These are the leaves every type reference must eventually resolve to.
//! They are never stored as registry entries by name lookup alone: a bare
//! `u32` or `H256` in a type reference resolves here first.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    /// 256-bit unsigned integer, 32 bytes little-endian on the wire.
    U256,
    /// 20-byte hash / address.
    H160,
    /// 32-byte hash.
    H256,
    /// 64-byte hash.
    H512,
    /// Compact-length-prefixed byte string (`Vec<u8>`).
    Bytes,
}

impl PrimitiveKind {
    /// All primitives, in a stable order.
    pub const ALL: [PrimitiveKind; 11] = [
        Self::Bool,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::U128,
        Self::U256,
        Self::H160,
        Self::H256,
        Self::H512,
        Self::Bytes,
    ];

    /// Look up a primitive by the name used in type references.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::U256 => "U256",
            Self::H160 => "H160",
            Self::H256 => "H256",
            Self::H512 => "H512",
            Self::Bytes => "Bytes",
        }
    }

    /// Width in bits for the integers that may appear inside `Compact<_>`.
    pub fn uint_bits(&self) -> Option<u32> {
        match self {
            Self::U8 => Some(8),
            Self::U16 => Some(16),
            Self::U32 => Some(32),
            Self::U64 => Some(64),
            Self::U128 => Some(128),
            _ => None,
        }
    }

    /// Returns `true` for `u8..=u128`, the only valid `Compact` payloads.
    pub fn is_compactable(&self) -> bool {
        self.uint_bits().is_some()
    }

    /// Byte length of fixed-size hash primitives.
    pub fn hash_len(&self) -> Option<usize> {
        match self {
            Self::H160 => Some(20),
            Self::H256 => Some(32),
            Self::H512 => Some(64),
            _ => None,
        }
    }

    /// Largest value representable by an unsigned integer primitive.
    pub fn uint_max(&self) -> Option<u128> {
        self.uint_bits().map(|bits| {
            if bits == 128 {
                u128::MAX
            } else {
                (1u128 << bits) - 1
            }
        })
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for p in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_name(p.name()), Some(p));
        }
        assert_eq!(PrimitiveKind::from_name("Balance"), None);
    }

    #[test]
    fn compact_only_for_small_uints() {
        assert!(PrimitiveKind::U128.is_compactable());
        assert!(!PrimitiveKind::U256.is_compactable());
        assert!(!PrimitiveKind::H256.is_compactable());
        assert_eq!(PrimitiveKind::U16.uint_max(), Some(65_535));
    }
}
