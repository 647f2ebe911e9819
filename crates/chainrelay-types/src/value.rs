//! Dynamic values for registry-driven encode/decode.

use alloy_primitives::U256;
use std::fmt;

/// A value shaped by some registry type.
///
/// Byte-like types (`Bytes`, `Vec<u8>`, `[u8; N]`, `H160`/`H256`/`H512`)
/// always map to [`ScaleValue::Bytes`]; every unsigned integer up to
/// `u128`, compact or not, maps to [`ScaleValue::Uint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleValue {
    Bool(bool),
    Uint(u128),
    U256(U256),
    Bytes(Vec<u8>),
    /// `Vec<T>`, non-byte arrays and tuples.
    Seq(Vec<ScaleValue>),
    Option(Option<Box<ScaleValue>>),
    /// Struct fields in declaration order.
    Composite(Vec<(String, ScaleValue)>),
    Variant {
        name: String,
        payload: Option<Box<ScaleValue>>,
    },
}

impl ScaleValue {
    pub fn composite<S: Into<String>>(fields: impl IntoIterator<Item = (S, ScaleValue)>) -> Self {
        Self::Composite(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn variant(name: impl Into<String>, payload: Option<ScaleValue>) -> Self {
        Self::Variant {
            name: name.into(),
            payload: payload.map(Box::new),
        }
    }

    pub fn some(inner: ScaleValue) -> Self {
        Self::Option(Some(Box::new(inner)))
    }

    pub fn none() -> Self {
        Self::Option(None)
    }

    /// Short label used in type-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Uint(_) => "uint",
            Self::U256(_) => "u256",
            Self::Bytes(_) => "bytes",
            Self::Seq(_) => "sequence",
            Self::Option(_) => "option",
            Self::Composite(_) => "composite",
            Self::Variant { .. } => "variant",
        }
    }

    /// Look up a struct field by name.
    pub fn field(&self, name: &str) -> Option<&ScaleValue> {
        match self {
            Self::Composite(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ScaleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::U256(v) => write!(f, "{v}"),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::Seq(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Option(None) => write!(f, "None"),
            Self::Option(Some(v)) => write!(f, "Some({v})"),
            Self::Composite(fields) => {
                let parts: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Self::Variant { name, payload: None } => write!(f, "{name}"),
            Self::Variant {
                name,
                payload: Some(p),
            } => write!(f, "{name}({p})"),
        }
    }
}
