//! Error types for the type registry and the SCALE codec.

use thiserror::Error;

/// Errors raised while building, validating or querying a [`TypeRegistry`].
///
/// Every variant except [`RegistryError::UnknownType`] is an integrity error:
/// it means the static table itself is wrong and retrying cannot help.
///
/// [`TypeRegistry`]: crate::registry::TypeRegistry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Unknown type '{name}'")]
    UnknownType { name: String },

    #[error("Type '{name}' references unknown type '{reference}'")]
    DanglingReference { name: String, reference: String },

    #[error("Type '{name}' is declared more than once")]
    DuplicateType { name: String },

    #[error("Alias cycle detected through '{name}'")]
    CyclicAlias { name: String },

    #[error("Type '{name}' uses Compact<{reference}> but '{reference}' is not an unsigned integer")]
    InvalidCompact { name: String, reference: String },

    #[error("Enum '{name}' assigns index {index} to more than one variant")]
    DuplicateVariantIndex { name: String, index: u8 },

    #[error("Enum '{name}' has more than 256 variants")]
    TooManyVariants { name: String },

    #[error("Invalid type reference '{input}': {reason}")]
    InvalidTypeRef { input: String, reason: String },

    #[error("Type '{name}' contains itself and has no finite encoding")]
    InfinitelySized { name: String },

    #[error("Struct '{name}' declares field '{field}' more than once")]
    DuplicateField { name: String, field: String },

    #[error("Enum '{name}' declares variant '{variant}' more than once")]
    DuplicateVariant { name: String, variant: String },
}

impl RegistryError {
    /// Returns `true` if this error describes a structurally broken table
    /// (as opposed to a failed lookup).
    pub fn is_integrity_error(&self) -> bool {
        !matches!(self, Self::UnknownType { .. })
    }
}

/// Errors produced while encoding or decoding a value against the registry.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Type mismatch at {ty}: expected {expected}, got {got}")]
    TypeMismatch {
        ty: String,
        expected: String,
        got: String,
    },

    #[error("Value {value} does not fit in {ty}")]
    OutOfRange { ty: String, value: String },

    #[error("Length mismatch at {ty}: expected {expected}, got {got}")]
    LengthMismatch { ty: String, expected: usize, got: usize },

    #[error("Field mismatch in {ty}: expected '{expected}', got '{got}'")]
    FieldMismatch {
        ty: String,
        expected: String,
        got: String,
    },

    #[error("Enum {ty} has no variant {variant}")]
    UnknownVariant { ty: String, variant: String },

    #[error("SCALE decode failed at {ty}: {reason}")]
    Decode { ty: String, reason: String },

    #[error("Nesting deeper than {limit} levels at {ty}")]
    TooDeep { ty: String, limit: usize },

    #[error("{remaining} trailing bytes after decoding {ty}")]
    TrailingBytes { ty: String, remaining: usize },
}
