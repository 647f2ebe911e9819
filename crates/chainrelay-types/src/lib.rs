//! chainrelay-types — the wire type registry for ChainRelay.
//!
//! # Overview
//!
//! A relay client must agree byte-for-byte with the remote chain on how its
//! custom types are laid out. This crate describes those layouts:
//!
//! - [`TypeRegistry`] — immutable, validated table of named [`TypeDescriptor`]s
//! - [`RegistryBuilder`] — declarative construction; `build()` validates eagerly
//! - [`TypeRef`] — parsed type references (`Compact<T>`, `Vec<T>`, `[T; N]`, …)
//! - [`darwinia`] — the Darwinia runtime table
//! - [`ScaleCodec`] — SCALE encode/decode of [`ScaleValue`]s driven by the registry

pub mod codec;
pub mod darwinia;
pub mod descriptor;
pub mod error;
pub mod primitive;
pub mod registry;
pub mod type_ref;
pub mod value;

pub use codec::{ScaleCodec, MAX_DEPTH, ZERO_SIZED_LIMIT};
pub use descriptor::{Field, TypeDescriptor, TypeShape, Variant};
pub use error::{CodecError, RegistryError};
pub use primitive::PrimitiveKind;
pub use registry::{RegistryBuilder, Resolved, TypeRegistry};
pub use type_ref::TypeRef;
pub use value::ScaleValue;
