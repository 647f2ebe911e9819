//! Registry-driven SCALE encoder/decoder.
//!
//! Integers are little-endian, `Compact<_>` and every length prefix use the
//! SCALE compact format (via `parity-scale-codec`), enums are a one-byte
//! variant index followed by the payload, and `Option<T>` is a `0`/`1` tag
//! (`Option<bool>` packs into a single `0`/`1`/`2` byte).

use alloy_primitives::U256;
use parity_scale_codec::{Compact, Decode, Encode};

use crate::descriptor::TypeShape;
use crate::error::{CodecError, RegistryError};
use crate::primitive::PrimitiveKind;
use crate::registry::{Resolved, TypeRegistry};
use crate::type_ref::TypeRef;
use crate::value::ScaleValue;

/// Nesting limit for a single encode or decode. Registry validation rules out
/// infinitely sized types, but `Option`, `Vec` and enum payloads may still
/// recurse through a type, and the input decides how deep.
pub const MAX_DEPTH: usize = 256;

/// Most elements a sequence of zero-sized items may claim beyond the bytes
/// left in the input.
pub const ZERO_SIZED_LIMIT: usize = 1024;

/// Encoder/decoder bound to one registry.
#[derive(Debug, Clone, Copy)]
pub struct ScaleCodec<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> ScaleCodec<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Encode `value` as the registry type `name`.
    pub fn encode_named(&self, name: &str, value: &ScaleValue) -> Result<Vec<u8>, CodecError> {
        self.encode(&TypeRef::named(name), value)
    }

    /// Decode a complete value of registry type `name`; trailing bytes are an error.
    pub fn decode_named(&self, name: &str, bytes: &[u8]) -> Result<ScaleValue, CodecError> {
        self.decode_all(&TypeRef::named(name), bytes)
    }

    pub fn encode(&self, ty: &TypeRef, value: &ScaleValue) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.encode_to(ty, value, &mut out)?;
        Ok(out)
    }

    pub fn decode_all(&self, ty: &TypeRef, bytes: &[u8]) -> Result<ScaleValue, CodecError> {
        let mut input = bytes;
        let value = self.decode(ty, &mut input)?;
        if !input.is_empty() {
            return Err(CodecError::TrailingBytes {
                ty: ty.to_string(),
                remaining: input.len(),
            });
        }
        Ok(value)
    }

    // ─── Encode ──────────────────────────────────────────────────────────────

    /// Encode `value` as `ty`, appending to `out`.
    pub fn encode_to(
        &self,
        ty: &TypeRef,
        value: &ScaleValue,
        out: &mut Vec<u8>,
    ) -> Result<(), CodecError> {
        self.encode_at(ty, value, out, 0)
    }

    fn encode_at(
        &self,
        ty: &TypeRef,
        value: &ScaleValue,
        out: &mut Vec<u8>,
        depth: usize,
    ) -> Result<(), CodecError> {
        let depth = descend(ty, depth)?;
        match ty {
            TypeRef::Named(name) => self.encode_named_to(name, value, out, depth),
            TypeRef::Compact(inner) => {
                let kind = self.compact_kind(inner)?;
                let n = self.uint_in_range(ty, kind, value)?;
                Compact(n).encode_to(out);
                Ok(())
            }
            TypeRef::Vec(inner) => {
                if self.is_byte(inner) {
                    let bytes = expect_bytes(ty, value)?;
                    encode_len(ty, bytes.len(), out)?;
                    out.extend_from_slice(bytes);
                    return Ok(());
                }
                let items = expect_seq(ty, value)?;
                encode_len(ty, items.len(), out)?;
                items
                    .iter()
                    .try_for_each(|item| self.encode_at(inner, item, out, depth))
            }
            TypeRef::Option(inner) => {
                let ScaleValue::Option(opt) = value else {
                    return Err(mismatch(ty, "option", value));
                };
                if self.registry.primitive_of(inner) == Some(PrimitiveKind::Bool) {
                    let byte = match opt.as_deref() {
                        None => 0,
                        Some(ScaleValue::Bool(true)) => 1,
                        Some(ScaleValue::Bool(false)) => 2,
                        Some(other) => return Err(mismatch(ty, "bool", other)),
                    };
                    out.push(byte);
                    return Ok(());
                }
                match opt {
                    None => {
                        out.push(0);
                        Ok(())
                    }
                    Some(inner_value) => {
                        out.push(1);
                        self.encode_at(inner, inner_value, out, depth)
                    }
                }
            }
            TypeRef::Tuple(items) => {
                let values = expect_seq(ty, value)?;
                check_len(ty, items.len(), values.len())?;
                items
                    .iter()
                    .zip(values)
                    .try_for_each(|(t, v)| self.encode_at(t, v, out, depth))
            }
            TypeRef::Array(inner, len) => self.encode_array(ty, inner, *len, value, out, depth),
        }
    }

    fn encode_named_to(
        &self,
        name: &str,
        value: &ScaleValue,
        out: &mut Vec<u8>,
        depth: usize,
    ) -> Result<(), CodecError> {
        let desc = match self.registry.resolve_concrete(name)? {
            Resolved::Primitive(kind) => return encode_primitive(name, kind, value, out),
            Resolved::Ref(r) => return self.encode_at(r, value, out, depth),
            Resolved::Shape(desc) => desc,
        };
        match &desc.shape {
            TypeShape::Struct(fields) => {
                let ScaleValue::Composite(values) = value else {
                    return Err(mismatch(name, "composite", value));
                };
                check_len(name, fields.len(), values.len())?;
                for (field, (key, v)) in fields.iter().zip(values) {
                    if &field.name != key {
                        return Err(CodecError::FieldMismatch {
                            ty: name.to_string(),
                            expected: field.name.clone(),
                            got: key.clone(),
                        });
                    }
                    self.encode_at(&field.ty, v, out, depth)?;
                }
                Ok(())
            }
            TypeShape::Enum(variants) => {
                let ScaleValue::Variant {
                    name: variant_name,
                    payload,
                } = value
                else {
                    return Err(mismatch(name, "variant", value));
                };
                let variant = variants
                    .iter()
                    .find(|v| &v.name == variant_name)
                    .ok_or_else(|| CodecError::UnknownVariant {
                        ty: name.to_string(),
                        variant: variant_name.clone(),
                    })?;
                out.push(variant.index);
                match (&variant.payload, payload) {
                    (Some(ty), Some(p)) => self.encode_at(ty, p, out, depth),
                    (None, None) => Ok(()),
                    (Some(ty), None) => Err(CodecError::TypeMismatch {
                        ty: format!("{name}::{variant_name}"),
                        expected: ty.to_string(),
                        got: "unit".into(),
                    }),
                    (None, Some(p)) => Err(mismatch(
                        &format!("{name}::{variant_name}"),
                        "unit",
                        p,
                    )),
                }
            }
            TypeShape::FixedArray { element, len } => {
                self.encode_array(name, element, *len, value, out, depth)
            }
            TypeShape::Alias(target) => self.encode_at(target, value, out, depth),
            TypeShape::Primitive(kind) => encode_primitive(name, *kind, value, out),
        }
    }

    fn encode_array(
        &self,
        ty: &(impl ToString + ?Sized),
        element: &TypeRef,
        len: usize,
        value: &ScaleValue,
        out: &mut Vec<u8>,
        depth: usize,
    ) -> Result<(), CodecError> {
        if self.is_byte(element) {
            let bytes = expect_bytes(ty, value)?;
            check_len(ty, len, bytes.len())?;
            out.extend_from_slice(bytes);
            return Ok(());
        }
        let items = expect_seq(ty, value)?;
        check_len(ty, len, items.len())?;
        items
            .iter()
            .try_for_each(|item| self.encode_at(element, item, out, depth))
    }

    // ─── Decode ──────────────────────────────────────────────────────────────

    /// Decode one value from the front of `input`, advancing it.
    pub fn decode(&self, ty: &TypeRef, input: &mut &[u8]) -> Result<ScaleValue, CodecError> {
        self.decode_at(ty, input, 0)
    }

    fn decode_at(
        &self,
        ty: &TypeRef,
        input: &mut &[u8],
        depth: usize,
    ) -> Result<ScaleValue, CodecError> {
        let depth = descend(ty, depth)?;
        match ty {
            TypeRef::Named(name) => self.decode_named_from(name, input, depth),
            TypeRef::Compact(inner) => {
                let kind = self.compact_kind(inner)?;
                let n = Compact::<u128>::decode(input)
                    .map_err(|e| decode_err(ty, e))?
                    .0;
                let value = ScaleValue::Uint(n);
                self.uint_in_range(ty, kind, &value)?;
                Ok(value)
            }
            TypeRef::Vec(inner) => {
                let len = decode_len(ty, input)?;
                if self.is_byte(inner) {
                    return Ok(ScaleValue::Bytes(take(ty, input, len)?.to_vec()));
                }
                self.decode_items(ty, inner, len, input, depth)
            }
            TypeRef::Option(inner) => {
                let tag = take(ty, input, 1)?[0];
                if self.registry.primitive_of(inner) == Some(PrimitiveKind::Bool) {
                    return match tag {
                        0 => Ok(ScaleValue::none()),
                        1 => Ok(ScaleValue::some(ScaleValue::Bool(true))),
                        2 => Ok(ScaleValue::some(ScaleValue::Bool(false))),
                        other => Err(bad_tag(ty, other)),
                    };
                }
                match tag {
                    0 => Ok(ScaleValue::none()),
                    1 => Ok(ScaleValue::some(self.decode_at(inner, input, depth)?)),
                    other => Err(bad_tag(ty, other)),
                }
            }
            TypeRef::Tuple(items) => items
                .iter()
                .map(|t| self.decode_at(t, input, depth))
                .collect::<Result<Vec<_>, _>>()
                .map(ScaleValue::Seq),
            TypeRef::Array(inner, len) => self.decode_array(ty, inner, *len, input, depth),
        }
    }

    fn decode_named_from(
        &self,
        name: &str,
        input: &mut &[u8],
        depth: usize,
    ) -> Result<ScaleValue, CodecError> {
        let desc = match self.registry.resolve_concrete(name)? {
            Resolved::Primitive(kind) => return decode_primitive(name, kind, input),
            Resolved::Ref(r) => return self.decode_at(r, input, depth),
            Resolved::Shape(desc) => desc,
        };
        match &desc.shape {
            TypeShape::Struct(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    values.push((field.name.clone(), self.decode_at(&field.ty, input, depth)?));
                }
                Ok(ScaleValue::Composite(values))
            }
            TypeShape::Enum(variants) => {
                let index = take(name, input, 1)?[0];
                let variant = variants
                    .iter()
                    .find(|v| v.index == index)
                    .ok_or_else(|| CodecError::Decode {
                        ty: name.to_string(),
                        reason: format!("no variant with index {index}"),
                    })?;
                let payload = match &variant.payload {
                    Some(ty) => Some(self.decode_at(ty, input, depth)?),
                    None => None,
                };
                Ok(ScaleValue::variant(variant.name.clone(), payload))
            }
            TypeShape::FixedArray { element, len } => {
                self.decode_array(name, element, *len, input, depth)
            }
            TypeShape::Alias(target) => self.decode_at(target, input, depth),
            TypeShape::Primitive(kind) => decode_primitive(name, *kind, input),
        }
    }

    fn decode_array(
        &self,
        ty: &(impl ToString + ?Sized),
        element: &TypeRef,
        len: usize,
        input: &mut &[u8],
        depth: usize,
    ) -> Result<ScaleValue, CodecError> {
        if self.is_byte(element) {
            return Ok(ScaleValue::Bytes(take(ty, input, len)?.to_vec()));
        }
        self.decode_items(ty, element, len, input, depth)
    }

    /// Decode `len` consecutive elements.
    ///
    /// The count comes from the input, so it is only trusted as far as the
    /// input can back it. Elements that consume no bytes may repeat at most
    /// as many times as there are bytes left, or [`ZERO_SIZED_LIMIT`] times.
    fn decode_items(
        &self,
        ty: &(impl ToString + ?Sized),
        element: &TypeRef,
        len: usize,
        input: &mut &[u8],
        depth: usize,
    ) -> Result<ScaleValue, CodecError> {
        let mut items = Vec::with_capacity(len.min(input.len()));
        for _ in 0..len {
            let before = input.len();
            items.push(self.decode_at(element, input, depth)?);
            if input.len() == before && len > before.max(ZERO_SIZED_LIMIT) {
                return Err(CodecError::Decode {
                    ty: ty.to_string(),
                    reason: format!(
                        "{len} zero-sized elements of {element} with {before} bytes left"
                    ),
                });
            }
        }
        Ok(ScaleValue::Seq(items))
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    fn is_byte(&self, ty: &TypeRef) -> bool {
        self.registry.primitive_of(ty) == Some(PrimitiveKind::U8)
    }

    fn compact_kind(&self, inner: &TypeRef) -> Result<PrimitiveKind, CodecError> {
        match self.registry.primitive_of(inner) {
            Some(kind) if kind.is_compactable() => Ok(kind),
            _ => Err(RegistryError::InvalidCompact {
                name: format!("Compact<{inner}>"),
                reference: inner.to_string(),
            }
            .into()),
        }
    }

    fn uint_in_range(
        &self,
        ty: &TypeRef,
        kind: PrimitiveKind,
        value: &ScaleValue,
    ) -> Result<u128, CodecError> {
        let n = value.as_u128().ok_or_else(|| mismatch(ty, "uint", value))?;
        match kind.uint_max() {
            Some(max) if n <= max => Ok(n),
            _ => Err(CodecError::OutOfRange {
                ty: ty.to_string(),
                value: n.to_string(),
            }),
        }
    }
}

fn encode_primitive(
    ty: &str,
    kind: PrimitiveKind,
    value: &ScaleValue,
    out: &mut Vec<u8>,
) -> Result<(), CodecError> {
    match kind {
        PrimitiveKind::Bool => match value {
            ScaleValue::Bool(b) => {
                out.push(u8::from(*b));
                Ok(())
            }
            other => Err(mismatch(ty, "bool", other)),
        },
        PrimitiveKind::U8
        | PrimitiveKind::U16
        | PrimitiveKind::U32
        | PrimitiveKind::U64
        | PrimitiveKind::U128 => {
            let n = value.as_u128().ok_or_else(|| mismatch(ty, "uint", value))?;
            let bits = kind.uint_bits().unwrap_or(128);
            if kind.uint_max().is_some_and(|max| n > max) {
                return Err(CodecError::OutOfRange {
                    ty: ty.to_string(),
                    value: n.to_string(),
                });
            }
            out.extend_from_slice(&n.to_le_bytes()[..(bits / 8) as usize]);
            Ok(())
        }
        PrimitiveKind::U256 => match value {
            ScaleValue::U256(v) => {
                out.extend_from_slice(&v.to_le_bytes::<32>());
                Ok(())
            }
            ScaleValue::Uint(v) => {
                out.extend_from_slice(&U256::from(*v).to_le_bytes::<32>());
                Ok(())
            }
            other => Err(mismatch(ty, "u256", other)),
        },
        PrimitiveKind::H160 | PrimitiveKind::H256 | PrimitiveKind::H512 => {
            let bytes = expect_bytes(ty, value)?;
            check_len(ty, kind.hash_len().unwrap_or(0), bytes.len())?;
            out.extend_from_slice(bytes);
            Ok(())
        }
        PrimitiveKind::Bytes => {
            let bytes = expect_bytes(ty, value)?;
            encode_len(ty, bytes.len(), out)?;
            out.extend_from_slice(bytes);
            Ok(())
        }
    }
}

fn decode_primitive(
    ty: &str,
    kind: PrimitiveKind,
    input: &mut &[u8],
) -> Result<ScaleValue, CodecError> {
    match kind {
        PrimitiveKind::Bool => match take(ty, input, 1)?[0] {
            0 => Ok(ScaleValue::Bool(false)),
            1 => Ok(ScaleValue::Bool(true)),
            other => Err(bad_tag(ty, other)),
        },
        PrimitiveKind::U8
        | PrimitiveKind::U16
        | PrimitiveKind::U32
        | PrimitiveKind::U64
        | PrimitiveKind::U128 => {
            let width = (kind.uint_bits().unwrap_or(128) / 8) as usize;
            let mut buf = [0u8; 16];
            buf[..width].copy_from_slice(take(ty, input, width)?);
            Ok(ScaleValue::Uint(u128::from_le_bytes(buf)))
        }
        PrimitiveKind::U256 => Ok(ScaleValue::U256(U256::from_le_slice(take(ty, input, 32)?))),
        PrimitiveKind::H160 | PrimitiveKind::H256 | PrimitiveKind::H512 => {
            let len = kind.hash_len().unwrap_or(0);
            Ok(ScaleValue::Bytes(take(ty, input, len)?.to_vec()))
        }
        PrimitiveKind::Bytes => {
            let len = decode_len(ty, input)?;
            Ok(ScaleValue::Bytes(take(ty, input, len)?.to_vec()))
        }
    }
}

/// Length prefixes are `Compact<u32>`; longer sequences cannot be encoded.
fn encode_len(
    ty: &(impl ToString + ?Sized),
    len: usize,
    out: &mut Vec<u8>,
) -> Result<(), CodecError> {
    let len = u32::try_from(len).map_err(|_| CodecError::OutOfRange {
        ty: format!("length prefix of {}", ty.to_string()),
        value: len.to_string(),
    })?;
    Compact(len).encode_to(out);
    Ok(())
}

fn decode_len(ty: &(impl ToString + ?Sized), input: &mut &[u8]) -> Result<usize, CodecError> {
    Compact::<u32>::decode(input)
        .map(|c| c.0 as usize)
        .map_err(|e| decode_err(ty, e))
}

fn descend(ty: &TypeRef, depth: usize) -> Result<usize, CodecError> {
    if depth >= MAX_DEPTH {
        return Err(CodecError::TooDeep {
            ty: ty.to_string(),
            limit: MAX_DEPTH,
        });
    }
    Ok(depth + 1)
}

fn take<'a>(
    ty: &(impl ToString + ?Sized),
    input: &mut &'a [u8],
    n: usize,
) -> Result<&'a [u8], CodecError> {
    if input.len() < n {
        return Err(CodecError::Decode {
            ty: ty.to_string(),
            reason: format!("need {n} bytes, {} left", input.len()),
        });
    }
    let (head, rest) = input.split_at(n);
    *input = rest;
    Ok(head)
}

fn expect_bytes<'v>(
    ty: &(impl ToString + ?Sized),
    value: &'v ScaleValue,
) -> Result<&'v [u8], CodecError> {
    match value {
        ScaleValue::Bytes(b) => Ok(b),
        other => Err(mismatch(ty, "bytes", other)),
    }
}

fn expect_seq<'v>(
    ty: &(impl ToString + ?Sized),
    value: &'v ScaleValue,
) -> Result<&'v [ScaleValue], CodecError> {
    match value {
        ScaleValue::Seq(items) => Ok(items),
        other => Err(mismatch(ty, "sequence", other)),
    }
}

fn check_len(ty: &(impl ToString + ?Sized), expected: usize, got: usize) -> Result<(), CodecError> {
    if expected == got {
        Ok(())
    } else {
        Err(CodecError::LengthMismatch {
            ty: ty.to_string(),
            expected,
            got,
        })
    }
}

fn mismatch(ty: &(impl ToString + ?Sized), expected: &str, got: &ScaleValue) -> CodecError {
    CodecError::TypeMismatch {
        ty: ty.to_string(),
        expected: expected.to_string(),
        got: got.kind().to_string(),
    }
}

fn decode_err(ty: &(impl ToString + ?Sized), e: parity_scale_codec::Error) -> CodecError {
    CodecError::Decode {
        ty: ty.to_string(),
        reason: e.to_string(),
    }
}

fn bad_tag(ty: &(impl ToString + ?Sized), tag: u8) -> CodecError {
    CodecError::Decode {
        ty: ty.to_string(),
        reason: format!("invalid tag byte {tag}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;

    fn registry() -> TypeRegistry {
        let mut b = RegistryBuilder::new();
        b.primitive("Balance", PrimitiveKind::U128)
            .fixed_array("AccountId", "u8", 32)
            .alias("Pair", "(H256, u64)")
            .structure("Flags", &[("a", "bool"), ("b", "Option<bool>")]);
        b.build().unwrap()
    }

    #[test]
    fn compact_encoding_matches_scale() {
        let reg = registry();
        let codec = ScaleCodec::new(&reg);
        let ty: TypeRef = "Compact<Balance>".parse().unwrap();
        assert_eq!(codec.encode(&ty, &ScaleValue::Uint(1)).unwrap(), vec![0x04]);
        assert_eq!(codec.encode(&ty, &ScaleValue::Uint(64)).unwrap(), vec![0x01, 0x01]);
        assert_eq!(
            codec.encode(&ty, &ScaleValue::Uint(1_073_741_824)).unwrap(),
            vec![0x03, 0x00, 0x00, 0x00, 0x40]
        );
    }

    #[test]
    fn fixed_ints_are_little_endian() {
        let reg = registry();
        let codec = ScaleCodec::new(&reg);
        let ty: TypeRef = "u32".parse().unwrap();
        assert_eq!(
            codec.encode(&ty, &ScaleValue::Uint(0x0102_0304)).unwrap(),
            vec![0x04, 0x03, 0x02, 0x01]
        );
        assert!(matches!(
            codec.encode(&"u8".parse().unwrap(), &ScaleValue::Uint(256)),
            Err(CodecError::OutOfRange { .. })
        ));
    }

    #[test]
    fn option_bool_packs_into_one_byte() {
        let reg = registry();
        let codec = ScaleCodec::new(&reg);
        let v = ScaleValue::composite([
            ("a", ScaleValue::Bool(true)),
            ("b", ScaleValue::some(ScaleValue::Bool(false))),
        ]);
        let bytes = codec.encode_named("Flags", &v).unwrap();
        assert_eq!(bytes, vec![0x01, 0x02]);
        assert_eq!(codec.decode_named("Flags", &bytes).unwrap(), v);
    }

    #[test]
    fn byte_vectors_use_length_prefix() {
        let reg = registry();
        let codec = ScaleCodec::new(&reg);
        let bytes = codec
            .encode(&"Bytes".parse().unwrap(), &ScaleValue::Bytes(vec![0xaa, 0xbb]))
            .unwrap();
        assert_eq!(bytes, vec![0x08, 0xaa, 0xbb]);
    }

    #[test]
    fn composite_alias_decodes_as_tuple() {
        let reg = registry();
        let codec = ScaleCodec::new(&reg);
        let mut bytes = vec![0x11; 32];
        bytes.extend_from_slice(&7u64.to_le_bytes());
        let v = codec.decode_named("Pair", &bytes).unwrap();
        assert_eq!(
            v,
            ScaleValue::Seq(vec![ScaleValue::Bytes(vec![0x11; 32]), ScaleValue::Uint(7)])
        );
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        let reg = registry();
        let codec = ScaleCodec::new(&reg);
        assert!(matches!(
            codec.encode_named("AccountId", &ScaleValue::Bytes(vec![0; 31])),
            Err(CodecError::LengthMismatch { expected: 32, got: 31, .. })
        ));
        assert!(matches!(
            codec.encode_named("Flags", &ScaleValue::Uint(1)),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert!(matches!(
            codec.decode_named("AccountId", &[0; 33]),
            Err(CodecError::TrailingBytes { remaining: 1, .. })
        ));
        assert!(matches!(
            codec.decode_named("AccountId", &[0; 8]),
            Err(CodecError::Decode { .. })
        ));
    }

    fn linked_list() -> TypeRegistry {
        let mut b = RegistryBuilder::new();
        b.structure("List", &[("value", "u8"), ("next", "Option<List>")])
            .alias("Unit", "()");
        b.build().unwrap()
    }

    fn nested_list(levels: usize) -> ScaleValue {
        (0..levels).fold(ScaleValue::none(), |next, _| {
            ScaleValue::some(ScaleValue::composite([
                ("value", ScaleValue::Uint(7)),
                ("next", next),
            ]))
        })
    }

    #[test]
    fn recursive_types_within_depth_limit() {
        let reg = linked_list();
        let codec = ScaleCodec::new(&reg);
        let ty: TypeRef = "Option<List>".parse().unwrap();
        let v = nested_list(10);
        let bytes = codec.encode(&ty, &v).unwrap();
        assert_eq!(bytes.len(), 10 * 2 + 1);
        assert_eq!(codec.decode_all(&ty, &bytes).unwrap(), v);
    }

    #[test]
    fn deeply_nested_input_is_rejected() {
        let reg = linked_list();
        let codec = ScaleCodec::new(&reg);

        let mut bytes = [7u8, 1].repeat(MAX_DEPTH * 4);
        bytes.extend_from_slice(&[7, 0]);
        assert!(matches!(
            codec.decode_named("List", &bytes),
            Err(CodecError::TooDeep { limit: MAX_DEPTH, .. })
        ));

        let ty: TypeRef = "Option<List>".parse().unwrap();
        assert!(matches!(
            codec.encode(&ty, &nested_list(MAX_DEPTH * 4)),
            Err(CodecError::TooDeep { .. })
        ));
    }

    #[test]
    fn zero_sized_elements_cannot_outrun_input() {
        let reg = linked_list();
        let codec = ScaleCodec::new(&reg);
        let ty: TypeRef = "Vec<Unit>".parse().unwrap();

        let short = Compact(3u32).encode();
        assert_eq!(
            codec.decode_all(&ty, &short).unwrap(),
            ScaleValue::Seq(vec![ScaleValue::Seq(vec![]); 3])
        );

        let huge = Compact(5_000_000u32).encode();
        assert!(matches!(
            codec.decode_all(&ty, &huge),
            Err(CodecError::Decode { .. })
        ));

        let ty: TypeRef = "Vec<()>".parse().unwrap();
        let max = Compact(u32::MAX).encode();
        assert!(matches!(codec.decode_all(&ty, &max), Err(CodecError::Decode { .. })));
    }

    #[test]
    fn length_prefix_must_fit_u32() {
        let mut out = Vec::new();
        encode_len("Bytes", 1 << 20, &mut out).unwrap();
        assert_eq!(out, Compact(1u32 << 20).encode());

        #[cfg(target_pointer_width = "64")]
        {
            let too_long = u32::MAX as usize + 1;
            let err = encode_len("Bytes", too_long, &mut Vec::new()).unwrap_err();
            assert!(matches!(err, CodecError::OutOfRange { .. }), "{err}");
        }
    }
}
