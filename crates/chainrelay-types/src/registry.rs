//! The type registry and its builder.
//!
//! A [`TypeRegistry`] can only be obtained from [`RegistryBuilder::build`],
//! which runs [`TypeRegistry::validate`] before handing the table out. Once
//! built the registry is immutable; share it as `Arc<TypeRegistry>`.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::descriptor::{Field, TypeDescriptor, TypeShape, Variant};
use crate::error::RegistryError;
use crate::primitive::PrimitiveKind;
use crate::type_ref::TypeRef;

/// What a name resolves to once aliases have been followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a> {
    Primitive(PrimitiveKind),
    /// A struct, enum or fixed array descriptor.
    Shape(&'a TypeDescriptor),
    /// An alias whose target is a composite reference, e.g. `(H256, u64)`.
    Ref(&'a TypeRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Registry names whose encoding is always embedded in a value of type `r`.
fn contained_names<'a>(r: &'a TypeRef, out: &mut Vec<&'a str>) {
    match r {
        TypeRef::Named(n) => out.push(n.as_str()),
        TypeRef::Tuple(items) => items.iter().for_each(|i| contained_names(i, out)),
        TypeRef::Array(inner, len) if *len > 0 => contained_names(inner, out),
        TypeRef::Array(..) | TypeRef::Vec(_) | TypeRef::Option(_) | TypeRef::Compact(_) => {}
    }
}

/// Immutable, validated table of wire types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRegistry {
    // IndexMap keeps declaration order — needed for export and stable listings.
    types: IndexMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Look up a descriptor by name.
    pub fn resolve(&self, name: &str) -> Result<&TypeDescriptor, RegistryError> {
        self.types.get(name).ok_or_else(|| RegistryError::UnknownType {
            name: name.to_string(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Returns `true` if `name` is a registry entry or a primitive.
    pub fn is_known(&self, name: &str) -> bool {
        self.types.contains_key(name) || PrimitiveKind::from_name(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Follow aliases from `name` to the first concrete shape.
    ///
    /// Registry entries shadow primitives of the same name.
    pub fn resolve_concrete(&self, name: &str) -> Result<Resolved<'_>, RegistryError> {
        let mut current = name;
        // An acyclic chain visits each entry at most once.
        for _ in 0..=self.types.len() {
            let Some(desc) = self.types.get(current) else {
                return PrimitiveKind::from_name(current)
                    .map(Resolved::Primitive)
                    .ok_or_else(|| RegistryError::UnknownType {
                        name: current.to_string(),
                    });
            };
            match &desc.shape {
                TypeShape::Alias(TypeRef::Named(target)) => current = target,
                TypeShape::Alias(other) => return Ok(Resolved::Ref(other)),
                TypeShape::Primitive(kind) => return Ok(Resolved::Primitive(*kind)),
                _ => return Ok(Resolved::Shape(desc)),
            }
        }
        Err(RegistryError::CyclicAlias {
            name: name.to_string(),
        })
    }

    /// Wire tag of `variant` inside enum `enum_name`.
    pub fn variant_index(&self, enum_name: &str, variant: &str) -> Result<u8, RegistryError> {
        let desc = match self.resolve_concrete(enum_name)? {
            Resolved::Shape(desc) => desc,
            _ => {
                return Err(RegistryError::UnknownType {
                    name: format!("{enum_name}::{variant}"),
                })
            }
        };
        desc.variants()
            .and_then(|vs| vs.iter().find(|v| v.name == variant))
            .map(|v| v.index)
            .ok_or_else(|| RegistryError::UnknownType {
                name: format!("{enum_name}::{variant}"),
            })
    }

    /// Check every reference in the table.
    ///
    /// Fails on the first dangling reference, alias cycle, non-integer
    /// `Compact<_>`, repeated field or variant name, or duplicate variant
    /// index, in declaration order. A type that contains itself without an
    /// `Option`, `Vec`, `Compact` or enum in between is rejected last.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for desc in self.types.values() {
            for r in desc.shape.references() {
                self.validate_ref(&desc.name, r)?;
            }
            match &desc.shape {
                TypeShape::Alias(_) => {
                    self.resolve_concrete(&desc.name)?;
                }
                TypeShape::Struct(fields) => {
                    let mut names = HashSet::with_capacity(fields.len());
                    if let Some(f) = fields.iter().find(|f| !names.insert(f.name.as_str())) {
                        return Err(RegistryError::DuplicateField {
                            name: desc.name.clone(),
                            field: f.name.clone(),
                        });
                    }
                }
                TypeShape::Enum(variants) => {
                    if variants.len() > 256 {
                        return Err(RegistryError::TooManyVariants {
                            name: desc.name.clone(),
                        });
                    }
                    let mut names = HashSet::with_capacity(variants.len());
                    if let Some(v) = variants.iter().find(|v| !names.insert(v.name.as_str())) {
                        return Err(RegistryError::DuplicateVariant {
                            name: desc.name.clone(),
                            variant: v.name.clone(),
                        });
                    }
                    let mut seen = [false; 256];
                    for v in variants {
                        if std::mem::replace(&mut seen[v.index as usize], true) {
                            return Err(RegistryError::DuplicateVariantIndex {
                                name: desc.name.clone(),
                                index: v.index,
                            });
                        }
                    }
                }
                _ => {}
            }
        }
        let mut marks = vec![Mark::Unvisited; self.types.len()];
        (0..self.types.len()).try_for_each(|i| self.check_finite(i, &mut marks))
    }

    /// Depth-first walk over direct containment. Reaching an entry that is
    /// still on the stack means it contains itself.
    fn check_finite(&self, index: usize, marks: &mut [Mark]) -> Result<(), RegistryError> {
        let Some((name, desc)) = self.types.get_index(index) else {
            return Ok(());
        };
        match marks[index] {
            Mark::Done => return Ok(()),
            Mark::OnStack => {
                return Err(RegistryError::InfinitelySized { name: name.clone() });
            }
            Mark::Unvisited => marks[index] = Mark::OnStack,
        }

        let mut contained = Vec::new();
        match &desc.shape {
            TypeShape::Struct(fields) => {
                for f in fields {
                    contained_names(&f.ty, &mut contained);
                }
            }
            TypeShape::FixedArray { element, len } if *len > 0 => {
                contained_names(element, &mut contained);
            }
            TypeShape::Alias(target) => contained_names(target, &mut contained),
            _ => {}
        }
        for child in contained {
            if let Some(next) = self.types.get_index_of(child) {
                self.check_finite(next, marks)?;
            }
        }

        marks[index] = Mark::Done;
        Ok(())
    }

    fn validate_ref(&self, owner: &str, r: &TypeRef) -> Result<(), RegistryError> {
        match r {
            TypeRef::Named(n) => {
                if self.is_known(n) {
                    Ok(())
                } else {
                    Err(RegistryError::DanglingReference {
                        name: owner.to_string(),
                        reference: n.clone(),
                    })
                }
            }
            TypeRef::Compact(inner) => {
                self.validate_ref(owner, inner)?;
                match self.primitive_of(inner) {
                    Some(kind) if kind.is_compactable() => Ok(()),
                    _ => Err(RegistryError::InvalidCompact {
                        name: owner.to_string(),
                        reference: inner.to_string(),
                    }),
                }
            }
            TypeRef::Vec(inner) | TypeRef::Option(inner) | TypeRef::Array(inner, _) => {
                self.validate_ref(owner, inner)
            }
            TypeRef::Tuple(items) => items.iter().try_for_each(|i| self.validate_ref(owner, i)),
        }
    }

    /// The primitive a reference ultimately denotes, if any.
    pub fn primitive_of(&self, r: &TypeRef) -> Option<PrimitiveKind> {
        let mut current = r;
        for _ in 0..=self.types.len() {
            match current {
                TypeRef::Named(n) => match self.resolve_concrete(n).ok()? {
                    Resolved::Primitive(kind) => return Some(kind),
                    Resolved::Ref(next) => current = next,
                    Resolved::Shape(_) => return None,
                },
                _ => return None,
            }
        }
        None
    }

    /// Export the table in the JSON layout Substrate JS tooling expects:
    /// aliases and arrays as strings, structs as `{field: type}` objects and
    /// enums as `{"_enum": {variant: payload | null}}`, in declaration order.
    pub fn to_type_definitions(&self) -> Value {
        let mut out = Map::new();
        for desc in self.types.values() {
            let value = match &desc.shape {
                TypeShape::Alias(target) => Value::String(target.to_string()),
                TypeShape::Primitive(kind) => Value::String(kind.name().to_string()),
                TypeShape::FixedArray { element, len } => Value::String(format!("[{element}; {len}]")),
                TypeShape::Struct(fields) => Value::Object(
                    fields
                        .iter()
                        .map(|f| (f.name.clone(), Value::String(f.ty.to_string())))
                        .collect(),
                ),
                TypeShape::Enum(variants) => {
                    let body: Map<String, Value> = variants
                        .iter()
                        .map(|v| {
                            let payload = v
                                .payload
                                .as_ref()
                                .map_or(Value::Null, |p| Value::String(p.to_string()));
                            (v.name.clone(), payload)
                        })
                        .collect();
                    let mut wrapper = Map::new();
                    wrapper.insert("_enum".into(), Value::Object(body));
                    Value::Object(wrapper)
                }
            };
            out.insert(desc.name.clone(), value);
        }
        Value::Object(out)
    }
}

/// Declarative builder for a [`TypeRegistry`].
///
/// Parse errors and duplicate names are collected and reported by
/// [`RegistryBuilder::build`], so tables can be written as one long chain.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: IndexMap<String, TypeDescriptor>,
    errors: Vec<RegistryError>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed descriptor.
    pub fn insert(&mut self, desc: TypeDescriptor) -> &mut Self {
        if self.types.contains_key(&desc.name) {
            self.errors.push(RegistryError::DuplicateType { name: desc.name });
        } else {
            self.types.insert(desc.name.clone(), desc);
        }
        self
    }

    fn parse(&mut self, s: &str) -> Option<TypeRef> {
        match s.parse() {
            Ok(r) => Some(r),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    pub fn primitive(&mut self, name: &str, kind: PrimitiveKind) -> &mut Self {
        self.insert(TypeDescriptor::new(name, TypeShape::Primitive(kind)))
    }

    pub fn alias(&mut self, name: &str, target: &str) -> &mut Self {
        match self.parse(target) {
            Some(r) => self.insert(TypeDescriptor::new(name, TypeShape::Alias(r))),
            None => self,
        }
    }

    pub fn fixed_array(&mut self, name: &str, element: &str, len: usize) -> &mut Self {
        match self.parse(element) {
            Some(element) => {
                self.insert(TypeDescriptor::new(name, TypeShape::FixedArray { element, len }))
            }
            None => self,
        }
    }

    /// `fields` in wire order.
    pub fn structure(&mut self, name: &str, fields: &[(&str, &str)]) -> &mut Self {
        let mut parsed = Vec::with_capacity(fields.len());
        for (field, ty) in fields {
            match self.parse(ty) {
                Some(ty) => parsed.push(Field::new(*field, ty)),
                None => return self,
            }
        }
        self.insert(TypeDescriptor::new(name, TypeShape::Struct(parsed)))
    }

    /// Enum with positional indices: the n-th variant is tagged `n`.
    pub fn enumeration(&mut self, name: &str, variants: &[(&str, Option<&str>)]) -> &mut Self {
        if variants.len() > 256 {
            self.errors.push(RegistryError::TooManyVariants {
                name: name.to_string(),
            });
            return self;
        }
        let indexed: Vec<_> = variants
            .iter()
            .enumerate()
            .map(|(i, (v, p))| (*v, *p, i as u8))
            .collect();
        self.indexed_enumeration(name, &indexed)
    }

    /// Enum whose chain declares explicit variant indices.
    pub fn indexed_enumeration(
        &mut self,
        name: &str,
        variants: &[(&str, Option<&str>, u8)],
    ) -> &mut Self {
        let mut parsed = Vec::with_capacity(variants.len());
        for (variant, payload, index) in variants {
            let payload = match payload {
                Some(p) => match self.parse(p) {
                    Some(r) => Some(r),
                    None => return self,
                },
                None => None,
            };
            parsed.push(Variant {
                name: variant.to_string(),
                payload,
                index: *index,
            });
        }
        self.insert(TypeDescriptor::new(name, TypeShape::Enum(parsed)))
    }

    /// Validate and freeze the table.
    pub fn build(self) -> Result<TypeRegistry, RegistryError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        let registry = TypeRegistry { types: self.types };
        registry.validate()?;
        Ok(registry)
    }
}
