//! Type descriptors — the closed set of shapes a registry entry can take.

use std::fmt;

use crate::primitive::PrimitiveKind;
use crate::type_ref::TypeRef;

/// A named entry in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: String,
    pub shape: TypeShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// Direct synonym; adds no wire distinction.
    Alias(TypeRef),
    /// Fixed, ordered record. Order is part of the wire format.
    Struct(Vec<Field>),
    /// Tagged union, tag = [`Variant::index`].
    Enum(Vec<Variant>),
    FixedArray { element: TypeRef, len: usize },
    Primitive(PrimitiveKind),
}

impl TypeShape {
    /// Short lowercase label, used in error messages and the CLI table.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Alias(_) => "alias",
            Self::Struct(_) => "struct",
            Self::Enum(_) => "enum",
            Self::FixedArray { .. } => "array",
            Self::Primitive(_) => "primitive",
        }
    }

    /// Every type reference this shape depends on, in declaration order.
    pub fn references(&self) -> Vec<&TypeRef> {
        match self {
            Self::Alias(target) => vec![target],
            Self::Struct(fields) => fields.iter().map(|f| &f.ty).collect(),
            Self::Enum(variants) => variants.iter().filter_map(|v| v.payload.as_ref()).collect(),
            Self::FixedArray { element, .. } => vec![element],
            Self::Primitive(_) => vec![],
        }
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alias(target) => write!(f, "{target}"),
            Self::Primitive(kind) => write!(f, "{kind}"),
            Self::FixedArray { element, len } => write!(f, "[{element}; {len}]"),
            Self::Struct(fields) => {
                let parts: Vec<_> = fields.iter().map(|x| format!("{}: {}", x.name, x.ty)).collect();
                write!(f, "{{ {} }}", parts.join(", "))
            }
            Self::Enum(variants) => {
                let parts: Vec<_> = variants
                    .iter()
                    .map(|v| match &v.payload {
                        Some(p) => format!("{}({p})", v.name),
                        None => v.name.clone(),
                    })
                    .collect();
                write!(f, "{}", parts.join(" | "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    /// `None` for unit variants.
    pub payload: Option<TypeRef>,
    /// Wire tag. Positional unless the chain declares it explicitly.
    pub index: u8,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// Returns the variant list if this is an enum.
    pub fn variants(&self) -> Option<&[Variant]> {
        match &self.shape {
            TypeShape::Enum(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the field list if this is a struct.
    pub fn fields(&self) -> Option<&[Field]> {
        match &self.shape {
            TypeShape::Struct(f) => Some(f),
            _ => None,
        }
    }
}
