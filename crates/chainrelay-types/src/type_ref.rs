//! Type references — how a field, variant payload or alias names its type.
//!
//! References are written in the familiar Rust-ish notation used by
//! Substrate type tables (`Compact<Balance>`, `Vec<Unbonding>`,
//! `(H256, u64)`, `[u8; 65]`) and parsed exactly once, when the registry is
//! built. Encode/decode only ever sees the parsed tree.

use std::fmt;
use std::str::FromStr;

use crate::error::RegistryError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A registry entry or a primitive, by name.
    Named(String),
    /// `Compact<T>` — SCALE compact integer encoding of `T`.
    Compact(Box<TypeRef>),
    /// `Vec<T>` — compact length prefix followed by the items.
    Vec(Box<TypeRef>),
    /// `Option<T>`.
    Option(Box<TypeRef>),
    /// `(A, B, ...)`; the empty tuple is the unit type.
    Tuple(Vec<TypeRef>),
    /// `[T; N]`.
    Array(Box<TypeRef>, usize),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn compact(inner: TypeRef) -> Self {
        Self::Compact(Box::new(inner))
    }

    pub fn vec(inner: TypeRef) -> Self {
        Self::Vec(Box::new(inner))
    }

    pub fn option(inner: TypeRef) -> Self {
        Self::Option(Box::new(inner))
    }

    pub fn array(inner: TypeRef, len: usize) -> Self {
        Self::Array(Box::new(inner), len)
    }

    /// Every name this reference mentions, outermost first.
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Named(n) => out.push(n),
            Self::Compact(inner) | Self::Vec(inner) | Self::Option(inner) => {
                inner.collect_names(out)
            }
            Self::Array(inner, _) => inner.collect_names(out),
            Self::Tuple(items) => items.iter().for_each(|i| i.collect_names(out)),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => f.write_str(n),
            Self::Compact(inner) => write!(f, "Compact<{inner}>"),
            Self::Vec(inner) => write!(f, "Vec<{inner}>"),
            Self::Option(inner) => write!(f, "Option<{inner}>"),
            Self::Array(inner, len) => write!(f, "[{inner}; {len}]"),
            Self::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

impl FromStr for TypeRef {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser { input: s, pos: 0 };
        let parsed = parser.parse_ref()?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(parsed)
    }
}

impl From<&str> for TypeRef {
    /// Shorthand for a bare name. Use [`str::parse`] for composite notation.
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, reason: &str) -> RegistryError {
        RegistryError::InvalidTypeRef {
            input: self.input.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn expect(&mut self, c: char) -> Result<(), RegistryError> {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{c}'")))
        }
    }

    fn ident(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn parse_ref(&mut self) -> Result<TypeRef, RegistryError> {
        self.skip_ws();
        match self.peek() {
            Some('(') => self.parse_tuple(),
            Some('[') => self.parse_array(),
            Some(_) => self.parse_named(),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_tuple(&mut self) -> Result<TypeRef, RegistryError> {
        self.expect('(')?;
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(')') {
            self.pos += 1;
            return Ok(TypeRef::Tuple(items));
        }
        loop {
            items.push(self.parse_ref()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    // tolerate a trailing comma: `(A, B,)`
                    self.skip_ws();
                    if self.peek() == Some(')') {
                        self.pos += 1;
                        break;
                    }
                }
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error("expected ',' or ')'")),
            }
        }
        Ok(TypeRef::Tuple(items))
    }

    fn parse_array(&mut self) -> Result<TypeRef, RegistryError> {
        self.expect('[')?;
        let elem = self.parse_ref()?;
        self.expect(';')?;
        self.skip_ws();
        let digits = self.ident();
        let len = digits
            .parse::<usize>()
            .map_err(|_| self.error("expected array length"))?;
        self.expect(']')?;
        Ok(TypeRef::array(elem, len))
    }

    fn parse_named(&mut self) -> Result<TypeRef, RegistryError> {
        let name = self.ident();
        if name.is_empty() {
            return Err(self.error("expected a type name"));
        }
        self.skip_ws();
        if self.peek() != Some('<') {
            return Ok(TypeRef::named(name));
        }
        self.pos += 1;
        let inner = self.parse_ref()?;
        self.expect('>')?;
        match name {
            "Compact" => Ok(TypeRef::compact(inner)),
            "Vec" => Ok(TypeRef::vec(inner)),
            "Option" => Ok(TypeRef::option(inner)),
            // `Box<T>` has no wire representation of its own.
            "Box" => Ok(inner),
            other => Err(self.error(&format!("unsupported generic '{other}'"))),
        }
    }
}
