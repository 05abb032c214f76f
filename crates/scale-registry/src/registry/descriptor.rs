// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for registry-described types.
//!
//! Descriptors own their inline children; references to other registered
//! types are by name and resolved lazily through the [`Registry`], so
//! mutually recursive types need no ownership tricks.
//!
//! [`Registry`]: crate::Registry

use crate::value::IntWidth;
use std::fmt;

/// Prefix of placeholder variants that reserve a discriminant slot.
pub const RESERVED_VARIANT_PREFIX: &str = "__Unused";

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
    /// Compact-length-prefixed UTF-8.
    Text,
    /// Compact-length-prefixed raw bytes.
    Bytes,
    /// `[u8; N]`, no prefix.
    FixedBytes(usize),
    /// Zero-sized.
    Null,
}

impl PrimitiveKind {
    /// Keyword lookup for type-spec identifiers.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => Self::Bool,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "u128" => Self::U128,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "i128" => Self::I128,
            "Text" | "String" | "Str" => Self::Text,
            "Bytes" => Self::Bytes,
            "Null" => Self::Null,
            _ => return None,
        };
        Some(kind)
    }

    /// Encoded size in bytes (None for length-prefixed kinds).
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Null => Some(0),
            Self::Bool | Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 => Some(4),
            Self::U64 | Self::I64 => Some(8),
            Self::U128 | Self::I128 => Some(16),
            Self::FixedBytes(n) => Some(*n),
            Self::Text | Self::Bytes => None,
        }
    }

    pub fn unsigned_width(&self) -> Option<IntWidth> {
        match self {
            Self::U8 => Some(IntWidth::W8),
            Self::U16 => Some(IntWidth::W16),
            Self::U32 => Some(IntWidth::W32),
            Self::U64 => Some(IntWidth::W64),
            Self::U128 => Some(IntWidth::W128),
            _ => None,
        }
    }

    pub fn signed_width(&self) -> Option<IntWidth> {
        match self {
            Self::I8 => Some(IntWidth::W8),
            Self::I16 => Some(IntWidth::W16),
            Self::I32 => Some(IntWidth::W32),
            Self::I64 => Some(IntWidth::W64),
            Self::I128 => Some(IntWidth::W128),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::Text => "Text",
            Self::Bytes => "Bytes",
            Self::Null => "Null",
            Self::FixedBytes(n) => return write!(f, "[u8;{}]", n),
        };
        f.write_str(name)
    }
}

/// Reference to a type: inline or by registered name.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Named(String),
    Inline(Box<TypeDescriptor>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn inline(desc: TypeDescriptor) -> Self {
        Self::Inline(Box::new(desc))
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Inline(_) => None,
        }
    }

    /// Registered names this reference mentions, inline children included.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Named(name) => out.push(name),
            Self::Inline(desc) => desc.collect_names(out),
        }
    }
}

impl From<PrimitiveKind> for TypeRef {
    fn from(kind: PrimitiveKind) -> Self {
        Self::inline(TypeDescriptor::Primitive(kind))
    }
}

impl From<TypeDescriptor> for TypeRef {
    fn from(desc: TypeDescriptor) -> Self {
        Self::inline(desc)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Inline(desc) => desc.fmt(f),
        }
    }
}

/// Field descriptor for struct members and struct-like variant payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Wire name (after `_alias` renaming).
    pub name: String,
    pub type_ref: TypeRef,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
        }
    }
}

/// Payload carried by an enum variant.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantPayload {
    Unit,
    Single(TypeRef),
    Struct(Vec<FieldDescriptor>),
    Tuple(Vec<TypeRef>),
}

/// Enum variant.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    pub name: String,
    /// One-byte discriminant.
    pub index: u8,
    pub payload: VariantPayload,
}

impl EnumVariant {
    pub fn new(name: impl Into<String>, index: u8, payload: VariantPayload) -> Self {
        Self {
            name: name.into(),
            index,
            payload,
        }
    }

    /// Placeholder that holds a discriminant slot but is never valid on the wire.
    ///
    /// Only `__Unused` followed by one or more ASCII digits counts.
    pub fn is_reserved(&self) -> bool {
        self.name
            .strip_prefix(RESERVED_VARIANT_PREFIX)
            .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
    }
}

/// Enumeration type descriptor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumDescriptor {
    /// Variants in declaration order, placeholders included.
    pub variants: Vec<EnumVariant>,
}

impl EnumDescriptor {
    pub fn new(variants: Vec<EnumVariant>) -> Self {
        Self { variants }
    }

    /// Constructible variant by name.
    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants
            .iter()
            .find(|v| v.name == name && !v.is_reserved())
    }

    /// Constructible variant by discriminant.
    pub fn variant_by_index(&self, index: u8) -> Option<&EnumVariant> {
        self.variants
            .iter()
            .find(|v| v.index == index && !v.is_reserved())
    }

    /// Names of variants that can appear on the wire.
    pub fn constructible(&self) -> impl Iterator<Item = &EnumVariant> {
        self.variants.iter().filter(|v| !v.is_reserved())
    }
}

/// A type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    /// Named fields, encoded in declaration order.
    Struct(Vec<FieldDescriptor>),
    /// Tagged union with one-byte discriminant.
    Enum(EnumDescriptor),
    /// Compact length prefix, then elements.
    Sequence(TypeRef),
    /// Exactly N elements, no prefix.
    FixedArray(TypeRef, usize),
    Tuple(Vec<TypeRef>),
    Option(TypeRef),
    Result(TypeRef, TypeRef),
    /// Compact-encoded unsigned integer.
    Compact(TypeRef),
    /// Same encoding as the target.
    Alias(TypeRef),
    /// Compact byte length, then the inner type's encoding.
    Opaque(TypeRef),
}

impl TypeDescriptor {
    pub fn struct_type(fields: Vec<FieldDescriptor>) -> Self {
        Self::Struct(fields)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }

    /// Fields if this is a struct.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match self {
            Self::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Registered names this descriptor mentions, inline children included.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Primitive(_) => {}
            Self::Struct(fields) => fields.iter().for_each(|f| f.type_ref.collect_names(out)),
            Self::Enum(e) => {
                for variant in &e.variants {
                    match &variant.payload {
                        VariantPayload::Unit => {}
                        VariantPayload::Single(r) => r.collect_names(out),
                        VariantPayload::Struct(fields) => {
                            fields.iter().for_each(|f| f.type_ref.collect_names(out))
                        }
                        VariantPayload::Tuple(refs) => {
                            refs.iter().for_each(|r| r.collect_names(out))
                        }
                    }
                }
            }
            Self::Tuple(refs) => refs.iter().for_each(|r| r.collect_names(out)),
            Self::Result(ok, err) => {
                ok.collect_names(out);
                err.collect_names(out);
            }
            Self::Sequence(r)
            | Self::FixedArray(r, _)
            | Self::Option(r)
            | Self::Compact(r)
            | Self::Alias(r)
            | Self::Opaque(r) => r.collect_names(out),
        }
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[FieldDescriptor]) -> fmt::Result {
    f.write_str("{")?;
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: {}", field.name, field.type_ref)?;
    }
    f.write_str("}")
}

fn write_tuple(f: &mut fmt::Formatter<'_>, refs: &[TypeRef]) -> fmt::Result {
    f.write_str("(")?;
    for (i, r) in refs.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", r)?;
    }
    f.write_str(")")
}

/// Renders in type-spec syntax (`Vec<u8>`, `(u32,Bytes)`, `Option<H256>`).
impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => p.fmt(f),
            Self::Struct(fields) => write_fields(f, fields),
            Self::Enum(e) => {
                f.write_str("enum {")?;
                for (i, variant) in e.variants.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(&variant.name)?;
                    match &variant.payload {
                        VariantPayload::Unit => {}
                        VariantPayload::Single(r) => write!(f, "({})", r)?,
                        VariantPayload::Struct(fields) => {
                            f.write_str(" ")?;
                            write_fields(f, fields)?;
                        }
                        VariantPayload::Tuple(refs) => write_tuple(f, refs)?,
                    }
                }
                f.write_str("}")
            }
            Self::Sequence(r) => write!(f, "Vec<{}>", r),
            Self::FixedArray(r, n) => write!(f, "[{};{}]", r, n),
            Self::Tuple(refs) => write_tuple(f, refs),
            Self::Option(r) => write!(f, "Option<{}>", r),
            Self::Result(ok, err) => write!(f, "Result<{},{}>", ok, err),
            Self::Compact(r) => write!(f, "Compact<{}>", r),
            Self::Alias(r) => r.fmt(f),
            Self::Opaque(r) => write!(f, "WrapperKeepOpaque<{}>", r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_size() {
        assert_eq!(PrimitiveKind::Bool.size(), Some(1));
        assert_eq!(PrimitiveKind::U128.size(), Some(16));
        assert_eq!(PrimitiveKind::FixedBytes(32).size(), Some(32));
        assert_eq!(PrimitiveKind::Null.size(), Some(0));
        assert_eq!(PrimitiveKind::Text.size(), None);
    }

    #[test]
    fn test_primitive_keywords() {
        assert_eq!(PrimitiveKind::from_name("u32"), Some(PrimitiveKind::U32));
        assert_eq!(PrimitiveKind::from_name("String"), Some(PrimitiveKind::Text));
        assert_eq!(PrimitiveKind::from_name("H256"), None);
        assert_eq!(PrimitiveKind::U64.unsigned_width(), Some(IntWidth::W64));
        assert_eq!(PrimitiveKind::I64.unsigned_width(), None);
        assert_eq!(PrimitiveKind::I8.signed_width(), Some(IntWidth::W8));
    }

    #[test]
    fn test_struct_descriptor() {
        let desc = TypeDescriptor::struct_type(vec![
            FieldDescriptor::new("x", PrimitiveKind::U32),
            FieldDescriptor::new("y", TypeRef::named("Point")),
        ]);
        assert!(desc.is_struct());
        assert_eq!(desc.fields().map(<[FieldDescriptor]>::len), Some(2));
        assert!(desc.field("x").is_some());
        assert!(desc.field("z").is_none());
        assert_eq!(desc.referenced_names(), ["Point"]);
    }

    #[test]
    fn test_enum_reserved_slots() {
        let desc = EnumDescriptor::new(vec![
            EnumVariant::new("Other", 0, VariantPayload::Single(PrimitiveKind::Bytes.into())),
            EnumVariant::new("__Unused1", 1, VariantPayload::Unit),
            EnumVariant::new("Seal", 2, VariantPayload::Unit),
        ]);
        assert!(desc.variant_by_index(1).is_none());
        assert!(desc.variant("__Unused1").is_none());
        assert_eq!(desc.variant_by_index(2).map(|v| v.name.as_str()), Some("Seal"));
        assert_eq!(desc.constructible().count(), 2);
        assert_eq!(desc.variants.len(), 3);
    }

    #[test]
    fn test_reserved_name_needs_digits() {
        let reserved = |name: &str| EnumVariant::new(name, 0, VariantPayload::Unit).is_reserved();
        assert!(reserved("__Unused7"));
        assert!(reserved("__Unused120"));
        assert!(!reserved("__Unused"));
        assert!(!reserved("__UnusedFoo"));
        assert!(!reserved("__Unused3a"));

        let desc = EnumDescriptor::new(vec![
            EnumVariant::new("__UnusedFoo", 0, VariantPayload::Unit),
            EnumVariant::new("__Unused1", 1, VariantPayload::Unit),
        ]);
        assert_eq!(desc.variant_by_index(0).map(|v| v.name.as_str()), Some("__UnusedFoo"));
        assert!(desc.variant_by_index(1).is_none());
        assert_eq!(desc.constructible().count(), 1);
    }

    #[test]
    fn test_display_round_trips_syntax() {
        let desc = TypeDescriptor::Sequence(TypeRef::inline(TypeDescriptor::Tuple(vec![
            TypeRef::inline(TypeDescriptor::Compact(PrimitiveKind::U32.into())),
            PrimitiveKind::FixedBytes(4).into(),
            TypeRef::named("Bytes2"),
        ])));
        assert_eq!(desc.to_string(), "Vec<(Compact<u32>,[u8;4],Bytes2)>");

        let e = TypeDescriptor::Enum(EnumDescriptor::new(vec![
            EnumVariant::new("Off", 0, VariantPayload::Unit),
            EnumVariant::new(
                "Set",
                1,
                VariantPayload::Struct(vec![FieldDescriptor::new("level", PrimitiveKind::U8)]),
            ),
        ]));
        assert_eq!(e.to_string(), "enum {Off, Set {level: u8}}");
    }
}
