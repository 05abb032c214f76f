// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoded values.
//!
//! [`Value`] mirrors the descriptor shapes at the value level. A decode call
//! produces a fresh owned tree; encode consumes one by reference.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// Bit width of an integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    W128,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            Self::W8 => 8,
            Self::W16 => 16,
            Self::W32 => 32,
            Self::W64 => 64,
            Self::W128 => 128,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// Largest unsigned value of this width.
    pub fn max_unsigned(self) -> u128 {
        u128::MAX >> (128 - self.bits())
    }

    /// Smallest signed value of this width.
    pub fn min_signed(self) -> i128 {
        i128::MIN >> (128 - self.bits())
    }

    /// Largest signed value of this width.
    pub fn max_signed(self) -> i128 {
        i128::MAX >> (128 - self.bits())
    }
}

/// A value that can hold any registry-described type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `Null` primitive, unit enum payload.
    Null,
    Bool(bool),
    UInt(IntWidth, u128),
    Int(IntWidth, i128),
    Text(String),
    /// `Bytes`, `Vec<u8>` and fixed `[u8; N]`.
    Bytes(Vec<u8>),
    /// Named fields in declaration order.
    Struct(IndexMap<String, Value>),
    /// (variant name, payload)
    Enum(String, Box<Value>),
    Sequence(Vec<Value>),
    Tuple(Vec<Value>),
    Option(Option<Box<Value>>),
    Result(Result<Box<Value>, Box<Value>>),
}

impl Value {
    pub fn u8(v: u8) -> Self {
        Self::UInt(IntWidth::W8, u128::from(v))
    }

    pub fn u16(v: u16) -> Self {
        Self::UInt(IntWidth::W16, u128::from(v))
    }

    pub fn u32(v: u32) -> Self {
        Self::UInt(IntWidth::W32, u128::from(v))
    }

    pub fn u64(v: u64) -> Self {
        Self::UInt(IntWidth::W64, u128::from(v))
    }

    pub fn u128(v: u128) -> Self {
        Self::UInt(IntWidth::W128, v)
    }

    pub fn i32(v: i32) -> Self {
        Self::Int(IntWidth::W32, i128::from(v))
    }

    pub fn i64(v: i64) -> Self {
        Self::Int(IntWidth::W64, i128::from(v))
    }

    pub fn i128(v: i128) -> Self {
        Self::Int(IntWidth::W128, v)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(b.into())
    }

    /// Struct from (name, value) pairs, keeping their order.
    pub fn structure<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Enum variant without payload.
    pub fn unit_variant(name: impl Into<String>) -> Self {
        Self::Enum(name.into(), Box::new(Self::Null))
    }

    /// Enum variant with a payload.
    pub fn variant(name: impl Into<String>, payload: Value) -> Self {
        Self::Enum(name.into(), Box::new(payload))
    }

    pub fn some(v: Value) -> Self {
        Self::Option(Some(Box::new(v)))
    }

    pub fn none() -> Self {
        Self::Option(None)
    }

    pub fn ok(v: Value) -> Self {
        Self::Result(Ok(Box::new(v)))
    }

    pub fn err(v: Value) -> Self {
        Self::Result(Err(Box::new(v)))
    }

    /// Short shape name used in mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::UInt(..) => "unsigned integer",
            Self::Int(..) => "signed integer",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Struct(_) => "struct",
            Self::Enum(..) => "enum",
            Self::Sequence(_) => "sequence",
            Self::Tuple(_) => "tuple",
            Self::Option(_) => "option",
            Self::Result(_) => "result",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Self::UInt(_, v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Int(_, v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Elements of a sequence or tuple.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(v) | Self::Tuple(v) => Some(v),
            _ => None,
        }
    }

    /// Struct field by name.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Variant name and payload of an enum value.
    pub fn as_variant(&self) -> Option<(&str, &Value)> {
        match self {
            Self::Enum(name, payload) => Some((name, payload)),
            _ => None,
        }
    }
}

macro_rules! impl_from_unsigned {
    ($ty:ty, $width:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::UInt(IntWidth::$width, u128::from(v))
            }
        }
    };
}

macro_rules! impl_from_signed {
    ($ty:ty, $width:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::Int(IntWidth::$width, i128::from(v))
            }
        }
    };
}

impl_from_unsigned!(u8, W8);
impl_from_unsigned!(u16, W16);
impl_from_unsigned!(u32, W32);
impl_from_unsigned!(u64, W64);
impl_from_unsigned!(u128, W128);
impl_from_signed!(i8, W8);
impl_from_signed!(i16, W16);
impl_from_signed!(i32, W32);
impl_from_signed!(i64, W64);
impl_from_signed!(i128, W128);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        Value::Option(v.map(|inner| Box::new(inner.into())))
    }
}

/// JSON-friendly rendering.
///
/// Integers wider than 64 bits become decimal strings, bytes become
/// `0x`-prefixed hex, unit variants become their name and payload variants
/// a single-key map.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::UInt(_, v) => match u64::try_from(*v) {
                Ok(small) => serializer.serialize_u64(small),
                Err(_) => serializer.serialize_str(&v.to_string()),
            },
            Self::Int(_, v) => match i64::try_from(*v) {
                Ok(small) => serializer.serialize_i64(small),
                Err(_) => serializer.serialize_str(&v.to_string()),
            },
            Self::Text(s) => serializer.serialize_str(s),
            Self::Bytes(b) => serializer.serialize_str(&format!("0x{}", hex::encode(b))),
            Self::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Self::Enum(name, payload) if payload.is_null() => serializer.serialize_str(name),
            Self::Enum(name, payload) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, payload.as_ref())?;
                map.end()
            }
            Self::Sequence(items) | Self::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Option(None) => serializer.serialize_none(),
            Self::Option(Some(inner)) => serializer.serialize_some(inner.as_ref()),
            Self::Result(result) => {
                let mut map = serializer.serialize_map(Some(1))?;
                match result {
                    Ok(v) => map.serialize_entry("Ok", v.as_ref())?,
                    Err(e) => map.serialize_entry("Err", e.as_ref())?,
                }
                map.end()
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}
