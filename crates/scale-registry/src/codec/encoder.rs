// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::Label;
use crate::compact::encode_compact_to;
use crate::error::{CodecError, Result};
use crate::registry::descriptor::{
    FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeRef, VariantPayload,
};
use crate::registry::Registry;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt::{self, Write};

#[derive(Debug, Clone, Copy)]
enum Segment<'a> {
    Field(&'a str),
    Index(usize),
    Variant(&'a str),
}

/// SCALE encoder over a registry; tracks the value path for errors.
pub(super) struct Encoder<'a, 'o> {
    registry: &'a Registry,
    out: &'o mut Vec<u8>,
    root: &'a str,
    path: Vec<Segment<'a>>,
    depth: usize,
}

/// Mismatch description of a value ("unsigned integer 300", "text").
fn describe(value: &Value) -> String {
    match value {
        Value::UInt(_, v) => format!("unsigned integer {}", v),
        Value::Int(_, v) => format!("signed integer {}", v),
        Value::Bytes(b) => format!("{} bytes", b.len()),
        Value::Sequence(items) | Value::Tuple(items) => {
            format!("{} with {} elements", value.kind_name(), items.len())
        }
        Value::Enum(name, _) => format!("variant {}", name),
        other => other.kind_name().to_string(),
    }
}

/// Non-negative integer value, whatever its signedness.
fn unsigned_of(value: &Value) -> Option<u128> {
    match value {
        Value::UInt(_, v) => Some(*v),
        Value::Int(_, v) => u128::try_from(*v).ok(),
        _ => None,
    }
}

fn signed_of(value: &Value) -> Option<i128> {
    match value {
        Value::Int(_, v) => Some(*v),
        Value::UInt(_, v) => i128::try_from(*v).ok(),
        _ => None,
    }
}

impl<'a, 'o> Encoder<'a, 'o> {
    pub(super) fn new(registry: &'a Registry, out: &'o mut Vec<u8>, root: &'a str) -> Self {
        Self {
            registry,
            out,
            root,
            path: Vec::new(),
            depth: 0,
        }
    }

    fn path(&self) -> String {
        let mut path = self.root.to_string();
        for segment in &self.path {
            // Writing into a String cannot fail.
            let _ = match segment {
                Segment::Field(name) => write!(path, ".{}", name),
                Segment::Index(i) => write!(path, "[{}]", i),
                Segment::Variant(name) => write!(path, "::{}", name),
            };
        }
        path
    }

    fn mismatch(&self, expected: impl fmt::Display, value: &Value) -> CodecError {
        CodecError::TypeMismatch {
            path: self.path(),
            expected: expected.to_string(),
            found: describe(value),
        }
    }

    fn nested<T>(
        &mut self,
        segment: Segment<'a>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    pub(super) fn encode_ref(&mut self, r: &'a TypeRef, value: &'a Value) -> Result<()> {
        let registry = self.registry;
        let desc = registry.resolve(r)?;
        let label = Label::of(r);
        if self.depth >= self.registry.max_depth() {
            return Err(CodecError::DepthLimit {
                type_name: label.to_string(),
                limit: self.registry.max_depth(),
            });
        }
        self.depth += 1;
        let result = self.encode_desc(desc, label, value);
        self.depth -= 1;
        result
    }

    fn encode_desc(
        &mut self,
        desc: &'a TypeDescriptor,
        label: Label<'a>,
        value: &'a Value,
    ) -> Result<()> {
        match desc {
            TypeDescriptor::Primitive(kind) => self.encode_primitive(*kind, label, value),
            TypeDescriptor::Struct(fields) => match value {
                Value::Struct(map) => self.encode_fields(fields, map, label),
                _ => Err(self.mismatch(label, value)),
            },
            TypeDescriptor::Enum(e) => {
                let Value::Enum(name, payload) = value else {
                    return Err(self.mismatch(label, value));
                };
                let variant = e.variant(name).ok_or_else(|| CodecError::UnknownVariant {
                    type_name: label.to_string(),
                    variant: name.clone(),
                    offset: None,
                })?;
                self.out.push(variant.index);
                self.nested(Segment::Variant(&variant.name), |enc| {
                    enc.encode_payload(&variant.payload, payload)
                })
            }
            TypeDescriptor::Sequence(elem) => {
                let Value::Sequence(items) = value else {
                    return Err(self.mismatch(label, value));
                };
                encode_compact_to(items.len() as u128, self.out);
                self.encode_items(elem, items)
            }
            TypeDescriptor::FixedArray(elem, len) => match value {
                Value::Sequence(items) if items.len() == *len => self.encode_items(elem, items),
                _ => Err(self.mismatch(label, value)),
            },
            TypeDescriptor::Tuple(elems) => match value.as_sequence() {
                Some(items) if items.len() == elems.len() => self.encode_tuple(elems, items),
                _ => Err(self.mismatch(label, value)),
            },
            TypeDescriptor::Option(inner) => match value {
                Value::Option(None) => {
                    self.out.push(0);
                    Ok(())
                }
                Value::Option(Some(v)) => {
                    self.out.push(1);
                    self.encode_ref(inner, v)
                }
                _ => Err(self.mismatch(label, value)),
            },
            TypeDescriptor::Result(ok, err) => match value {
                Value::Result(Ok(v)) => {
                    self.out.push(0);
                    self.nested(Segment::Variant("Ok"), |enc| enc.encode_ref(ok, v))
                }
                Value::Result(Err(v)) => {
                    self.out.push(1);
                    self.nested(Segment::Variant("Err"), |enc| enc.encode_ref(err, v))
                }
                _ => Err(self.mismatch(label, value)),
            },
            TypeDescriptor::Compact(inner) => {
                let width = self.registry.compact_width(inner)?;
                match unsigned_of(value) {
                    Some(v) if v <= width.max_unsigned() => {
                        encode_compact_to(v, self.out);
                        Ok(())
                    }
                    _ => Err(self.mismatch(label, value)),
                }
            }
            TypeDescriptor::Alias(target) => self.encode_ref(target, value),
            TypeDescriptor::Opaque(inner) => {
                let mark = self.out.len();
                self.encode_ref(inner, value)?;
                let body = self.out.split_off(mark);
                encode_compact_to(body.len() as u128, self.out);
                self.out.extend_from_slice(&body);
                Ok(())
            }
        }
    }

    fn encode_primitive(&mut self, kind: PrimitiveKind, label: Label<'a>, value: &Value) -> Result<()> {
        if let Some(width) = kind.unsigned_width() {
            return match unsigned_of(value) {
                Some(v) if v <= width.max_unsigned() => {
                    self.out
                        .extend_from_slice(&v.to_le_bytes()[..width.bytes()]);
                    Ok(())
                }
                _ => Err(self.mismatch(label, value)),
            };
        }
        if let Some(width) = kind.signed_width() {
            return match signed_of(value) {
                Some(v) if (width.min_signed()..=width.max_signed()).contains(&v) => {
                    self.out
                        .extend_from_slice(&v.to_le_bytes()[..width.bytes()]);
                    Ok(())
                }
                _ => Err(self.mismatch(label, value)),
            };
        }

        match (kind, value) {
            (PrimitiveKind::Bool, Value::Bool(b)) => self.out.push(u8::from(*b)),
            (PrimitiveKind::Null, Value::Null) => {}
            (PrimitiveKind::Text, Value::Text(s)) => {
                encode_compact_to(s.len() as u128, self.out);
                self.out.extend_from_slice(s.as_bytes());
            }
            (PrimitiveKind::Bytes, Value::Bytes(b)) => {
                encode_compact_to(b.len() as u128, self.out);
                self.out.extend_from_slice(b);
            }
            (PrimitiveKind::FixedBytes(n), Value::Bytes(b)) if b.len() == n => {
                self.out.extend_from_slice(b);
            }
            _ => return Err(self.mismatch(label, value)),
        }
        Ok(())
    }

    fn encode_fields(
        &mut self,
        fields: &'a [FieldDescriptor],
        map: &'a IndexMap<String, Value>,
        label: Label<'a>,
    ) -> Result<()> {
        for field in fields {
            let Some(v) = map.get(&field.name) else {
                return Err(CodecError::TypeMismatch {
                    path: self.path(),
                    expected: format!("field {} of {}", field.name, label),
                    found: "missing field".into(),
                });
            };
            self.nested(Segment::Field(&field.name), |enc| {
                enc.encode_ref(&field.type_ref, v)
            })?;
        }
        if map.len() != fields.len() {
            let extra = map
                .keys()
                .find(|k| !fields.iter().any(|f| &f.name == *k))
                .map_or("", String::as_str);
            return Err(CodecError::TypeMismatch {
                path: self.path(),
                expected: label.to_string(),
                found: format!("unexpected field {}", extra),
            });
        }
        Ok(())
    }

    fn encode_payload(&mut self, payload: &'a VariantPayload, value: &'a Value) -> Result<()> {
        match payload {
            VariantPayload::Unit => match value {
                Value::Null => Ok(()),
                _ => Err(self.mismatch("unit payload", value)),
            },
            VariantPayload::Single(r) => self.encode_ref(r, value),
            VariantPayload::Struct(fields) => match value {
                Value::Struct(map) => self.encode_fields(fields, map, Label::Named("variant")),
                _ => Err(self.mismatch("struct payload", value)),
            },
            VariantPayload::Tuple(elems) => match value.as_sequence() {
                Some(items) if items.len() == elems.len() => self.encode_tuple(elems, items),
                _ => Err(self.mismatch(format!("{}-tuple payload", elems.len()), value)),
            },
        }
    }

    fn encode_items(&mut self, elem: &'a TypeRef, items: &'a [Value]) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            self.nested(Segment::Index(i), |enc| enc.encode_ref(elem, item))?;
        }
        Ok(())
    }

    fn encode_tuple(&mut self, elems: &'a [TypeRef], items: &'a [Value]) -> Result<()> {
        for (i, (elem, item)) in elems.iter().zip(items).enumerate() {
            self.nested(Segment::Index(i), |enc| enc.encode_ref(elem, item))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::builder::{EnumBuilder, StructBuilder};
    use crate::registry::descriptor::{PrimitiveKind, TypeDescriptor, TypeRef};
    use crate::{CodecError, Registry, Value};

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register(
                "Pair",
                StructBuilder::new()
                    .field("a", PrimitiveKind::U8)
                    .field("b", PrimitiveKind::Bool)
                    .build(),
            )
            .unwrap();
        registry
            .register(
                "Event",
                EnumBuilder::new()
                    .unit("Ping")
                    .reserved()
                    .with_fields(
                        "Remarked",
                        StructBuilder::new()
                            .named_field("pair", "Pair")
                            .field("hash", PrimitiveKind::FixedBytes(4)),
                    )
                    .build(),
            )
            .unwrap();
        registry
            .register(
                "Holder",
                StructBuilder::new()
                    .sequence_field("items", TypeRef::named("Pair"))
                    .build(),
            )
            .unwrap();
        registry
    }

    fn pair(a: u8, b: bool) -> Value {
        Value::structure([("a", a.into()), ("b", b.into())])
    }

    #[test]
    fn test_integer_widths_little_endian() {
        let registry = registry();
        assert_eq!(registry.encode("u16", &Value::u16(0x0102)).unwrap(), [0x02, 0x01]);
        assert_eq!(registry.encode("i16", &(-2i16).into()).unwrap(), [0xfe, 0xff]);
        assert_eq!(
            registry.encode("u64", &5u8.into()).unwrap(),
            [5, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            registry.encode("i128", &Value::i128(-1)).unwrap(),
            vec![0xff; 16]
        );
    }

    #[test]
    fn test_out_of_range_integer() {
        let registry = registry();
        let err = registry.encode("u8", &Value::u16(300)).unwrap_err();
        assert_eq!(
            err,
            CodecError::TypeMismatch {
                path: "u8".into(),
                expected: "u8".into(),
                found: "unsigned integer 300".into(),
            }
        );
        assert!(registry.encode("i8", &Value::i32(-129)).is_err());
        assert!(registry.encode("u32", &Value::i32(-1)).is_err());
    }

    #[test]
    fn test_mismatch_path_through_sequence() {
        let registry = registry();
        let value = Value::structure([(
            "items",
            Value::Sequence(vec![pair(1, true), pair(2, false), Value::structure([("a", 3u8.into()), ("b", 7u8.into())])]),
        )]);
        match registry.encode("Holder", &value).unwrap_err() {
            CodecError::TypeMismatch { path, expected, .. } => {
                assert_eq!(path, "Holder.items[2].b");
                assert_eq!(expected, "bool");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mismatch_path_through_variant() {
        let registry = registry();
        let value = Value::variant(
            "Remarked",
            Value::structure([("pair", pair(1, true)), ("hash", Value::bytes(vec![0; 3]))]),
        );
        match registry.encode("Event", &value).unwrap_err() {
            CodecError::TypeMismatch { path, .. } => assert_eq!(path, "Event::Remarked.hash"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_struct_field_set_must_match() {
        let registry = registry();
        let missing = Value::structure([("a", 1u8.into())]);
        assert!(matches!(
            registry.encode("Pair", &missing),
            Err(CodecError::TypeMismatch { ref found, .. }) if found == "missing field"
        ));

        let extra = Value::structure([("a", 1u8.into()), ("b", true.into()), ("c", 0u8.into())]);
        assert!(matches!(
            registry.encode("Pair", &extra),
            Err(CodecError::TypeMismatch { ref found, .. }) if found == "unexpected field c"
        ));
    }

    #[test]
    fn test_reserved_and_unknown_variants() {
        let registry = registry();
        for name in ["__Unused1", "Pong"] {
            assert!(matches!(
                registry.encode("Event", &Value::unit_variant(name)),
                Err(CodecError::UnknownVariant { offset: None, .. })
            ));
        }
        assert_eq!(
            registry.encode("Event", &Value::unit_variant("Ping")).unwrap(),
            [0x00]
        );
    }

    #[test]
    fn test_opaque_is_length_prefixed() {
        let mut registry = registry();
        registry
            .register(
                "Wrapped",
                TypeDescriptor::Opaque(TypeRef::named("Pair")),
            )
            .unwrap();
        assert_eq!(
            registry.encode("Wrapped", &pair(5, true)).unwrap(),
            [0x08, 0x05, 0x01]
        );
    }

    #[test]
    fn test_failed_encode_leaves_buffer_untouched() {
        let registry = registry();
        let mut out = vec![0xaa];
        let value = Value::structure([("a", 1u8.into()), ("b", Value::Null)]);
        assert!(crate::encode_to(&registry, "Pair", &value, &mut out).is_err());
        assert_eq!(out, [0xaa]);
    }

    #[test]
    fn test_depth_limit() {
        let mut registry = Registry::new();
        registry
            .register("Nest", TypeDescriptor::Option(TypeRef::named("Nest")))
            .unwrap();
        registry.set_max_depth(8);

        let mut value = Value::none();
        for _ in 0..20 {
            value = Value::some(value);
        }
        assert!(matches!(
            registry.encode("Nest", &value),
            Err(CodecError::DepthLimit { limit: 8, .. })
        ));
    }
}
