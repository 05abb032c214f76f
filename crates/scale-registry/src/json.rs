// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor-guided conversion from JSON to [`Value`].
//!
//! Accepts the shapes `Value` serializes to, plus a few conveniences:
//! integers as decimal or `0x` hex strings, and bytes as arrays of numbers.

use crate::codec::Label;
use crate::error::{CodecError, Result};
use crate::registry::descriptor::{
    FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeRef, VariantPayload,
};
use crate::registry::Registry;
use crate::value::{IntWidth, Value};
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};

static NULL: JsonValue = JsonValue::Null;

impl Registry {
    /// Build a [`Value`] of `type_name` from JSON.
    pub fn value_from_json(&self, type_name: &str, json: &JsonValue) -> Result<Value> {
        let root = self.type_ref(type_name)?;
        let mut converter = JsonConverter {
            registry: self,
            path: type_name.to_string(),
            depth: 0,
        };
        converter.convert(&root, json)
    }
}

fn json_kind(json: &JsonValue) -> String {
    match json {
        JsonValue::Null => "null".into(),
        JsonValue::Bool(_) => "boolean".into(),
        JsonValue::Number(n) => format!("number {}", n),
        JsonValue::String(s) if s.len() <= 32 => format!("string {:?}", s),
        JsonValue::String(_) => "string".into(),
        JsonValue::Array(items) => format!("array of {}", items.len()),
        JsonValue::Object(_) => "object".into(),
    }
}

fn parse_unsigned(json: &JsonValue) -> Option<u128> {
    match json {
        JsonValue::Number(n) => n.as_u64().map(u128::from),
        JsonValue::String(s) => match s.strip_prefix("0x") {
            Some(digits) => u128::from_str_radix(digits, 16).ok(),
            None => s.parse().ok(),
        },
        _ => None,
    }
}

fn parse_signed(json: &JsonValue) -> Option<i128> {
    match json {
        JsonValue::Number(n) => n.as_i64().map(i128::from),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_bytes(json: &JsonValue) -> Option<Vec<u8>> {
    match json {
        JsonValue::String(s) => hex::decode(s.strip_prefix("0x").unwrap_or(s)).ok(),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect(),
        _ => None,
    }
}

struct JsonConverter<'a> {
    registry: &'a Registry,
    path: String,
    depth: usize,
}

impl JsonConverter<'_> {
    fn mismatch(&self, expected: impl std::fmt::Display, json: &JsonValue) -> CodecError {
        CodecError::TypeMismatch {
            path: self.path.clone(),
            expected: expected.to_string(),
            found: json_kind(json),
        }
    }

    fn nested<T>(&mut self, segment: &str, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mark = self.path.len();
        self.path.push_str(segment);
        let result = f(self);
        self.path.truncate(mark);
        result
    }

    fn convert(&mut self, r: &TypeRef, json: &JsonValue) -> Result<Value> {
        let registry = self.registry;
        let desc = registry.resolve(r)?;
        let label = Label::of(r);
        if self.depth >= registry.max_depth() {
            return Err(CodecError::DepthLimit {
                type_name: label.to_string(),
                limit: registry.max_depth(),
            });
        }
        self.depth += 1;
        let result = self.convert_desc(desc, label, json);
        self.depth -= 1;
        result
    }

    fn convert_desc(&mut self, desc: &TypeDescriptor, label: Label<'_>, json: &JsonValue) -> Result<Value> {
        match desc {
            TypeDescriptor::Primitive(kind) => self.convert_primitive(*kind, label, json),
            TypeDescriptor::Struct(fields) => match json {
                JsonValue::Object(map) => self.convert_fields(fields, map, label).map(Value::Struct),
                _ => Err(self.mismatch(label, json)),
            },
            TypeDescriptor::Enum(e) => {
                let (name, payload_json) = match json {
                    JsonValue::String(name) => (name.as_str(), &NULL),
                    JsonValue::Object(map) if map.len() == 1 => match map.iter().next() {
                        Some((name, payload)) => (name.as_str(), payload),
                        None => return Err(self.mismatch(label, json)),
                    },
                    _ => return Err(self.mismatch(label, json)),
                };
                let variant = e.variant(name).ok_or_else(|| CodecError::UnknownVariant {
                    type_name: label.to_string(),
                    variant: name.to_string(),
                    offset: None,
                })?;
                let payload = self.nested(&format!("::{}", name), |conv| {
                    conv.convert_payload(&variant.payload, payload_json)
                })?;
                Ok(Value::Enum(variant.name.clone(), Box::new(payload)))
            }
            TypeDescriptor::Sequence(elem) => match json {
                JsonValue::Array(items) => self.convert_items(elem, items).map(Value::Sequence),
                _ => Err(self.mismatch(label, json)),
            },
            TypeDescriptor::FixedArray(elem, len) => match json {
                JsonValue::Array(items) if items.len() == *len => {
                    self.convert_items(elem, items).map(Value::Sequence)
                }
                _ => Err(self.mismatch(label, json)),
            },
            TypeDescriptor::Tuple(elems) => match json {
                JsonValue::Array(items) if items.len() == elems.len() => {
                    self.convert_tuple(elems, items)
                }
                _ => Err(self.mismatch(label, json)),
            },
            TypeDescriptor::Option(inner) => match json {
                JsonValue::Null => Ok(Value::Option(None)),
                _ => Ok(Value::Option(Some(Box::new(self.convert(inner, json)?)))),
            },
            TypeDescriptor::Result(ok, err) => match json {
                JsonValue::Object(map) if map.len() == 1 => {
                    if let Some(v) = map.get("Ok") {
                        let v = self.nested("::Ok", |conv| conv.convert(ok, v))?;
                        Ok(Value::Result(Ok(Box::new(v))))
                    } else if let Some(v) = map.get("Err") {
                        let v = self.nested("::Err", |conv| conv.convert(err, v))?;
                        Ok(Value::Result(Err(Box::new(v))))
                    } else {
                        Err(self.mismatch(label, json))
                    }
                }
                _ => Err(self.mismatch(label, json)),
            },
            TypeDescriptor::Compact(inner) => {
                let width = self.registry.compact_width(inner)?;
                match parse_unsigned(json) {
                    Some(v) if v <= width.max_unsigned() => Ok(Value::UInt(width, v)),
                    _ => Err(self.mismatch(label, json)),
                }
            }
            TypeDescriptor::Alias(target) | TypeDescriptor::Opaque(target) => {
                self.convert(target, json)
            }
        }
    }

    fn convert_primitive(&self, kind: PrimitiveKind, label: Label<'_>, json: &JsonValue) -> Result<Value> {
        if let Some(width) = kind.unsigned_width() {
            return match parse_unsigned(json) {
                Some(v) if v <= width.max_unsigned() => Ok(Value::UInt(width, v)),
                _ => Err(self.mismatch(label, json)),
            };
        }
        if let Some(width) = kind.signed_width() {
            return match parse_signed(json) {
                Some(v) if in_signed_range(width, v) => Ok(Value::Int(width, v)),
                _ => Err(self.mismatch(label, json)),
            };
        }
        let value = match (kind, json) {
            (PrimitiveKind::Bool, JsonValue::Bool(b)) => Value::Bool(*b),
            (PrimitiveKind::Null, JsonValue::Null) => Value::Null,
            (PrimitiveKind::Text, JsonValue::String(s)) => Value::Text(s.clone()),
            (PrimitiveKind::Bytes, _) => match parse_bytes(json) {
                Some(b) => Value::Bytes(b),
                None => return Err(self.mismatch(label, json)),
            },
            (PrimitiveKind::FixedBytes(n), _) => match parse_bytes(json) {
                Some(b) if b.len() == n => Value::Bytes(b),
                _ => return Err(self.mismatch(label, json)),
            },
            _ => return Err(self.mismatch(label, json)),
        };
        Ok(value)
    }

    fn convert_fields(
        &mut self,
        fields: &[FieldDescriptor],
        map: &Map<String, JsonValue>,
        label: Label<'_>,
    ) -> Result<IndexMap<String, Value>> {
        let mut out = IndexMap::with_capacity(fields.len());
        for field in fields {
            let Some(json) = map.get(&field.name) else {
                return Err(CodecError::TypeMismatch {
                    path: self.path.clone(),
                    expected: format!("field {} of {}", field.name, label),
                    found: "missing field".into(),
                });
            };
            let value = self.nested(&format!(".{}", field.name), |conv| {
                conv.convert(&field.type_ref, json)
            })?;
            out.insert(field.name.clone(), value);
        }
        if let Some(extra) = map.keys().find(|k| !fields.iter().any(|f| &f.name == *k)) {
            return Err(CodecError::TypeMismatch {
                path: self.path.clone(),
                expected: label.to_string(),
                found: format!("unexpected field {}", extra),
            });
        }
        Ok(out)
    }

    fn convert_payload(&mut self, payload: &VariantPayload, json: &JsonValue) -> Result<Value> {
        match payload {
            VariantPayload::Unit => match json {
                JsonValue::Null => Ok(Value::Null),
                _ => Err(self.mismatch("unit payload", json)),
            },
            VariantPayload::Single(r) => self.convert(r, json),
            VariantPayload::Struct(fields) => match json {
                JsonValue::Object(map) => self
                    .convert_fields(fields, map, Label::Named("variant"))
                    .map(Value::Struct),
                _ => Err(self.mismatch("struct payload", json)),
            },
            VariantPayload::Tuple(elems) => match json {
                JsonValue::Array(items) if items.len() == elems.len() => {
                    self.convert_tuple(elems, items)
                }
                _ => Err(self.mismatch(format!("{}-tuple payload", elems.len()), json)),
            },
        }
    }

    fn convert_items(&mut self, elem: &TypeRef, items: &[JsonValue]) -> Result<Vec<Value>> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.nested(&format!("[{}]", i), |conv| conv.convert(elem, item)))
            .collect()
    }

    fn convert_tuple(&mut self, elems: &[TypeRef], items: &[JsonValue]) -> Result<Value> {
        elems
            .iter()
            .zip(items)
            .enumerate()
            .map(|(i, (elem, item))| self.nested(&format!("[{}]", i), |conv| conv.convert(elem, item)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Tuple)
    }
}

fn in_signed_range(width: IntWidth, v: i128) -> bool {
    (width.min_signed()..=width.max_signed()).contains(&v)
}
