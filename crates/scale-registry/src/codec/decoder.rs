// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::Label;
use crate::compact::read_compact;
use crate::cursor::{Cursor, Underrun};
use crate::error::{CodecError, Result};
use crate::registry::descriptor::{
    FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeRef, VariantPayload,
};
use crate::registry::Registry;
use crate::value::{IntWidth, Value};
use indexmap::IndexMap;

/// Upper bound on up-front allocation for fixed-length arrays.
const MAX_PREALLOC: usize = 4096;

/// Zero-sized collection elements one decode call may produce in total.
const MAX_EMPTY_ELEMENTS: usize = 4096;

/// SCALE decoder over a registry.
pub(super) struct Decoder<'a, 'b> {
    registry: &'a Registry,
    cursor: Cursor<'b>,
    /// Offset of `cursor`'s buffer within the top-level input.
    base: usize,
    depth: usize,
    /// Collection elements so far that consumed no input.
    empty_elements: usize,
}

impl<'a, 'b> Decoder<'a, 'b> {
    pub(super) fn new(registry: &'a Registry, bytes: &'b [u8]) -> Self {
        Self {
            registry,
            cursor: Cursor::new(bytes),
            base: 0,
            depth: 0,
            empty_elements: 0,
        }
    }

    /// Bytes read so far.
    pub(super) fn consumed(&self) -> usize {
        self.cursor.offset()
    }

    fn offset(&self) -> usize {
        self.base + self.cursor.offset()
    }

    fn truncated(&self, label: Label<'_>, u: Underrun) -> CodecError {
        CodecError::Truncated {
            type_name: label.to_string(),
            offset: self.base + u.offset,
            needed: u.needed,
            available: u.available,
        }
    }

    fn invalid(&self, label: Label<'_>, offset: usize, reason: impl Into<String>) -> CodecError {
        CodecError::InvalidValue {
            type_name: label.to_string(),
            offset,
            reason: reason.into(),
        }
    }

    fn read_u8(&mut self, label: Label<'_>) -> Result<u8> {
        self.cursor.read_u8().map_err(|u| self.truncated(label, u))
    }

    fn read_bytes(&mut self, label: Label<'_>, len: usize) -> Result<&'b [u8]> {
        self.cursor
            .read_bytes(len)
            .map_err(|u| self.truncated(label, u))
    }

    fn read_compact(&mut self, label: Label<'_>) -> Result<u128> {
        let base = self.base;
        read_compact(&mut self.cursor).map_err(|e| {
            let mut err = e.into_codec_error(&label.to_string());
            match &mut err {
                CodecError::Truncated { offset, .. } | CodecError::InvalidValue { offset, .. } => {
                    *offset += base;
                }
                _ => {}
            }
            err
        })
    }

    /// Decode one collection element, charging zero-sized ones to the budget.
    fn decode_element(&mut self, elem: &TypeRef, label: Label<'_>, at: usize) -> Result<Value> {
        let before = self.cursor.offset();
        let value = self.decode_ref(elem)?;
        if self.cursor.offset() == before {
            self.empty_elements += 1;
            if self.empty_elements > MAX_EMPTY_ELEMENTS {
                return Err(self.invalid(
                    label,
                    at,
                    format!("more than {} zero-sized elements", MAX_EMPTY_ELEMENTS),
                ));
            }
        }
        Ok(value)
    }

    /// Compact length prefix.
    fn read_len(&mut self, label: Label<'_>) -> Result<usize> {
        let at = self.offset();
        let len = self.read_compact(label)?;
        usize::try_from(len).map_err(|_| self.invalid(label, at, "length does not fit in memory"))
    }

    /// 0/1 tag byte of options and results.
    fn read_tag(&mut self, label: Label<'_>) -> Result<bool> {
        let at = self.offset();
        match self.read_u8(label)? {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(self.invalid(label, at, format!("tag byte {:#04x}", tag))),
        }
    }

    pub(super) fn decode_ref(&mut self, r: &TypeRef) -> Result<Value> {
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
        let result = self.decode_desc(desc, label);
        self.depth -= 1;
        result
    }

    fn decode_desc(&mut self, desc: &TypeDescriptor, label: Label<'_>) -> Result<Value> {
        match desc {
            TypeDescriptor::Primitive(kind) => self.decode_primitive(*kind, label),
            TypeDescriptor::Struct(fields) => self.decode_fields(fields).map(Value::Struct),
            TypeDescriptor::Enum(e) => {
                let at = self.offset();
                let index = self.read_u8(label)?;
                let variant = e
                    .variant_by_index(index)
                    .ok_or_else(|| CodecError::UnknownVariant {
                        type_name: label.to_string(),
                        variant: format!("#{}", index),
                        offset: Some(at),
                    })?;
                let payload = self.decode_payload(&variant.payload)?;
                Ok(Value::Enum(variant.name.clone(), Box::new(payload)))
            }
            TypeDescriptor::Sequence(elem) => {
                let at = self.offset();
                let len = self.read_len(label)?;
                // Every element takes at least one byte unless it is zero-sized.
                let mut items = Vec::with_capacity(len.min(self.cursor.remaining()));
                for _ in 0..len {
                    items.push(self.decode_element(elem, label, at)?);
                }
                Ok(Value::Sequence(items))
            }
            TypeDescriptor::FixedArray(elem, len) => {
                let at = self.offset();
                let mut items = Vec::with_capacity((*len).min(MAX_PREALLOC));
                for _ in 0..*len {
                    items.push(self.decode_element(elem, label, at)?);
                }
                Ok(Value::Sequence(items))
            }
            TypeDescriptor::Tuple(elems) => self.decode_tuple(elems),
            TypeDescriptor::Option(inner) => {
                if self.read_tag(label)? {
                    Ok(Value::Option(Some(Box::new(self.decode_ref(inner)?))))
                } else {
                    Ok(Value::Option(None))
                }
            }
            TypeDescriptor::Result(ok, err) => {
                if self.read_tag(label)? {
                    Ok(Value::Result(Err(Box::new(self.decode_ref(err)?))))
                } else {
                    Ok(Value::Result(Ok(Box::new(self.decode_ref(ok)?))))
                }
            }
            TypeDescriptor::Compact(inner) => {
                let width = self.registry.compact_width(inner)?;
                let at = self.offset();
                let v = self.read_compact(label)?;
                if v > width.max_unsigned() {
                    return Err(self.invalid(
                        label,
                        at,
                        format!("compact value {} exceeds {} bits", v, width.bits()),
                    ));
                }
                Ok(Value::UInt(width, v))
            }
            TypeDescriptor::Alias(target) => self.decode_ref(target),
            TypeDescriptor::Opaque(inner) => {
                let len = self.read_len(label)?;
                let start = self.offset();
                let window = self.read_bytes(label, len)?;
                let mut sub = Decoder {
                    registry: self.registry,
                    cursor: Cursor::new(window),
                    base: start,
                    depth: self.depth,
                    empty_elements: self.empty_elements,
                };
                let value = sub.decode_ref(inner);
                self.empty_elements = sub.empty_elements;
                let value = value?;
                if !sub.cursor.is_eof() {
                    return Err(self.invalid(
                        label,
                        sub.offset(),
                        format!("{} unread bytes in opaque window", sub.cursor.remaining()),
                    ));
                }
                Ok(value)
            }
        }
    }

    fn decode_primitive(&mut self, kind: PrimitiveKind, label: Label<'_>) -> Result<Value> {
        let at = self.offset();
        let value = match kind {
            PrimitiveKind::Bool => match self.read_u8(label)? {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                b => return Err(self.invalid(label, at, format!("bool byte {:#04x}", b))),
            },
            PrimitiveKind::U8 => Value::UInt(IntWidth::W8, u128::from(self.read_u8(label)?)),
            PrimitiveKind::U16 => self.read_uint(label, IntWidth::W16)?,
            PrimitiveKind::U32 => self.read_uint(label, IntWidth::W32)?,
            PrimitiveKind::U64 => self.read_uint(label, IntWidth::W64)?,
            PrimitiveKind::U128 => self.read_uint(label, IntWidth::W128)?,
            PrimitiveKind::I8 => {
                let v = self.cursor.read_i8().map_err(|u| self.truncated(label, u))?;
                Value::Int(IntWidth::W8, i128::from(v))
            }
            PrimitiveKind::I16 => {
                let v = self.cursor.read_i16_le().map_err(|u| self.truncated(label, u))?;
                Value::Int(IntWidth::W16, i128::from(v))
            }
            PrimitiveKind::I32 => {
                let v = self.cursor.read_i32_le().map_err(|u| self.truncated(label, u))?;
                Value::Int(IntWidth::W32, i128::from(v))
            }
            PrimitiveKind::I64 => {
                let v = self.cursor.read_i64_le().map_err(|u| self.truncated(label, u))?;
                Value::Int(IntWidth::W64, i128::from(v))
            }
            PrimitiveKind::I128 => {
                let v = self.cursor.read_i128_le().map_err(|u| self.truncated(label, u))?;
                Value::Int(IntWidth::W128, v)
            }
            PrimitiveKind::Text => {
                let len = self.read_len(label)?;
                let body = self.read_bytes(label, len)?;
                let text = std::str::from_utf8(body)
                    .map_err(|e| self.invalid(label, at, format!("invalid UTF-8: {}", e)))?;
                Value::Text(text.to_string())
            }
            PrimitiveKind::Bytes => {
                let len = self.read_len(label)?;
                Value::Bytes(self.read_bytes(label, len)?.to_vec())
            }
            PrimitiveKind::FixedBytes(n) => Value::Bytes(self.read_bytes(label, n)?.to_vec()),
            PrimitiveKind::Null => Value::Null,
        };
        Ok(value)
    }

    fn read_uint(&mut self, label: Label<'_>, width: IntWidth) -> Result<Value> {
        let body = self.read_bytes(label, width.bytes())?;
        let mut buf = [0u8; 16];
        buf[..body.len()].copy_from_slice(body);
        Ok(Value::UInt(width, u128::from_le_bytes(buf)))
    }

    fn decode_fields(&mut self, fields: &[FieldDescriptor]) -> Result<IndexMap<String, Value>> {
        let mut map = IndexMap::with_capacity(fields.len());
        for field in fields {
            let value = self.decode_ref(&field.type_ref)?;
            map.insert(field.name.clone(), value);
        }
        Ok(map)
    }

    fn decode_tuple(&mut self, elems: &[TypeRef]) -> Result<Value> {
        let items = elems
            .iter()
            .map(|elem| self.decode_ref(elem))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Tuple(items))
    }

    fn decode_payload(&mut self, payload: &VariantPayload) -> Result<Value> {
        match payload {
            VariantPayload::Unit => Ok(Value::Null),
            VariantPayload::Single(r) => self.decode_ref(r),
            VariantPayload::Struct(fields) => self.decode_fields(fields).map(Value::Struct),
            VariantPayload::Tuple(elems) => self.decode_tuple(elems),
        }
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
                "Item",
                EnumBuilder::new()
                    .single("Other", PrimitiveKind::Bytes)
                    .reserved()
                    .reserved()
                    .tuple(
                        "Consensus",
                        vec![PrimitiveKind::FixedBytes(4).into(), PrimitiveKind::Bytes.into()],
                    )
                    .build(),
            )
            .unwrap();
        registry
            .register(
                "Digest",
                StructBuilder::new()
                    .sequence_field("logs", TypeRef::named("Item"))
                    .build(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_unused_slot_reports_offset() {
        let registry = registry();
        // logs: [Other(0x), <slot 1>]
        let err = registry.decode("Digest", &[0x08, 0x00, 0x00, 0x01]).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownVariant {
                type_name: "Item".into(),
                variant: "#1".into(),
                offset: Some(3),
            }
        );
    }

    #[test]
    fn test_tuple_payload() {
        let registry = registry();
        let bytes = [0x03, b'a', b'u', b'r', b'a', 0x08, 0xbe, 0xef];
        let value = registry.decode("Item", &bytes).unwrap();
        assert_eq!(
            value,
            Value::variant(
                "Consensus",
                Value::Tuple(vec![Value::bytes(*b"aura"), Value::bytes(vec![0xbe, 0xef])])
            )
        );
    }

    #[test]
    fn test_rejects_non_canonical_bytes() {
        let registry = registry();
        for (ty, bytes) in [
            ("bool", vec![0x02]),
            ("Option<u8>", vec![0x02, 0x00]),
            ("Result<u8,u8>", vec![0x07, 0x00]),
            ("Compact<u32>", vec![0x05, 0x00]),
            ("Text", vec![0x04, 0xff]),
        ] {
            assert!(
                matches!(registry.decode(ty, &bytes), Err(CodecError::InvalidValue { .. })),
                "{} accepted {:?}",
                ty,
                bytes
            );
        }
    }

    #[test]
    fn test_compact_must_fit_width() {
        let registry = registry();
        // 256 as Compact<u8>
        assert!(matches!(
            registry.decode("Compact<u8>", &[0x01, 0x04]),
            Err(CodecError::InvalidValue { offset: 0, .. })
        ));
        assert_eq!(
            registry.decode("Compact<u8>", &[0xfd, 0x03]).unwrap(),
            Value::u8(255)
        );
    }

    #[test]
    fn test_trailing_bytes_and_prefix() {
        let registry = registry();
        assert_eq!(
            registry.decode("u8", &[1, 2, 3]),
            Err(CodecError::TrailingBytes {
                type_name: "u8".into(),
                consumed: 1,
                remaining: 2,
            })
        );
        assert_eq!(
            registry.decode_prefix("u16", &[1, 0, 9]).unwrap(),
            (Value::u16(1), 2)
        );
    }

    #[test]
    fn test_hostile_length_prefix() {
        let registry = registry();
        // Vec<u64> announcing 2^30 elements with no body
        let err = registry
            .decode("Vec<u64>", &[0x03, 0x00, 0x00, 0x00, 0x40])
            .unwrap_err();
        assert!(matches!(err, CodecError::Truncated { offset: 5, .. }));
    }

    #[test]
    fn test_zero_sized_budget_spans_call() {
        let mut registry = registry();
        registry
            .register(
                "Many",
                TypeDescriptor::FixedArray(PrimitiveKind::Null.into(), 1_000_000),
            )
            .unwrap();

        // 4096 nulls in one sequence fit
        assert!(registry.decode("Vec<Null>", &[0x01, 0x40]).is_ok());
        // two inner sequences of 2048 fit, a third does not
        assert!(registry
            .decode("Vec<Vec<Null>>", &[0x08, 0x01, 0x20, 0x01, 0x20])
            .is_ok());
        assert!(matches!(
            registry.decode("Vec<Vec<Null>>", &[0x0c, 0x01, 0x20, 0x01, 0x20, 0x01, 0x20]),
            Err(CodecError::InvalidValue { offset: 5, .. })
        ));
        // the budget carries into opaque windows
        assert!(matches!(
            registry.decode(
                "(Vec<Null>,WrapperKeepOpaque<Vec<Null>>)",
                &[0x01, 0x40, 0x04, 0x04]
            ),
            Err(CodecError::InvalidValue { offset: 3, .. })
        ));
        assert!(matches!(
            registry.decode("Many", &[]),
            Err(CodecError::InvalidValue { offset: 0, .. })
        ));
    }

    #[test]
    fn test_opaque_window() {
        let mut registry = registry();
        registry
            .register("Wrapped", TypeDescriptor::Opaque("u16".parse().unwrap()))
            .unwrap();
        assert_eq!(
            registry.decode("Wrapped", &[0x08, 0x34, 0x12]).unwrap(),
            Value::u16(0x1234)
        );
        // window longer than the inner encoding
        assert!(matches!(
            registry.decode("Wrapped", &[0x0c, 0x34, 0x12, 0x00]),
            Err(CodecError::InvalidValue { offset: 3, .. })
        ));
        // window shorter than the inner encoding
        assert!(matches!(
            registry.decode("Wrapped", &[0x04, 0x34]),
            Err(CodecError::Truncated { offset: 1, .. })
        ));
    }

    #[test]
    fn test_signed_values() {
        let registry = registry();
        assert_eq!(registry.decode("i8", &[0x80]).unwrap(), Value::Int(crate::IntWidth::W8, -128));
        assert_eq!(
            registry.decode("i64", &(-5i64).to_le_bytes()).unwrap(),
            Value::i64(-5)
        );
    }
}
