// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// SCALE Golden Vectors: byte-exact reference encodings.
//
// Each vector encodes a known value, compares against the reference hex,
// then decodes the reference bytes and expects the original value back.

#![allow(clippy::unreadable_literal)]
#![allow(clippy::missing_panics_doc)]

use scale_registry::{
    decode_compact, encode_compact, EnumBuilder, IntWidth, PrimitiveKind, Registry,
    StructBuilder, TypeDescriptor, TypeRef, Value,
};

/// Core golden vector check.
///
/// - Encodes `value` as `ty` and compares with `expected_hex`
/// - Decodes the reference bytes and compares with `value`
fn golden(registry: &Registry, ty: &str, value: &Value, expected_hex: &str) {
    let bytes = registry
        .encode(ty, value)
        .unwrap_or_else(|e| panic!("encode {}: {}", ty, e));
    assert_eq!(hex::encode(&bytes), expected_hex, "{} encoding", ty);

    let reference = hex::decode(expected_hex).unwrap();
    let decoded = registry
        .decode(ty, &reference)
        .unwrap_or_else(|e| panic!("decode {}: {}", ty, e));
    assert_eq!(&decoded, value, "{} decoding", ty);
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(
            "Status",
            EnumBuilder::new()
                .unit("Idle")
                .single("Busy", PrimitiveKind::U32)
                .reserved()
                .at(10)
                .with_fields(
                    "Failed",
                    StructBuilder::new()
                        .field("code", PrimitiveKind::U16)
                        .field("reason", PrimitiveKind::Text),
                )
                .build(),
        )
        .unwrap();
    registry
        .register(
            "Ledger",
            StructBuilder::new()
                .named_field("status", "Status")
                .compact_field("total", PrimitiveKind::U128)
                .sequence_field("marks", PrimitiveKind::U16)
                .build(),
        )
        .unwrap();
    registry
        .register(
            "Sealed",
            TypeDescriptor::Opaque(TypeRef::from(PrimitiveKind::U32)),
        )
        .unwrap();
    registry.validate().unwrap();
    registry
}

// ============================================================================
// Compact integers
// ============================================================================

#[test]
fn golden_compact_modes() {
    let vectors: [(u128, &str); 12] = [
        (0, "00"),
        (1, "04"),
        (63, "fc"),
        (64, "0101"),
        (16383, "fdff"),
        (16384, "02000100"),
        ((1 << 30) - 1, "feffffff"),
        (1 << 30, "0300000040"),
        (u128::from(u32::MAX), "03ffffffff"),
        (1 << 32, "070000000001"),
        (u128::from(u64::MAX), "13ffffffffffffffff"),
        (u128::MAX, "33ffffffffffffffffffffffffffffffff"),
    ];
    for (n, expected) in vectors {
        assert_eq!(hex::encode(encode_compact(n)), expected, "compact {}", n);
        let bytes = hex::decode(expected).unwrap();
        assert_eq!(decode_compact(&bytes).unwrap(), (n, bytes.len()));
    }
}

// ============================================================================
// Primitives
// ============================================================================

#[test]
fn golden_unsigned() {
    let r = registry();
    golden(&r, "u8", &Value::u8(0x45), "45");
    golden(&r, "u16", &Value::u16(0x0102), "0201");
    golden(&r, "u32", &Value::u32(0xdeadbeef), "efbeadde");
    golden(&r, "u64", &Value::u64(1), "0100000000000000");
    golden(
        &r,
        "u128",
        &Value::u128(u128::MAX - 1),
        "feffffffffffffffffffffffffffffff",
    );
}

#[test]
fn golden_signed() {
    let r = registry();
    golden(&r, "i8", &Value::Int(IntWidth::W8, -1), "ff");
    golden(&r, "i16", &Value::Int(IntWidth::W16, -2), "feff");
    golden(&r, "i32", &Value::i32(i32::MIN), "00000080");
    golden(&r, "i64", &Value::i64(-1), "ffffffffffffffff");
    golden(&r, "i128", &Value::i128(1), "01000000000000000000000000000000");
}

#[test]
fn golden_text_and_bytes() {
    let r = registry();
    golden(&r, "bool", &Value::Bool(true), "01");
    golden(&r, "Text", &Value::text("hello"), "1468656c6c6f");
    golden(&r, "Text", &Value::text(""), "00");
    golden(&r, "Bytes", &Value::bytes(vec![0xca, 0xfe]), "08cafe");
    golden(&r, "[u8;4]", &Value::bytes(*b"BABE"), "42414245");
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn golden_option_and_result() {
    let r = registry();
    golden(&r, "Option<bool>", &Value::some(Value::Bool(true)), "0101");
    golden(&r, "Option<bool>", &Value::none(), "00");
    golden(&r, "Option<u16>", &Value::some(Value::u16(1)), "010100");
    golden(&r, "Result<u8,Text>", &Value::ok(Value::u8(42)), "002a");
    golden(&r, "Result<u8,Text>", &Value::err(Value::text("x")), "010478");
}

#[test]
fn golden_sequences_and_tuples() {
    let r = registry();
    golden(
        &r,
        "Vec<u16>",
        &Value::Sequence(vec![Value::u16(1), Value::u16(2)]),
        "0801000200",
    );
    golden(
        &r,
        "[u16;2]",
        &Value::Sequence(vec![Value::u16(1), Value::u16(2)]),
        "01000200",
    );
    golden(
        &r,
        "(u8,Compact<u64>)",
        &Value::Tuple(vec![Value::u8(1), Value::u64(1000)]),
        "01a10f",
    );
    golden(&r, "Vec<Text>", &Value::Sequence(vec![]), "00");
}

// ============================================================================
// Registered types
// ============================================================================

#[test]
fn golden_enum_discriminants() {
    let r = registry();
    golden(&r, "Status", &Value::unit_variant("Idle"), "00");
    golden(&r, "Status", &Value::variant("Busy", Value::u32(7)), "0107000000");
    golden(
        &r,
        "Status",
        &Value::variant(
            "Failed",
            Value::structure([("code", Value::u16(500)), ("reason", Value::text("io"))]),
        ),
        "0af40108696f",
    );
    // the reserved slot never decodes
    assert!(r.decode("Status", &[0x02]).is_err());
}

#[test]
fn golden_struct_with_compact() {
    let r = registry();
    let ledger = Value::structure([
        ("status", Value::unit_variant("Idle")),
        ("total", Value::u128(1 << 100)),
        ("marks", Value::Sequence(vec![Value::u16(1), Value::u16(2)])),
    ]);
    // Idle, Compact(2^100) in 13-byte mode, two marks
    golden(
        &r,
        "Ledger",
        &ledger,
        "0027000000000000000000000000100801000200",
    );
}

#[test]
fn golden_opaque() {
    let r = registry();
    golden(&r, "Sealed", &Value::u32(5), "1005000000");
}
