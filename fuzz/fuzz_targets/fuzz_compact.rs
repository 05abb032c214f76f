// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use scale_registry::{compact_len, decode_compact, encode_compact};

fuzz_target!(|data: &[u8]| {
    // Only the canonical form decodes, so it round-trips byte for byte
    if let Ok((value, used)) = decode_compact(data) {
        assert_eq!(encode_compact(value), &data[..used]);
        assert_eq!(compact_len(value), used);
    }
});
