// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use scale_registry::Registry;
use std::sync::OnceLock;

static LOOKUP: &str = include_str!("../../crates/scale-registry/tests/fixtures/lookup.json");

fn registry() -> &'static (Registry, Vec<String>) {
    static CELL: OnceLock<(Registry, Vec<String>)> = OnceLock::new();
    CELL.get_or_init(|| {
        let registry = Registry::from_json_str(LOOKUP).expect("fixture loads");
        let names = registry.names().map(str::to_string).collect();
        (registry, names)
    })
}

fuzz_target!(|data: &[u8]| {
    let Some((&selector, bytes)) = data.split_first() else {
        return;
    };
    let (registry, names) = registry();
    let name = &names[usize::from(selector) % names.len()];

    // Anything accepted must re-encode to exactly the bytes consumed
    if let Ok((value, used)) = registry.decode_prefix(name, bytes) {
        let reencoded = registry.encode(name, &value).expect("decoded value encodes");
        assert_eq!(reencoded, &bytes[..used]);
    }
});
