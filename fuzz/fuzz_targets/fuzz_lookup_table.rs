// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use scale_registry::load_registry;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(table) = serde_json::from_str::<serde_json::Value>(text) else {
        return;
    };

    // Loaded tables are always internally consistent
    if let Ok(registry) = load_registry(&table) {
        assert!(registry.validate().is_ok());
        for name in registry.names() {
            let _ = registry.decode(name, &[]);
        }
    }
});
