// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Well-known runtime types that lookup tables reference without defining.

use super::Registry;
use crate::type_spec::parse_type_spec;
use crate::registry::descriptor::TypeDescriptor;

/// Builtin name and its type-spec.
pub const BUILTIN_TYPES: &[(&str, &str)] = &[
    ("AccountId32", "[u8;32]"),
    ("AccountId", "AccountId32"),
    ("H160", "[u8;20]"),
    ("H256", "[u8;32]"),
    ("H512", "[u8;64]"),
    ("Hash", "H256"),
    ("Balance", "u128"),
    ("BlockNumber", "u32"),
    ("Weight", "u64"),
    ("Perbill", "u32"),
    ("Permill", "u32"),
    ("Percent", "u8"),
    ("PerU16", "u16"),
];

impl Registry {
    /// Register every builtin the registry does not define yet.
    ///
    /// Returns the number of builtins added.
    pub fn register_builtins(&mut self) -> usize {
        let mut added = 0;
        for (name, spec) in BUILTIN_TYPES {
            if self.contains(name) {
                log::debug!("[registry] table defines {}, builtin skipped", name);
                continue;
            }
            let Ok(target) = parse_type_spec(spec) else {
                continue;
            };
            if self.register(*name, TypeDescriptor::Alias(target)).is_ok() {
                added += 1;
            }
        }
        added
    }
}
