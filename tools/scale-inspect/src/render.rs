// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Text rendering for `list` and `show`.

use scale_registry::{TypeDescriptor, VariantPayload};
use std::fmt::Write;

/// Case-insensitive substring match; no filter matches everything.
pub fn name_matches(name: &str, filter: Option<&str>) -> bool {
    match filter {
        Some(f) => name.to_lowercase().contains(&f.to_lowercase()),
        None => true,
    }
}

/// One-line summary used by `list`.
pub fn summary(desc: &TypeDescriptor) -> String {
    match desc {
        TypeDescriptor::Struct(fields) => format!("struct ({} fields)", fields.len()),
        TypeDescriptor::Enum(e) => {
            let usable = e.constructible().count();
            if usable == e.variants.len() {
                format!("enum ({} variants)", usable)
            } else {
                format!("enum ({} variants, {} reserved)", usable, e.variants.len() - usable)
            }
        }
        other => other.to_string(),
    }
}

/// Multi-line description used by `show`.
pub fn describe(name: &str, desc: &TypeDescriptor) -> String {
    let mut out = String::new();
    match desc {
        TypeDescriptor::Struct(fields) => {
            let _ = writeln!(out, "{}: struct", name);
            for field in fields {
                let _ = writeln!(out, "  {}: {}", field.name, field.type_ref);
            }
        }
        TypeDescriptor::Enum(e) => {
            let _ = writeln!(out, "{}: enum", name);
            for variant in &e.variants {
                if variant.is_reserved() {
                    let _ = writeln!(out, "  [{:>3}] (reserved)", variant.index);
                    continue;
                }
                let _ = write!(out, "  [{:>3}] {}", variant.index, variant.name);
                match &variant.payload {
                    VariantPayload::Unit => {}
                    VariantPayload::Single(r) => {
                        let _ = write!(out, "({})", r);
                    }
                    VariantPayload::Tuple(refs) => {
                        let parts: Vec<String> = refs.iter().map(ToString::to_string).collect();
                        let _ = write!(out, "({})", parts.join(","));
                    }
                    VariantPayload::Struct(fields) => {
                        let parts: Vec<String> = fields
                            .iter()
                            .map(|f| format!("{}: {}", f.name, f.type_ref))
                            .collect();
                        let _ = write!(out, " {{ {} }}", parts.join(", "));
                    }
                }
                out.push('\n');
            }
        }
        other => {
            let _ = writeln!(out, "{}: {}", name, other);
        }
    }
    out
}
