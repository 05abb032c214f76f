// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry loader for lookup tables.
//!
//! A table is a flat mapping from type name to entry:
//!
//! ```json
//! {
//!   "Pair": { "a": "u8", "b": "bool" },
//!   "Flag": { "_enum": ["Off", "On"] },
//!   "Event": {
//!     "_enum": {
//!       "Remarked": { "_alias": { "hash_": "hash" }, "sender": "AccountId32", "hash_": "H256" },
//!       "Other": "Bytes",
//!       "Seal": "([u8;4],Bytes)",
//!       "Killed": "Null"
//!     }
//!   },
//!   "Balance": "u128"
//! }
//! ```
//!
//! A string entry is an alias, a mapping is a struct, a mapping with
//! `_enum` is an enum. Every entry is parsed and the whole registry is
//! validated before the loader returns.

#[cfg(feature = "yaml")]
pub mod yaml;

use crate::error::{CodecError, Result};
use crate::registry::descriptor::{
    EnumDescriptor, EnumVariant, FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeRef,
    VariantPayload,
};
use crate::registry::{Registry, DEFAULT_MAX_DEPTH};
use crate::type_spec::parse_type_spec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const ENUM_KEY: &str = "_enum";
const ALIAS_KEY: &str = "_alias";

/// Largest number of variants a one-byte discriminant can address.
const MAX_VARIANTS: usize = 256;

/// Loader settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderOptions {
    /// Register well-known runtime types the table does not define.
    pub builtins: bool,
    /// Codec recursion bound of the loaded registry.
    pub max_depth: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            builtins: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Table file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Json,
    Yaml,
}

impl TableFormat {
    /// Detect format from file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Detect format from file content.
    pub fn from_content(content: &str) -> Self {
        if content.trim_start().starts_with('{') {
            Self::Json
        } else {
            Self::Yaml
        }
    }
}

/// Build a registry from a lookup table with default options.
pub fn load_registry(spec: &JsonValue) -> Result<Registry> {
    load_registry_with(spec, &LoaderOptions::default())
}

/// Build a registry from a lookup table.
pub fn load_registry_with(spec: &JsonValue, options: &LoaderOptions) -> Result<Registry> {
    let mut registry = Registry::new();
    registry.set_max_depth(options.max_depth);

    let defined = registry.extend_from_table(spec)?;
    let builtins = if options.builtins {
        registry.register_builtins()
    } else {
        0
    };
    registry.validate()?;

    log::debug!(
        "[loader] loaded {} types ({} builtins)",
        defined,
        builtins
    );
    Ok(registry)
}

impl Registry {
    /// Register every entry of `spec` without validating.
    ///
    /// Returns the number of entries added. Names already present fail with
    /// `DuplicateType`, which lets several tables be merged into one registry.
    pub fn extend_from_table(&mut self, spec: &JsonValue) -> Result<usize> {
        let table = spec
            .as_object()
            .ok_or_else(|| CodecError::invalid_spec("<table>", "expected a mapping of type names"))?;
        for (name, entry) in table {
            let desc = parse_entry(name, entry)?;
            self.register(name.as_str(), desc)?;
        }
        Ok(table.len())
    }

    /// Load a registry from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_json_str_with(text, &LoaderOptions::default())
    }

    pub fn from_json_str_with(text: &str, options: &LoaderOptions) -> Result<Self> {
        let spec: JsonValue = serde_json::from_str(text)?;
        load_registry_with(&spec, options)
    }

    /// Load a registry from a `.json`, `.yaml` or `.yml` file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_path_with(path, &LoaderOptions::default())
    }

    pub fn from_path_with<P: AsRef<Path>>(path: P, options: &LoaderOptions) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| CodecError::Io(format!("{}: {}", path.display(), e)))?;
        let format =
            TableFormat::from_extension(path).unwrap_or_else(|| TableFormat::from_content(&text));
        log::debug!("[loader] reading {} as {:?}", path.display(), format);

        match format {
            TableFormat::Json => Self::from_json_str_with(&text, options),
            #[cfg(feature = "yaml")]
            TableFormat::Yaml => Self::from_yaml_str_with(&text, options),
            #[cfg(not(feature = "yaml"))]
            TableFormat::Yaml => Err(CodecError::Parse(format!(
                "{}: YAML support is disabled (enable the `yaml` feature)",
                path.display()
            ))),
        }
    }
}

fn parse_spec(owner: &str, spec: &str) -> Result<TypeRef> {
    parse_type_spec(spec)
        .map_err(|e| CodecError::invalid_spec(owner, format!("`{}`: {}", spec, e)))
}

fn parse_entry(name: &str, entry: &JsonValue) -> Result<TypeDescriptor> {
    match entry {
        JsonValue::String(spec) => Ok(TypeDescriptor::Alias(parse_spec(name, spec)?)),
        JsonValue::Object(map) => match map.get(ENUM_KEY) {
            Some(variants) => {
                if map.len() > 1 {
                    return Err(CodecError::invalid_spec(
                        name,
                        "`_enum` entry has sibling keys",
                    ));
                }
                parse_enum(name, variants).map(TypeDescriptor::Enum)
            }
            None => parse_fields(name, map).map(TypeDescriptor::Struct),
        },
        _ => Err(CodecError::invalid_spec(
            name,
            "expected a type-spec string or a mapping",
        )),
    }
}

/// Struct fields in declaration order, `_alias` renames applied.
fn parse_fields(owner: &str, map: &Map<String, JsonValue>) -> Result<Vec<FieldDescriptor>> {
    let mut fields = Vec::with_capacity(map.len());
    for (key, spec) in map {
        if key == ALIAS_KEY {
            continue;
        }
        let JsonValue::String(spec) = spec else {
            return Err(CodecError::invalid_spec(
                owner,
                format!("field {} must be a type-spec string", key),
            ));
        };
        fields.push(FieldDescriptor::new(key.as_str(), parse_spec(owner, spec)?));
    }

    match map.get(ALIAS_KEY) {
        None => {}
        Some(JsonValue::Object(renames)) => {
            for (internal, wire) in renames {
                let JsonValue::String(wire) = wire else {
                    return Err(CodecError::invalid_spec(
                        owner,
                        format!("alias for {} must be a string", internal),
                    ));
                };
                let field = fields
                    .iter_mut()
                    .find(|f| &f.name == internal)
                    .ok_or_else(|| {
                        CodecError::invalid_spec(owner, format!("alias for unknown field {}", internal))
                    })?;
                field.name = wire.clone();
            }
        }
        Some(_) => {
            return Err(CodecError::invalid_spec(owner, "`_alias` must be a mapping"));
        }
    }
    Ok(fields)
}

fn parse_enum(owner: &str, variants: &JsonValue) -> Result<EnumDescriptor> {
    let variants = match variants {
        JsonValue::Array(names) => {
            check_variant_count(owner, names.len())?;
            names
                .iter()
                .enumerate()
                .map(|(index, name)| match name {
                    JsonValue::String(name) => {
                        Ok(EnumVariant::new(name.as_str(), index as u8, VariantPayload::Unit))
                    }
                    _ => Err(CodecError::invalid_spec(owner, "variant names must be strings")),
                })
                .collect::<Result<Vec<_>>>()?
        }
        JsonValue::Object(map) if !map.is_empty() && map.values().all(JsonValue::is_number) => {
            explicit_variants(owner, map)?
        }
        JsonValue::Object(map) => {
            check_variant_count(owner, map.len())?;
            map.iter()
                .enumerate()
                .map(|(index, (name, payload))| {
                    let payload = parse_payload(owner, name, payload)?;
                    Ok(EnumVariant::new(name.as_str(), index as u8, payload))
                })
                .collect::<Result<Vec<_>>>()?
        }
        _ => {
            return Err(CodecError::invalid_spec(
                owner,
                "`_enum` must be a list or a mapping",
            ))
        }
    };
    Ok(EnumDescriptor::new(variants))
}

fn check_variant_count(owner: &str, count: usize) -> Result<()> {
    if count > MAX_VARIANTS {
        return Err(CodecError::invalid_spec(
            owner,
            format!("{} variants exceed the one-byte discriminant", count),
        ));
    }
    Ok(())
}

/// `{A: 0, B: 5}`: unit variants with explicit discriminants.
fn explicit_variants(owner: &str, map: &Map<String, JsonValue>) -> Result<Vec<EnumVariant>> {
    let mut seen = HashSet::new();
    let mut variants = Vec::with_capacity(map.len());
    for (name, index) in map {
        let index = index
            .as_u64()
            .and_then(|i| u8::try_from(i).ok())
            .ok_or_else(|| {
                CodecError::invalid_spec(owner, format!("discriminant of {} is not in 0..=255", name))
            })?;
        if !seen.insert(index) {
            return Err(CodecError::invalid_spec(
                owner,
                format!("duplicate discriminant {}", index),
            ));
        }
        variants.push(EnumVariant::new(name.as_str(), index, VariantPayload::Unit));
    }
    Ok(variants)
}

fn parse_payload(owner: &str, variant: &str, payload: &JsonValue) -> Result<VariantPayload> {
    match payload {
        JsonValue::Null => Ok(VariantPayload::Unit),
        JsonValue::String(spec) => {
            let r = parse_spec(owner, spec)?;
            Ok(match r {
                TypeRef::Inline(desc) => match *desc {
                    TypeDescriptor::Primitive(PrimitiveKind::Null) => VariantPayload::Unit,
                    TypeDescriptor::Tuple(elems) => VariantPayload::Tuple(elems),
                    other => VariantPayload::Single(TypeRef::inline(other)),
                },
                named => VariantPayload::Single(named),
            })
        }
        JsonValue::Object(fields) => {
            let owner = format!("{}::{}", owner, variant);
            parse_fields(&owner, fields).map(VariantPayload::Struct)
        }
        _ => Err(CodecError::invalid_spec(
            owner,
            format!("payload of {} must be a type-spec string or a mapping", variant),
        )),
    }
}
