// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # scale-registry
//!
//! Registry-driven SCALE codec: encode and decode arbitrary structured values
//! by walking a table of type descriptors, without per-type generated code.
//!
//! ## Quick Start
//!
//! ```rust
//! use scale_registry::{load_registry, Value};
//! use serde_json::json;
//!
//! let registry = load_registry(&json!({
//!     "Pair": { "a": "u8", "b": "bool" },
//!     "Flag": { "_enum": ["Off", "On"] },
//! }))
//! .unwrap();
//!
//! let pair = Value::structure([("a", Value::u8(5)), ("b", Value::Bool(true))]);
//! let bytes = registry.encode("Pair", &pair).unwrap();
//! assert_eq!(bytes, [0x05, 0x01]);
//! assert_eq!(registry.decode("Pair", &bytes).unwrap(), pair);
//!
//! assert_eq!(registry.decode("Flag", &[0x01]).unwrap(), Value::unit_variant("On"));
//! assert!(registry.decode("Flag", &[0x02]).is_err());
//! ```
//!
//! ## Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`value`] | decoded value tree |
//! | [`compact`] | SCALE compact integers |
//! | [`registry`] | type descriptors, builders, name resolution |
//! | codec | descriptor-driven encoder and decoder |
//! | [`loader`] | lookup tables (JSON, YAML) to registry |
//!
//! ## Features
//!
//! - **yaml** (default): YAML lookup tables and loader options

pub mod compact;
pub mod cursor;
pub mod error;
pub mod loader;
pub mod registry;
pub mod type_spec;
pub mod value;

mod codec;
mod json;


pub use codec::{decode, decode_prefix, encode, encode_to};
pub use compact::{compact_len, decode_compact, encode_compact, encode_compact_to};
pub use error::{CodecError, Result};
pub use loader::{load_registry, load_registry_with, LoaderOptions, TableFormat};
pub use registry::builder::{EnumBuilder, StructBuilder};
pub use registry::builtins::BUILTIN_TYPES;
pub use registry::descriptor::{
    EnumDescriptor, EnumVariant, FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeRef,
    VariantPayload,
};
pub use registry::{Registry, DEFAULT_MAX_DEPTH};
pub use type_spec::{parse_type_spec, SpecError};
pub use value::{IntWidth, Value};
