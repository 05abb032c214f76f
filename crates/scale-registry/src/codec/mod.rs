// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SCALE encoding/decoding driven by registry descriptors.
//!
//! Both directions walk the descriptor tree, resolving named references
//! through the registry as they go. Decoding is canonical: any byte string
//! it accepts re-encodes to the same bytes.

mod decoder;
mod encoder;

use crate::error::Result;
use crate::registry::descriptor::{TypeDescriptor, TypeRef};
use crate::registry::Registry;
use crate::value::Value;
use std::fmt;

use decoder::Decoder;
use encoder::Encoder;

/// Type label for error messages, formatted only when an error is built.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Label<'a> {
    Named(&'a str),
    Inline(&'a TypeDescriptor),
}

impl<'a> Label<'a> {
    pub(crate) fn of(r: &'a TypeRef) -> Self {
        match r {
            TypeRef::Named(name) => Self::Named(name),
            TypeRef::Inline(desc) => Self::Inline(desc),
        }
    }
}

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Inline(desc) => desc.fmt(f),
        }
    }
}

/// Encode `value` as the type named (or spelled) by `type_name`.
pub fn encode(registry: &Registry, type_name: &str, value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_to(registry, type_name, value, &mut out)?;
    Ok(out)
}

/// Append the encoding of `value` to `out`.
///
/// On error `out` is left with its original contents.
pub fn encode_to(
    registry: &Registry,
    type_name: &str,
    value: &Value,
    out: &mut Vec<u8>,
) -> Result<()> {
    let root = registry.type_ref(type_name)?;
    let start = out.len();
    let mut encoder = Encoder::new(registry, out, type_name);
    let result = encoder.encode_ref(&root, value);
    if result.is_err() {
        out.truncate(start);
    } else {
        log::trace!(
            "[codec] encoded {} into {} bytes",
            type_name,
            out.len() - start
        );
    }
    result
}

/// Decode exactly one value of `type_name` spanning all of `bytes`.
pub fn decode(registry: &Registry, type_name: &str, bytes: &[u8]) -> Result<Value> {
    let (value, consumed) = decode_prefix(registry, type_name, bytes)?;
    if consumed < bytes.len() {
        return Err(crate::error::CodecError::TrailingBytes {
            type_name: type_name.to_string(),
            consumed,
            remaining: bytes.len() - consumed,
        });
    }
    Ok(value)
}

/// Decode one value from the start of `bytes`.
///
/// Returns the value and the number of bytes it occupied.
pub fn decode_prefix(registry: &Registry, type_name: &str, bytes: &[u8]) -> Result<(Value, usize)> {
    let root = registry.type_ref(type_name)?;
    let mut decoder = Decoder::new(registry, bytes);
    let value = decoder.decode_ref(&root)?;
    log::trace!(
        "[codec] decoded {} from {} of {} bytes",
        type_name,
        decoder.consumed(),
        bytes.len()
    );
    Ok((value, decoder.consumed()))
}

impl Registry {
    /// See [`encode`].
    pub fn encode(&self, type_name: &str, value: &Value) -> Result<Vec<u8>> {
        encode(self, type_name, value)
    }

    /// See [`decode`].
    pub fn decode(&self, type_name: &str, bytes: &[u8]) -> Result<Value> {
        decode(self, type_name, bytes)
    }

    /// See [`decode_prefix`].
    pub fn decode_prefix(&self, type_name: &str, bytes: &[u8]) -> Result<(Value, usize)> {
        decode_prefix(self, type_name, bytes)
    }
}
