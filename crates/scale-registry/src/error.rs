// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by the registry, the loader and the codec.
//!
//! Load-time kinds (`DuplicateType`, `UnknownType`, `InvalidSpec`, `Io`,
//! `Parse`) are raised before any byte is touched. Codec-time kinds carry
//! enough context to be actionable: decode errors name the type being read
//! and the byte offset, encode errors name the field path of the value.

use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors for registry construction and SCALE encode/decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A type with this name is already registered.
    DuplicateType(String),
    /// A name reference does not resolve.
    UnknownType {
        name: String,
        /// Type whose descriptor holds the dangling reference, if known.
        referenced_by: Option<String>,
    },
    /// Malformed table entry or type-spec string.
    InvalidSpec { type_name: String, reason: String },
    /// Buffer ended before the type was fully read.
    Truncated {
        type_name: String,
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// Value shape does not fit the descriptor.
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },
    /// Discriminant or variant name with no constructible variant.
    UnknownVariant {
        type_name: String,
        variant: String,
        /// Byte offset of the discriminant (decode only).
        offset: Option<usize>,
    },
    /// Bytes are present but not a valid encoding of the type.
    InvalidValue {
        type_name: String,
        offset: usize,
        reason: String,
    },
    /// Top-level decode finished before the end of the buffer.
    TrailingBytes {
        type_name: String,
        consumed: usize,
        remaining: usize,
    },
    /// Nesting exceeded the registry's depth bound.
    DepthLimit { type_name: String, limit: usize },
    /// Table file could not be read.
    Io(String),
    /// Table text is not valid JSON/YAML.
    Parse(String),
}

impl CodecError {
    /// Shorthand for `InvalidSpec`.
    pub(crate) fn invalid_spec(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an `UnknownType` with no referencing context.
    pub(crate) fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType {
            name: name.into(),
            referenced_by: None,
        }
    }

    /// True for errors raised while building or validating a registry.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateType(_)
                | Self::UnknownType { .. }
                | Self::InvalidSpec { .. }
                | Self::Io(_)
                | Self::Parse(_)
        )
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateType(name) => write!(f, "type already registered: {}", name),
            Self::UnknownType {
                name,
                referenced_by: Some(owner),
            } => write!(f, "unknown type {} (referenced by {})", name, owner),
            Self::UnknownType {
                name,
                referenced_by: None,
            } => write!(f, "unknown type {}", name),
            Self::InvalidSpec { type_name, reason } => {
                write!(f, "invalid spec for {}: {}", type_name, reason)
            }
            Self::Truncated {
                type_name,
                offset,
                needed,
                available,
            } => write!(
                f,
                "truncated input decoding {} at offset {}: need {} bytes, have {}",
                type_name, offset, needed, available
            ),
            Self::TypeMismatch {
                path,
                expected,
                found,
            } => write!(
                f,
                "type mismatch at {}: expected {}, found {}",
                path, expected, found
            ),
            Self::UnknownVariant {
                type_name,
                variant,
                offset: Some(offset),
            } => write!(
                f,
                "unknown variant {} of {} at offset {}",
                variant, type_name, offset
            ),
            Self::UnknownVariant {
                type_name,
                variant,
                offset: None,
            } => write!(f, "unknown variant {} of {}", variant, type_name),
            Self::InvalidValue {
                type_name,
                offset,
                reason,
            } => write!(
                f,
                "invalid {} at offset {}: {}",
                type_name, offset, reason
            ),
            Self::TrailingBytes {
                type_name,
                consumed,
                remaining,
            } => write!(
                f,
                "{} consumed {} bytes, {} trailing bytes left",
                type_name, consumed, remaining
            ),
            Self::DepthLimit { type_name, limit } => {
                write!(f, "nesting deeper than {} levels in {}", limit, type_name)
            }
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Parse(msg) => write!(f, "table parse error: {}", msg),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

#[cfg(feature = "yaml")]
impl From<serde_yaml::Error> for CodecError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = CodecError::Truncated {
            type_name: "Pair".into(),
            offset: 1,
            needed: 1,
            available: 0,
        };
        let msg = err.to_string();
        assert!(msg.contains("Pair"));
        assert!(msg.contains("offset 1"));

        let err = CodecError::UnknownType {
            name: "Missing".into(),
            referenced_by: Some("Holder".into()),
        };
        assert_eq!(err.to_string(), "unknown type Missing (referenced by Holder)");
    }

    #[test]
    fn test_load_error_classification() {
        assert!(CodecError::DuplicateType("A".into()).is_load_error());
        assert!(CodecError::invalid_spec("A", "bad").is_load_error());
        assert!(!CodecError::TypeMismatch {
            path: "A.b".into(),
            expected: "bool".into(),
            found: "text".into(),
        }
        .is_load_error());
    }
}
