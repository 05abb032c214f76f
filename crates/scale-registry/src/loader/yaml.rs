// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML lookup tables and loader options.
//!
//! # Example YAML
//!
//! ```yaml
//! # runtime.yaml
//! Pair:
//!   a: u8
//!   b: bool
//! Flag:
//!   _enum: [Off, On]
//! Balance: u128
//! ```
//!
//! Mapping order is kept, so field and variant order follow the document.

use super::{load_registry_with, LoaderOptions};
use crate::error::{CodecError, Result};
use crate::registry::Registry;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;

/// Parse YAML text into the table representation the loader consumes.
pub fn parse_yaml(text: &str) -> Result<JsonValue> {
    Ok(serde_yaml::from_str(text)?)
}

impl Registry {
    /// Load a registry from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Self::from_yaml_str_with(text, &LoaderOptions::default())
    }

    pub fn from_yaml_str_with(text: &str, options: &LoaderOptions) -> Result<Self> {
        load_registry_with(&parse_yaml(text)?, options)
    }
}

impl LoaderOptions {
    /// Parse options from YAML text; missing keys keep their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| CodecError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }
}
