// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry: name to descriptor, in declaration order.
//!
//! References between types are by name and resolved on demand, so
//! recursive and mutually recursive types register without cycles in
//! ownership. A registry is built once (usually by the loader) and then
//! only read; `&Registry` can be shared across threads freely.

pub mod builder;
pub mod builtins;
pub mod descriptor;

use crate::error::{CodecError, Result};
use crate::type_spec::parse_type_spec;
use crate::value::IntWidth;
use descriptor::{TypeDescriptor, TypeRef, VariantPayload};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Default bound on codec recursion depth.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Name to descriptor map.
#[derive(Debug, Clone)]
pub struct Registry {
    types: IndexMap<String, TypeDescriptor>,
    max_depth: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Recursion bound used by encode and decode.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, depth: usize) {
        self.max_depth = depth;
    }

    /// Register a type under `name`.
    pub fn register(&mut self, name: impl Into<String>, desc: TypeDescriptor) -> Result<()> {
        let name = name.into();
        if self.types.contains_key(&name) {
            return Err(CodecError::DuplicateType(name));
        }
        self.types.insert(name, desc);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDescriptor)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a registered name.
    pub fn resolve_name(&self, name: &str) -> Result<&TypeDescriptor> {
        self.types
            .get(name)
            .ok_or_else(|| CodecError::unknown_type(name))
    }

    /// Resolve a reference to its descriptor (one step, aliases kept).
    pub fn resolve<'a>(&'a self, r: &'a TypeRef) -> Result<&'a TypeDescriptor> {
        match r {
            TypeRef::Named(name) => self.resolve_name(name),
            TypeRef::Inline(desc) => Ok(desc),
        }
    }

    /// Resolve a reference and follow alias chains to a concrete descriptor.
    pub fn unalias<'a>(&'a self, r: &'a TypeRef) -> Result<&'a TypeDescriptor> {
        let mut desc = self.resolve(r)?;
        // A chain longer than the registry must revisit a name.
        for _ in 0..=self.types.len() {
            match desc {
                TypeDescriptor::Alias(target) => desc = self.resolve(target)?,
                _ => return Ok(desc),
            }
        }
        Err(CodecError::invalid_spec(r.to_string(), "alias cycle"))
    }

    /// Width of the unsigned integer a `Compact<T>` target stands for.
    pub(crate) fn compact_width(&self, inner: &TypeRef) -> Result<IntWidth> {
        let width = match self.unalias(inner)? {
            TypeDescriptor::Primitive(kind) => kind.unsigned_width(),
            _ => None,
        };
        width.ok_or_else(|| {
            CodecError::invalid_spec(
                format!("Compact<{}>", inner),
                "compact target is not an unsigned integer",
            )
        })
    }

    /// Reference for a registered name or any type-spec string.
    pub fn type_ref(&self, name_or_spec: &str) -> Result<TypeRef> {
        if self.contains(name_or_spec) {
            return Ok(TypeRef::named(name_or_spec));
        }
        let r = parse_type_spec(name_or_spec)
            .map_err(|e| CodecError::invalid_spec(name_or_spec, e.to_string()))?;
        if let Some(missing) = r.referenced_names().into_iter().find(|n| !self.contains(n)) {
            return Err(CodecError::unknown_type(missing));
        }
        Ok(r)
    }

    /// Check the whole registry.
    ///
    /// Every name must resolve, struct fields and enum variants must be
    /// unique, alias chains must terminate and every `Compact<T>` must
    /// target an unsigned integer.
    pub fn validate(&self) -> Result<()> {
        for (name, desc) in &self.types {
            if let Some(missing) = desc
                .referenced_names()
                .into_iter()
                .find(|n| !self.contains(n))
            {
                return Err(CodecError::UnknownType {
                    name: missing.to_string(),
                    referenced_by: Some(name.clone()),
                });
            }
            self.check_shape(name, desc)?;
        }

        for name in self.types.keys() {
            self.unalias(&TypeRef::named(name.as_str()))
                .map_err(|_| CodecError::invalid_spec(name.as_str(), "alias cycle"))?;
        }

        for (name, desc) in &self.types {
            self.check_compacts(name, desc)?;
        }

        log::debug!("[registry] validated {} types", self.types.len());
        Ok(())
    }

    fn check_shape(&self, owner: &str, desc: &TypeDescriptor) -> Result<()> {
        match desc {
            TypeDescriptor::Struct(fields) => {
                unique(owner, "field", fields.iter().map(|f| f.name.as_str()))?;
            }
            TypeDescriptor::Enum(e) => {
                unique(owner, "variant", e.variants.iter().map(|v| v.name.as_str()))?;
                let mut seen = HashSet::new();
                for v in &e.variants {
                    if !seen.insert(v.index) {
                        return Err(CodecError::invalid_spec(
                            owner,
                            format!("duplicate discriminant {}", v.index),
                        ));
                    }
                    if let VariantPayload::Struct(fields) = &v.payload {
                        unique(owner, "field", fields.iter().map(|f| f.name.as_str()))?;
                    }
                }
            }
            _ => {}
        }
        for_each_inline(desc, &mut |child| self.check_shape(owner, child))
    }

    fn check_compacts(&self, owner: &str, desc: &TypeDescriptor) -> Result<()> {
        if let TypeDescriptor::Compact(inner) = desc {
            self.compact_width(inner).map_err(|_| {
                CodecError::invalid_spec(
                    owner,
                    format!("Compact<{}> requires an unsigned integer", inner),
                )
            })?;
        }
        for_each_inline(desc, &mut |child| self.check_compacts(owner, child))
    }
}

fn unique<'a>(owner: &str, what: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CodecError::invalid_spec(
                owner,
                format!("duplicate {} {}", what, name),
            ));
        }
    }
    Ok(())
}

/// Visit the inline child descriptors of `desc`.
fn for_each_inline(
    desc: &TypeDescriptor,
    f: &mut dyn FnMut(&TypeDescriptor) -> Result<()>,
) -> Result<()> {
    let mut visit = |r: &TypeRef| match r {
        TypeRef::Inline(child) => f(child),
        TypeRef::Named(_) => Ok(()),
    };
    match desc {
        TypeDescriptor::Primitive(_) => Ok(()),
        TypeDescriptor::Struct(fields) => fields.iter().try_for_each(|fd| visit(&fd.type_ref)),
        TypeDescriptor::Enum(e) => e.variants.iter().try_for_each(|v| match &v.payload {
            VariantPayload::Unit => Ok(()),
            VariantPayload::Single(r) => visit(r),
            VariantPayload::Struct(fields) => {
                fields.iter().try_for_each(|fd| visit(&fd.type_ref))
            }
            VariantPayload::Tuple(refs) => refs.iter().try_for_each(&mut visit),
        }),
        TypeDescriptor::Tuple(refs) => refs.iter().try_for_each(&mut visit),
        TypeDescriptor::Result(ok, err) => {
            visit(ok)?;
            visit(err)
        }
        TypeDescriptor::Sequence(r)
        | TypeDescriptor::FixedArray(r, _)
        | TypeDescriptor::Option(r)
        | TypeDescriptor::Compact(r)
        | TypeDescriptor::Alias(r)
        | TypeDescriptor::Opaque(r) => visit(r),
    }
}
