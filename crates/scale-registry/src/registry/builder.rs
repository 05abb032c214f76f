// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for struct and enum descriptors.

use super::descriptor::{
    EnumDescriptor, EnumVariant, FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeRef,
    VariantPayload, RESERVED_VARIANT_PREFIX,
};

/// Builder for struct descriptors.
#[derive(Debug, Default)]
pub struct StructBuilder {
    fields: Vec<FieldDescriptor>,
}

impl StructBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a primitive field.
    pub fn field(mut self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.fields.push(FieldDescriptor::new(name, kind));
        self
    }

    /// Add a field referencing a registered type.
    pub fn named_field(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, TypeRef::named(type_name)));
        self
    }

    /// Add a field with an arbitrary type reference.
    pub fn field_with_type(mut self, name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Self {
        self.fields.push(FieldDescriptor::new(name, type_ref));
        self
    }

    /// Add a `Vec<T>` field.
    pub fn sequence_field(mut self, name: impl Into<String>, element: impl Into<TypeRef>) -> Self {
        self.fields.push(FieldDescriptor::new(
            name,
            TypeDescriptor::Sequence(element.into()),
        ));
        self
    }

    /// Add a `Compact<T>` field.
    pub fn compact_field(mut self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.fields.push(FieldDescriptor::new(
            name,
            TypeDescriptor::Compact(kind.into()),
        ));
        self
    }

    pub fn into_fields(self) -> Vec<FieldDescriptor> {
        self.fields
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::Struct(self.fields)
    }
}

/// Builder for enum descriptors.
///
/// Discriminants follow declaration position unless set with [`EnumBuilder::at`].
#[derive(Debug, Default)]
pub struct EnumBuilder {
    variants: Vec<EnumVariant>,
    next_index: u16,
}

impl EnumBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, name: String, payload: VariantPayload) -> Self {
        // Past 255 the slot saturates; Registry::validate reports the duplicate.
        let index = u8::try_from(self.next_index).unwrap_or(u8::MAX);
        self.variants.push(EnumVariant::new(name, index, payload));
        self.next_index = self.next_index.saturating_add(1);
        self
    }

    /// Add a unit variant.
    pub fn unit(self, name: impl Into<String>) -> Self {
        self.push(name.into(), VariantPayload::Unit)
    }

    /// Occupy the next discriminant with a `__UnusedN` placeholder.
    pub fn reserved(self) -> Self {
        let name = format!("{}{}", RESERVED_VARIANT_PREFIX, self.next_index);
        self.push(name, VariantPayload::Unit)
    }

    /// Add a variant with a single payload type.
    pub fn single(self, name: impl Into<String>, payload: impl Into<TypeRef>) -> Self {
        self.push(name.into(), VariantPayload::Single(payload.into()))
    }

    /// Add a variant with named fields.
    pub fn with_fields(self, name: impl Into<String>, fields: StructBuilder) -> Self {
        self.push(name.into(), VariantPayload::Struct(fields.into_fields()))
    }

    /// Add a variant with a tuple payload.
    pub fn tuple(self, name: impl Into<String>, elements: Vec<TypeRef>) -> Self {
        self.push(name.into(), VariantPayload::Tuple(elements))
    }

    /// Set the discriminant of the next variant.
    pub fn at(mut self, index: u8) -> Self {
        self.next_index = u16::from(index);
        self
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::Enum(EnumDescriptor::new(self.variants))
    }
}
