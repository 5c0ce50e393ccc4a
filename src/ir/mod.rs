// Copyright 2025 STARGA Inc.
// Licensed under the Apache License, Version 2.0 (the “License”);
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at:
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an “AS IS” BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Part of the MIND project (Machine Intelligence Native Design).

//! Attribute model for MIND IR modules.
//!
//! Attributes are immutable, structurally typed values attached by name to a
//! module. Dictionaries keep their entries in insertion order so that passes
//! iterating a registry see the same order the writer used.

mod print;
mod verify;

pub use print::{format_attribute, format_ir_module};
pub use verify::{verify_module, IrVerifyError};

use std::fmt;

/// Integer attribute with an explicit bit width (`7 : i32`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerAttr {
    pub value: i64,
    pub width: u32,
}

impl IntegerAttr {
    pub fn i32(value: i32) -> Self {
        Self {
            value: i64::from(value),
            width: 32,
        }
    }

    pub fn i64(value: i64) -> Self {
        Self { value, width: 64 }
    }

    /// Returns the value when it is representable as an `i32`.
    pub fn as_i32(&self) -> Option<i32> {
        i32::try_from(self.value).ok()
    }

    /// Whether `value` fits in a signed integer of `width` bits.
    pub fn fits_width(&self) -> bool {
        match self.width {
            0 => false,
            w if w >= 64 => true,
            w => {
                let min = -(1i64 << (w - 1));
                let max = (1i64 << (w - 1)) - 1;
                (min..=max).contains(&self.value)
            }
        }
    }
}

/// Typed attribute of the `tf` dialect carrying a GPU compute capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuDeviceMetadataAttr {
    pub cc_major: IntegerAttr,
    pub cc_minor: IntegerAttr,
}

impl GpuDeviceMetadataAttr {
    pub fn new(cc_major: IntegerAttr, cc_minor: IntegerAttr) -> Self {
        Self { cc_major, cc_minor }
    }
}

/// A single `name = value` entry of a dictionary attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedAttribute {
    pub name: String,
    pub value: Attribute,
}

impl NamedAttribute {
    pub fn new(name: impl Into<String>, value: Attribute) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Insertion-ordered dictionary of named attributes.
///
/// [`DictionaryAttr::insert`] replaces an existing entry in place. Building a
/// dictionary from raw entries does not deduplicate; [`verify_module`] reports
/// duplicate names instead.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DictionaryAttr {
    entries: Vec<NamedAttribute>,
}

impl DictionaryAttr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = NamedAttribute>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry with the given name.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace `name`. Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: Attribute) -> Option<Attribute> {
        let name = name.into();
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => Some(std::mem::replace(&mut entry.value, value)),
            None => {
                self.entries.push(NamedAttribute { name, value });
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        let pos = self.entries.iter().position(|entry| entry.name == name)?;
        Some(self.entries.remove(pos).value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedAttribute> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a DictionaryAttr {
    type Item = &'a NamedAttribute;
    type IntoIter = std::slice::Iter<'a, NamedAttribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<NamedAttribute> for DictionaryAttr {
    fn from_iter<T: IntoIterator<Item = NamedAttribute>>(iter: T) -> Self {
        Self::from_entries(iter)
    }
}

/// Attribute values understood by the MIND IR.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Unit,
    Bool(bool),
    Integer(IntegerAttr),
    String(String),
    Array(Vec<Attribute>),
    Dictionary(DictionaryAttr),
    GpuDeviceMetadata(GpuDeviceMetadataAttr),
}

impl Attribute {
    pub fn bool(value: bool) -> Self {
        Attribute::Bool(value)
    }

    pub fn i32(value: i32) -> Self {
        Attribute::Integer(IntegerAttr::i32(value))
    }

    pub fn i32_array(values: &[i32]) -> Self {
        Attribute::Array(values.iter().copied().map(Attribute::i32).collect())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Attribute::String(value.into())
    }

    pub fn string_array<S: AsRef<str>>(values: &[S]) -> Self {
        Attribute::Array(
            values
                .iter()
                .map(|value| Attribute::string(value.as_ref()))
                .collect(),
        )
    }

    pub fn dictionary(entries: impl IntoIterator<Item = NamedAttribute>) -> Self {
        Attribute::Dictionary(DictionaryAttr::from_entries(entries))
    }

    /// Short name of the attribute kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Attribute::Unit => "unit",
            Attribute::Bool(_) => "bool",
            Attribute::Integer(_) => "integer",
            Attribute::String(_) => "string",
            Attribute::Array(_) => "array",
            Attribute::Dictionary(_) => "dictionary",
            Attribute::GpuDeviceMetadata(_) => "gpu_device_metadata",
        }
    }

    pub fn as_dictionary(&self) -> Option<&DictionaryAttr> {
        match self {
            Attribute::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_gpu_device_metadata(&self) -> Option<&GpuDeviceMetadataAttr> {
        match self {
            Attribute::GpuDeviceMetadata(meta) => Some(meta),
            _ => None,
        }
    }
}

/// Top-level IR container carrying named attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IRModule {
    pub name: Option<String>,
    attrs: DictionaryAttr,
}

impl IRModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            attrs: DictionaryAttr::new(),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.get(name)
    }

    /// Attach `value` under `name`, replacing any previous value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: Attribute) {
        self.attrs.insert(name, value);
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<Attribute> {
        self.attrs.remove(name)
    }

    pub fn attrs(&self) -> &DictionaryAttr {
        &self.attrs
    }
}

impl fmt::Display for IRModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_ir_module(self))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_attribute(self))
    }
}
