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

use std::collections::BTreeSet;

use crate::ir::{Attribute, DictionaryAttr, IRModule, IntegerAttr};

/// Structured errors returned by the attribute verifier.
///
/// `path` names the offending attribute as a dotted chain of dictionary keys
/// and `[index]` array positions, starting at the module attribute table.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IrVerifyError {
    /// A dictionary contains the same key more than once.
    #[error("duplicate attribute name '{name}' in {path}")]
    DuplicateName { path: String, name: String },
    /// An attribute name is the empty string.
    #[error("empty attribute name in {path}")]
    EmptyName { path: String },
    /// An integer attribute does not fit in its declared bit width.
    #[error("integer {value} does not fit in i{width} at {path}")]
    IntegerOverflow { path: String, value: i64, width: u32 },
}

/// Verify that every attribute attached to an [`IRModule`] is well-formed.
///
/// The verifier walks nested dictionaries and arrays and rejects duplicate or
/// empty keys as well as integers wider than their declared width. It returns
/// the first problem found rather than panicking.
pub fn verify_module(module: &IRModule) -> Result<(), IrVerifyError> {
    verify_dictionary("module", module.attrs())
}

fn verify_dictionary(path: &str, dict: &DictionaryAttr) -> Result<(), IrVerifyError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for entry in dict {
        if entry.name.is_empty() {
            return Err(IrVerifyError::EmptyName {
                path: path.to_string(),
            });
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(IrVerifyError::DuplicateName {
                path: path.to_string(),
                name: entry.name.clone(),
            });
        }
        verify_attribute(&format!("{}.{}", path, entry.name), &entry.value)?;
    }
    Ok(())
}

fn verify_attribute(path: &str, attr: &Attribute) -> Result<(), IrVerifyError> {
    match attr {
        Attribute::Unit | Attribute::Bool(_) | Attribute::String(_) => Ok(()),
        Attribute::Integer(int) => verify_integer(path, int),
        Attribute::Array(elements) => {
            for (idx, element) in elements.iter().enumerate() {
                verify_attribute(&format!("{}[{}]", path, idx), element)?;
            }
            Ok(())
        }
        Attribute::Dictionary(dict) => verify_dictionary(path, dict),
        Attribute::GpuDeviceMetadata(meta) => {
            verify_integer(&format!("{}.cc_major", path), &meta.cc_major)?;
            verify_integer(&format!("{}.cc_minor", path), &meta.cc_minor)
        }
    }
}

fn verify_integer(path: &str, int: &IntegerAttr) -> Result<(), IrVerifyError> {
    if int.fits_width() {
        Ok(())
    } else {
        Err(IrVerifyError::IntegerOverflow {
            path: path.to_string(),
            value: int.value,
            width: int.width,
        })
    }
}
