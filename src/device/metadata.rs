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

//! Conversion of per-device metadata to and from IR attributes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ir::{Attribute, DictionaryAttr, GpuDeviceMetadataAttr, IntegerAttr};

/// NVIDIA compute capability of a GPU device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuMetadata {
    pub cc_major: i32,
    pub cc_minor: i32,
}

/// Metadata recorded for one registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMetadata {
    /// No device-specific metadata (`{}`).
    Empty,
    Gpu(GpuMetadata),
    /// Any attribute that is neither of the above.
    Unknown,
}

static COMPUTE_CAPABILITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"compute capability: ([0-9]+)\.([0-9]+)")
        .expect("compute capability pattern is valid")
});

/// Metadata for devices that carry none: an empty dictionary.
pub fn encode_empty() -> Attribute {
    Attribute::Dictionary(DictionaryAttr::new())
}

pub fn encode_gpu(cc_major: i32, cc_minor: i32) -> Attribute {
    Attribute::GpuDeviceMetadata(GpuDeviceMetadataAttr::new(
        IntegerAttr::i32(cc_major),
        IntegerAttr::i32(cc_minor),
    ))
}

impl From<GpuMetadata> for Attribute {
    fn from(meta: GpuMetadata) -> Self {
        encode_gpu(meta.cc_major, meta.cc_minor)
    }
}

/// Extract a compute capability from a free-form GPU description.
///
/// This is a heuristic, not a format: the only recognised pattern is
/// `compute capability: M.N`, with exactly one space after the colon, found
/// anywhere in the text. Values that overflow `i32` yield `None`.
pub fn decode_from_description(desc: &str) -> Option<GpuMetadata> {
    let caps = COMPUTE_CAPABILITY.captures(desc)?;
    let cc_major = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let cc_minor = caps.get(2)?.as_str().parse::<i32>().ok()?;
    Some(GpuMetadata { cc_major, cc_minor })
}

/// Classify a registry value read back from IR.
pub fn classify_attr(attr: &Attribute) -> DeviceMetadata {
    match attr {
        Attribute::Dictionary(dict) if dict.is_empty() => DeviceMetadata::Empty,
        Attribute::GpuDeviceMetadata(meta) => {
            match (meta.cc_major.as_i32(), meta.cc_minor.as_i32()) {
                (Some(cc_major), Some(cc_minor)) => {
                    DeviceMetadata::Gpu(GpuMetadata { cc_major, cc_minor })
                }
                _ => DeviceMetadata::Unknown,
            }
        }
        _ => DeviceMetadata::Unknown,
    }
}
