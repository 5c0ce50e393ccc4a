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

//! The `tf.devices` module attribute.
//!
//! The registry maps fully qualified device names to metadata:
//!
//! ```text
//! tf.devices = {
//!   "/job:worker/replica:0/task:0/device:CPU:0" = {},
//!   "/job:worker/replica:0/task:0/device:GPU:0" =
//!       #tf.gpu_device_metadata<cc_major = 7 : i32, cc_minor = 0 : i32>
//! }
//! ```
//!
//! Entries keep the order the device set enumerated them in. Only the
//! dictionary shape is accepted on read; arrays of any kind are rejected.

use std::collections::HashMap;

use tracing::debug;

use crate::device::metadata::{
    classify_attr, decode_from_description, encode_empty, encode_gpu, DeviceMetadata, GpuMetadata,
};
use crate::device::name::{DeviceName, DeviceNameError};
use crate::ir::{Attribute, DictionaryAttr, IRModule, NamedAttribute};
use crate::runtime::{DeviceKind, DeviceSet};

/// Name of the module attribute holding the device registry.
pub const DEVICES_ATTR: &str = "tf.devices";

/// Reasons a `tf.devices` attribute is rejected on read.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DevicesAttrError {
    /// The attribute is not a dictionary.
    #[error("'tf.devices' must be a dictionary, found {found}")]
    UnsupportedShape { found: &'static str },
    /// The attribute is an array with an element that is not a device-name string.
    #[error("'tf.devices' must be a dictionary, found array with {found} element at {index}")]
    BadArrayElement { index: usize, found: &'static str },
    /// A registry key is not a valid device name.
    #[error("bad device name '{name}' in 'tf.devices': {source}")]
    InvalidDeviceName {
        name: String,
        #[source]
        source: DeviceNameError,
    },
    /// A registry value is not a recognised metadata record.
    #[error("unknown metadata for device '{device}' in 'tf.devices': found {found}")]
    UnknownMetadata { device: String, found: &'static str },
}

/// Attach the devices of `device_set` to `module` under `tf.devices`.
///
/// With no device set the module is left untouched. Otherwise any previous
/// registry is replaced. GPUs whose description carries a compute capability
/// get a `GpuDeviceMetadata` record; every other device gets `{}`.
pub fn add_devices_to_op(module: &mut IRModule, device_set: Option<&DeviceSet>) {
    let Some(device_set) = device_set else {
        return;
    };

    let entries = device_set.iter().map(|device| {
        let metadata = match device.kind() {
            DeviceKind::Gpu => match decode_from_description(&device.physical_device_desc) {
                Some(meta) => encode_gpu(meta.cc_major, meta.cc_minor),
                None => {
                    debug!(device = %device.name, "no compute capability in GPU description");
                    encode_empty()
                }
            },
            _ => encode_empty(),
        };
        NamedAttribute::new(device.name.clone(), metadata)
    });
    let registry = DictionaryAttr::from_entries(entries);

    debug!(devices = registry.len(), "attaching device registry");
    module.set_attr(DEVICES_ATTR, Attribute::Dictionary(registry));
}

/// Parse the devices listed under `tf.devices` and append them to `devices`.
///
/// A module without the attribute succeeds and leaves `devices` unchanged.
/// On failure nothing is appended.
pub fn get_devices_from_op(
    module: &IRModule,
    devices: &mut Vec<DeviceName>,
) -> Result<(), DevicesAttrError> {
    let Some(attr) = module.get_attr(DEVICES_ATTR) else {
        return Ok(());
    };
    let parsed = read_registry(attr).map_err(|err| {
        debug!(error = %err, "rejecting device registry");
        err
    })?;
    devices.extend(parsed.into_iter().map(|(name, _)| name));
    Ok(())
}

/// Look up the GPU metadata recorded for `device`.
///
/// Names are compared exactly: a field unspecified in `device` only matches an
/// entry that leaves the same field unspecified. Entries with unparsable keys
/// or non-GPU metadata are skipped.
pub fn get_gpu_device_metadata(module: &IRModule, device: &DeviceName) -> Option<GpuMetadata> {
    let registry = module.get_attr(DEVICES_ATTR)?.as_dictionary()?;
    registry
        .iter()
        .filter(|entry| DeviceName::parse(&entry.name).is_ok_and(|name| name == *device))
        .find_map(|entry| match classify_attr(&entry.value) {
            DeviceMetadata::Gpu(meta) => Some(meta),
            DeviceMetadata::Empty | DeviceMetadata::Unknown => None,
        })
}

fn read_registry(attr: &Attribute) -> Result<Vec<(DeviceName, DeviceMetadata)>, DevicesAttrError> {
    match attr {
        Attribute::Dictionary(dict) => dict
            .iter()
            .map(|entry| {
                let name = parse_key(&entry.name)?;
                match classify_attr(&entry.value) {
                    DeviceMetadata::Unknown => Err(DevicesAttrError::UnknownMetadata {
                        device: entry.name.clone(),
                        found: entry.value.kind(),
                    }),
                    metadata => Ok((name, metadata)),
                }
            })
            .collect(),
        Attribute::Array(elements) => {
            match elements
                .iter()
                .enumerate()
                .find(|(_, element)| !matches!(element, Attribute::String(_)))
            {
                Some((index, element)) => Err(DevicesAttrError::BadArrayElement {
                    index,
                    found: element.kind(),
                }),
                None => Err(DevicesAttrError::UnsupportedShape {
                    found: attr.kind(),
                }),
            }
        }
        other => Err(DevicesAttrError::UnsupportedShape {
            found: other.kind(),
        }),
    }
}

fn parse_key(name: &str) -> Result<DeviceName, DevicesAttrError> {
    DeviceName::parse(name).map_err(|source| DevicesAttrError::InvalidDeviceName {
        name: name.to_string(),
        source,
    })
}

/// Validated read-side view of a module's device registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeDevices {
    names: Vec<DeviceName>,
    gpu_metadata: HashMap<DeviceName, GpuMetadata>,
}

impl RuntimeDevices {
    /// Read and validate `tf.devices`; an absent attribute yields no devices.
    pub fn from_module(module: &IRModule) -> Result<Self, DevicesAttrError> {
        let mut devices = RuntimeDevices::default();
        let Some(attr) = module.get_attr(DEVICES_ATTR) else {
            return Ok(devices);
        };
        for (name, metadata) in read_registry(attr)? {
            if let DeviceMetadata::Gpu(meta) = metadata {
                devices.gpu_metadata.entry(name.clone()).or_insert(meta);
            }
            devices.names.push(name);
        }
        Ok(devices)
    }

    pub fn device_names(&self) -> &[DeviceName] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn gpu_metadata(&self, device: &DeviceName) -> Option<GpuMetadata> {
        self.gpu_metadata.get(device).copied()
    }

    /// Registered devices matching a possibly partial specification.
    pub fn matching<'a>(
        &'a self,
        spec: &DeviceName,
    ) -> impl Iterator<Item = &'a DeviceName> + 'a {
        let spec = spec.clone();
        self.names.iter().filter(move |name| name.matches(&spec))
    }
}
