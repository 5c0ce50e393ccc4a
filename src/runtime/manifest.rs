// Copyright 2025 STARGA Inc.
// Licensed under the Apache License, Version 2.0 (the “License”);
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at:
//     http://www.apache.org/licenses/LICENSE-2.0

//! Device manifests: a TOML description of a device set.
//!
//! ```toml
//! [[device]]
//! name = "/job:worker/replica:0/task:0/device:GPU:0"
//! physical_device_desc = "compute capability: 8.0"
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::device::DeviceName;
use crate::runtime::types::{DeviceAttributes, DeviceSet};

/// Manifest listing the devices of one runtime.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct DeviceManifest {
    #[serde(default, rename = "device")]
    pub devices: Vec<ManifestDevice>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ManifestDevice {
    pub name: String,
    /// Defaults to the type in `name` when omitted; must agree with it otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub physical_device_desc: String,
}

impl DeviceManifest {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid device manifest")
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate every entry and build the device set in manifest order.
    pub fn into_device_set(self) -> Result<DeviceSet> {
        let mut seen = BTreeSet::new();
        let mut set = DeviceSet::new();
        for device in self.devices {
            let parsed = DeviceName::parse(&device.name)
                .with_context(|| format!("bad device name '{}'", device.name))?;
            if !seen.insert(device.name.clone()) {
                return Err(anyhow!("device '{}' listed more than once", device.name));
            }
            let device_type = match (device.device_type, parsed.device_type) {
                (Some(explicit), Some(from_name)) if explicit != from_name => {
                    return Err(anyhow!(
                        "device '{}' has device_type '{}' but its name says '{}'",
                        device.name,
                        explicit,
                        from_name
                    ))
                }
                (Some(explicit), _) => explicit,
                (None, Some(from_name)) => from_name,
                (None, None) => {
                    return Err(anyhow!(
                        "device '{}' has no device type; set device_type or use device:<TYPE>",
                        device.name
                    ))
                }
            };
            set.add_device(DeviceAttributes::new(
                device.name,
                device_type,
                device.physical_device_desc,
            ));
        }
        Ok(set)
    }
}

impl From<&DeviceSet> for DeviceManifest {
    fn from(set: &DeviceSet) -> Self {
        Self {
            devices: set
                .iter()
                .map(|device| ManifestDevice {
                    name: device.name.clone(),
                    device_type: Some(device.device_type.clone()),
                    physical_device_desc: device.physical_device_desc.clone(),
                })
                .collect(),
        }
    }
}

/// Read a TOML device manifest from `path` and build its device set.
pub fn load_device_set(path: impl AsRef<Path>) -> Result<DeviceSet> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read device manifest {}", path.display()))?;
    DeviceManifest::from_toml(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?
        .into_device_set()
        .with_context(|| format!("invalid devices in {}", path.display()))
}
