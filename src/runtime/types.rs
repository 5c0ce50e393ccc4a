//! Runtime-side device records consumed when annotating modules.
//!
//! The compiler never discovers devices itself. Whatever runtime hosts it hands
//! over a [`DeviceSet`] describing the devices it found, in the order it found
//! them.

use crate::device::{DeviceName, DeviceNameError};

/// Broad class of a runtime device, derived from its device type string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Cpu,
    Gpu,
    Tpu,
    /// Any other device type (`XLA_CPU`, `TPU_SYSTEM`, ...).
    Other,
}

impl DeviceKind {
    pub fn from_device_type(device_type: &str) -> Self {
        match device_type {
            "CPU" => DeviceKind::Cpu,
            "GPU" => DeviceKind::Gpu,
            "TPU" => DeviceKind::Tpu,
            _ => DeviceKind::Other,
        }
    }
}

/// Attributes the runtime reports for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAttributes {
    /// Fully qualified device name.
    pub name: String,
    /// Device type, e.g. `CPU` or `GPU`.
    pub device_type: String,
    /// Free-form description; for GPUs it usually includes the compute capability.
    pub physical_device_desc: String,
}

impl DeviceAttributes {
    pub fn new(
        name: impl Into<String>,
        device_type: impl Into<String>,
        physical_device_desc: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            device_type: device_type.into(),
            physical_device_desc: physical_device_desc.into(),
        }
    }

    /// Build attributes whose device type is taken from the parsed `name`.
    pub fn from_name(
        name: impl Into<String>,
        physical_device_desc: impl Into<String>,
    ) -> Result<Self, DeviceNameError> {
        let name = name.into();
        let parsed = DeviceName::parse(&name)?;
        Ok(Self {
            device_type: parsed.device_type.unwrap_or_default(),
            name,
            physical_device_desc: physical_device_desc.into(),
        })
    }

    pub fn kind(&self) -> DeviceKind {
        DeviceKind::from_device_type(&self.device_type)
    }
}

/// Ordered collection of runtime devices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSet {
    devices: Vec<DeviceAttributes>,
}

impl DeviceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&mut self, device: DeviceAttributes) {
        self.devices.push(device);
    }

    pub fn devices(&self) -> &[DeviceAttributes] {
        &self.devices
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeviceAttributes> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&DeviceAttributes> {
        self.devices.iter().find(|device| device.name == name)
    }
}

impl FromIterator<DeviceAttributes> for DeviceSet {
    fn from_iter<T: IntoIterator<Item = DeviceAttributes>>(iter: T) -> Self {
        Self {
            devices: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DeviceSet {
    type Item = &'a DeviceAttributes;
    type IntoIter = std::slice::Iter<'a, DeviceAttributes>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}
