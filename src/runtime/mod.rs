//! Runtime collaborators for device annotation.
//!
//! This module hosts the device-set surface the runtime hands to the compiler
//! and the TOML manifest used to describe a device set without a live runtime.

pub mod manifest;
pub mod types;

pub use manifest::{load_device_set, DeviceManifest, ManifestDevice};
pub use types::{DeviceAttributes, DeviceKind, DeviceSet};
