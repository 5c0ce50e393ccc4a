//! MIND device registry: runtime devices recorded on IR modules.
pub mod device;
pub mod diagnostics;
pub mod ir;
pub mod runtime;

pub use device::{
    add_devices_to_op, get_devices_from_op, get_gpu_device_metadata, DeviceName, DevicesAttrError,
    GpuMetadata, RuntimeDevices, DEVICES_ATTR,
};
pub use ir::{Attribute, IRModule};
pub use runtime::{DeviceAttributes, DeviceSet};
