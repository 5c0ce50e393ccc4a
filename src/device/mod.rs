//! Device registry annotations for IR modules.
//!
//! [`add_devices_to_op`] records the runtime's devices on a module;
//! [`get_devices_from_op`] and [`get_gpu_device_metadata`] read them back for
//! later passes such as placement and kernel selection.

pub mod metadata;
pub mod name;
pub mod registry;

pub use metadata::{
    classify_attr, decode_from_description, encode_empty, encode_gpu, DeviceMetadata, GpuMetadata,
};
pub use name::{DeviceName, DeviceNameError, NameErrorKind};
pub use registry::{
    add_devices_to_op, get_devices_from_op, get_gpu_device_metadata, DevicesAttrError,
    RuntimeDevices, DEVICES_ATTR,
};
