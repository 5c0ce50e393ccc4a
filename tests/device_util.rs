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

use mind_devices::device::{
    add_devices_to_op, encode_empty, encode_gpu, get_devices_from_op, get_gpu_device_metadata,
    DeviceName, DevicesAttrError, GpuMetadata, NameErrorKind, RuntimeDevices, DEVICES_ATTR,
};
use mind_devices::ir::{Attribute, GpuDeviceMetadataAttr, IRModule, IntegerAttr, NamedAttribute};
use mind_devices::runtime::{DeviceAttributes, DeviceSet};

const CPU0: &str = "/job:worker/replica:0/task:0/device:CPU:0";
const GPU0: &str = "/job:worker/replica:1/task:2/device:GPU:0";
const GPU1: &str = "/job:worker/replica:1/task:2/device:GPU:1";

fn fake_device(name: &str, desc: &str) -> DeviceAttributes {
    DeviceAttributes::from_name(name, desc).expect("valid device name")
}

fn mixed_device_set() -> DeviceSet {
    [
        fake_device(CPU0, ""),
        fake_device(GPU0, "compute capability: 7.0"),
        fake_device(GPU1, ""),
    ]
    .into_iter()
    .collect()
}

fn parse(name: &str) -> DeviceName {
    DeviceName::parse(name).expect("valid device name")
}

#[test]
fn add_devices_to_op_records_cpu_and_gpu_metadata() {
    let mut module = IRModule::new();
    let device_set = mixed_device_set();
    add_devices_to_op(&mut module, Some(&device_set));

    let devices = module
        .get_attr(DEVICES_ATTR)
        .and_then(Attribute::as_dictionary)
        .expect("tf.devices dictionary");
    assert_eq!(devices.len(), 3);

    // CPU devices carry empty metadata.
    let cpu_meta = devices
        .get(CPU0)
        .and_then(Attribute::as_dictionary)
        .expect("cpu metadata");
    assert!(cpu_meta.is_empty());

    let gpu_meta = devices
        .get(GPU0)
        .and_then(Attribute::as_gpu_device_metadata)
        .expect("gpu metadata");
    assert_eq!(gpu_meta.cc_major.value, 7);
    assert_eq!(gpu_meta.cc_minor.value, 0);

    // A GPU without a description falls back to empty metadata.
    let bare_gpu = devices
        .get(GPU1)
        .and_then(Attribute::as_dictionary)
        .expect("bare gpu metadata");
    assert!(bare_gpu.is_empty());
}

#[test]
fn add_devices_to_op_keeps_device_set_order() {
    let names = [GPU1, CPU0, GPU0];
    let device_set: DeviceSet = names.iter().map(|name| fake_device(name, "")).collect();
    let mut module = IRModule::new();
    add_devices_to_op(&mut module, Some(&device_set));

    let devices = module
        .get_attr(DEVICES_ATTR)
        .and_then(Attribute::as_dictionary)
        .expect("tf.devices dictionary");
    let keys: Vec<&str> = devices.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(keys, names);
}

#[test]
fn add_devices_to_op_with_no_device_set_leaves_module_untouched() {
    let mut module = IRModule::new();
    add_devices_to_op(&mut module, None);
    assert!(module.get_attr(DEVICES_ATTR).is_none());
    assert_eq!(module, IRModule::new());
}

#[test]
fn add_devices_to_op_is_idempotent_and_replaces_previous_registry() {
    let device_set = mixed_device_set();

    let mut once = IRModule::new();
    add_devices_to_op(&mut once, Some(&device_set));

    let mut twice = IRModule::new();
    twice.set_attr(DEVICES_ATTR, Attribute::bool(true));
    add_devices_to_op(&mut twice, Some(&device_set));
    add_devices_to_op(&mut twice, Some(&device_set));

    assert_eq!(once.get_attr(DEVICES_ATTR), twice.get_attr(DEVICES_ATTR));
}

#[test]
fn non_gpu_devices_ignore_capability_in_description() {
    let device_set: DeviceSet = [fake_device(
        "/job:worker/replica:0/task:0/device:TPU:0",
        "compute capability: 7.0",
    )]
    .into_iter()
    .collect();
    let mut module = IRModule::new();
    add_devices_to_op(&mut module, Some(&device_set));

    let devices = module
        .get_attr(DEVICES_ATTR)
        .and_then(Attribute::as_dictionary)
        .expect("tf.devices dictionary");
    assert_eq!(
        devices.get("/job:worker/replica:0/task:0/device:TPU:0"),
        Some(&encode_empty())
    );
}

#[test]
fn round_trip_through_module_preserves_names() {
    let device_set = mixed_device_set();
    let mut module = IRModule::new();
    add_devices_to_op(&mut module, Some(&device_set));

    let mut devices = Vec::new();
    get_devices_from_op(&module, &mut devices).expect("registry reads back");
    let printed: Vec<String> = devices.iter().map(ToString::to_string).collect();
    assert_eq!(printed, [CPU0, GPU0, GPU1]);
}

#[test]
fn get_devices_from_op_without_attribute_succeeds() {
    let module = IRModule::new();
    let mut devices = Vec::new();
    assert!(get_devices_from_op(&module, &mut devices).is_ok());
    assert!(devices.is_empty());
}

#[test]
fn get_devices_from_op_rejects_bool_attribute() {
    let mut module = IRModule::new();
    module.set_attr(DEVICES_ATTR, Attribute::bool(false));

    let mut devices = Vec::new();
    let err = get_devices_from_op(&module, &mut devices).unwrap_err();
    assert_eq!(err, DevicesAttrError::UnsupportedShape { found: "bool" });
}

#[test]
fn get_devices_from_op_rejects_integer_array() {
    let mut module = IRModule::new();
    module.set_attr(DEVICES_ATTR, Attribute::i32_array(&[8]));

    let mut devices = Vec::new();
    let err = get_devices_from_op(&module, &mut devices).unwrap_err();
    assert_eq!(
        err,
        DevicesAttrError::BadArrayElement {
            index: 0,
            found: "integer"
        }
    );
}

#[test]
fn get_devices_from_op_rejects_string_array() {
    let mut module = IRModule::new();
    module.set_attr(DEVICES_ATTR, Attribute::string_array(&[CPU0, GPU0]));

    let mut devices = Vec::new();
    let err = get_devices_from_op(&module, &mut devices).unwrap_err();
    assert_eq!(err, DevicesAttrError::UnsupportedShape { found: "array" });
    assert!(devices.is_empty());

    module.set_attr(DEVICES_ATTR, Attribute::string_array::<&str>(&[]));
    assert!(get_devices_from_op(&module, &mut devices).is_err());
    assert!(RuntimeDevices::from_module(&module).is_err());
}

#[test]
fn get_devices_from_op_rejects_bad_device_name() {
    let mut module = IRModule::new();
    module.set_attr(
        DEVICES_ATTR,
        Attribute::dictionary([NamedAttribute::new("bad_device", encode_empty())]),
    );

    let mut devices = Vec::new();
    let err = get_devices_from_op(&module, &mut devices).unwrap_err();
    match err {
        DevicesAttrError::InvalidDeviceName { name, source } => {
            assert_eq!(name, "bad_device");
            assert_eq!(source.kind, NameErrorKind::MissingLeadingSlash);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn get_devices_from_op_rejects_unknown_metadata() {
    let mut module = IRModule::new();
    module.set_attr(
        DEVICES_ATTR,
        Attribute::dictionary([NamedAttribute::new(CPU0, Attribute::i32(3))]),
    );

    let mut devices = Vec::new();
    let err = get_devices_from_op(&module, &mut devices).unwrap_err();
    assert!(matches!(err, DevicesAttrError::UnknownMetadata { .. }));
}

#[test]
fn get_devices_from_op_is_all_or_nothing() {
    let mut module = IRModule::new();
    module.set_attr(
        DEVICES_ATTR,
        Attribute::dictionary([
            NamedAttribute::new(CPU0, encode_empty()),
            NamedAttribute::new("/job:worker/oops", encode_empty()),
        ]),
    );

    let existing = parse(GPU1);
    let mut devices = vec![existing.clone()];
    assert!(get_devices_from_op(&module, &mut devices).is_err());
    assert_eq!(devices, vec![existing]);
}

#[test]
fn get_devices_from_op_appends_valid_device() {
    let mut module = IRModule::new();
    module.set_attr(
        DEVICES_ATTR,
        Attribute::dictionary([NamedAttribute::new(CPU0, encode_empty())]),
    );

    let mut devices = vec![parse(GPU0)];
    get_devices_from_op(&module, &mut devices).expect("valid registry");
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[1].to_string(), CPU0);
}

#[test]
fn get_gpu_device_metadata_finds_exact_match_only() {
    let gpu0 = "/job:worker/replica:0/task:0/device:GPU:0";
    let gpu1 = "/job:worker/replica:0/task:0/device:GPU:1";

    let mut module = IRModule::new();
    module.set_attr(
        DEVICES_ATTR,
        Attribute::dictionary([NamedAttribute::new(
            gpu0,
            Attribute::GpuDeviceMetadata(GpuDeviceMetadataAttr::new(
                IntegerAttr::i32(1),
                IntegerAttr::i32(2),
            )),
        )]),
    );

    assert_eq!(
        get_gpu_device_metadata(&module, &parse(gpu0)),
        Some(GpuMetadata {
            cc_major: 1,
            cc_minor: 2
        })
    );
    assert_eq!(get_gpu_device_metadata(&module, &parse(gpu1)), None);
    // Partial names do not act as wildcards.
    assert_eq!(
        get_gpu_device_metadata(&module, &parse("/job:worker/device:GPU:0")),
        None
    );
}

#[test]
fn get_gpu_device_metadata_skips_non_gpu_and_bad_entries() {
    let mut module = IRModule::new();
    module.set_attr(
        DEVICES_ATTR,
        Attribute::dictionary([
            NamedAttribute::new("not a device", encode_gpu(9, 9)),
            NamedAttribute::new(GPU0, encode_empty()),
            NamedAttribute::new(GPU1, encode_gpu(8, 6)),
        ]),
    );

    assert_eq!(get_gpu_device_metadata(&module, &parse(GPU0)), None);
    assert_eq!(
        get_gpu_device_metadata(&module, &parse(GPU1)),
        Some(GpuMetadata {
            cc_major: 8,
            cc_minor: 6
        })
    );
}

#[test]
fn get_gpu_device_metadata_skips_unknown_metadata() {
    let mut module = IRModule::new();
    module.set_attr(
        DEVICES_ATTR,
        Attribute::dictionary([NamedAttribute::new(GPU0, Attribute::i32(3))]),
    );
    assert_eq!(get_gpu_device_metadata(&module, &parse(GPU0)), None);

    module.set_attr(
        DEVICES_ATTR,
        Attribute::dictionary([
            NamedAttribute::new(GPU0, Attribute::i32(3)),
            NamedAttribute::new(GPU0, encode_gpu(7, 5)),
        ]),
    );
    assert_eq!(
        get_gpu_device_metadata(&module, &parse(GPU0)),
        Some(GpuMetadata {
            cc_major: 7,
            cc_minor: 5
        })
    );
}

#[test]
fn get_gpu_device_metadata_without_registry_is_none() {
    let mut module = IRModule::new();
    assert_eq!(get_gpu_device_metadata(&module, &parse(GPU0)), None);

    module.set_attr(DEVICES_ATTR, Attribute::string_array(&[GPU0]));
    assert_eq!(get_gpu_device_metadata(&module, &parse(GPU0)), None);
}

#[test]
fn runtime_devices_collects_names_and_metadata() {
    let device_set = mixed_device_set();
    let mut module = IRModule::new();
    add_devices_to_op(&mut module, Some(&device_set));

    let devices = RuntimeDevices::from_module(&module).expect("valid registry");
    assert_eq!(devices.len(), 3);
    assert_eq!(
        devices.gpu_metadata(&parse(GPU0)),
        Some(GpuMetadata {
            cc_major: 7,
            cc_minor: 0
        })
    );
    assert_eq!(devices.gpu_metadata(&parse(GPU1)), None);

    let spec = parse("/job:worker/device:GPU:*");
    let gpus: Vec<String> = devices.matching(&spec).map(ToString::to_string).collect();
    assert_eq!(gpus, [GPU0, GPU1]);

    let cpus = devices.matching(&parse("/device:CPU:0"));
    assert_eq!(cpus.count(), 1);
}

#[test]
fn runtime_devices_rejects_malformed_registry() {
    let mut module = IRModule::new();
    assert!(RuntimeDevices::from_module(&module)
        .expect("absent registry")
        .is_empty());

    module.set_attr(DEVICES_ATTR, Attribute::string("cpu"));
    assert!(RuntimeDevices::from_module(&module).is_err());
}
