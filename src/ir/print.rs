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

use std::fmt::Write;

use crate::ir::{Attribute, DictionaryAttr, GpuDeviceMetadataAttr, IRModule, IntegerAttr};

/// Format an [`IRModule`] into a stable, human-readable string.
///
/// Attribute order follows insertion order, so two modules built the same way
/// always print identically.
pub fn format_ir_module(module: &IRModule) -> String {
    let mut out = String::from("module");
    if let Some(name) = &module.name {
        write!(&mut out, " @{}", name).expect("write to string cannot fail");
    }
    if !module.attrs().is_empty() {
        out.push_str(" attributes ");
        format_dictionary(module.attrs(), &mut out);
    }
    writeln!(&mut out, " {{").expect("write to string cannot fail");
    writeln!(&mut out, "}}").expect("write to string cannot fail");
    out
}

/// Format a single attribute in MLIR-like syntax.
pub fn format_attribute(attr: &Attribute) -> String {
    let mut out = String::new();
    format_attr(attr, &mut out);
    out
}

fn format_attr(attr: &Attribute, out: &mut String) {
    match attr {
        Attribute::Unit => out.push_str("unit"),
        Attribute::Bool(value) => write!(out, "{}", value).unwrap(),
        Attribute::Integer(int) => format_integer(int, out),
        Attribute::String(value) => format_string(value, out),
        Attribute::Array(elements) => {
            out.push('[');
            for (idx, element) in elements.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                format_attr(element, out);
            }
            out.push(']');
        }
        Attribute::Dictionary(dict) => format_dictionary(dict, out),
        Attribute::GpuDeviceMetadata(meta) => format_gpu_metadata(meta, out),
    }
}

fn format_integer(int: &IntegerAttr, out: &mut String) {
    write!(out, "{} : i{}", int.value, int.width).unwrap();
}

fn format_gpu_metadata(meta: &GpuDeviceMetadataAttr, out: &mut String) {
    out.push_str("#tf.gpu_device_metadata<cc_major = ");
    format_integer(&meta.cc_major, out);
    out.push_str(", cc_minor = ");
    format_integer(&meta.cc_minor, out);
    out.push('>');
}

fn format_dictionary(dict: &DictionaryAttr, out: &mut String) {
    out.push('{');
    for (idx, entry) in dict.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        format_attr_name(&entry.name, out);
        // Unit entries print as a bare name, as in MLIR.
        if entry.value != Attribute::Unit {
            out.push_str(" = ");
            format_attr(&entry.value, out);
        }
    }
    out.push('}');
}

fn format_attr_name(name: &str, out: &mut String) {
    if is_bare_identifier(name) {
        out.push_str(name);
    } else {
        format_string(name, out);
    }
}

fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

fn format_string(value: &str, out: &mut String) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => write!(out, "\\{:02X}", c as u32).unwrap(),
            c => out.push(c),
        }
    }
    out.push('"');
}
