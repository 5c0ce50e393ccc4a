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

//! Structured device names.
//!
//! The canonical form is `/job:<j>/replica:<r>/task:<t>/device:<TYPE>:<id>`.
//! Every segment is optional; segments may appear in any order but each key at
//! most once. A `*` value leaves the field unspecified, and the lowercase
//! shorthands `/cpu:<id>` and `/gpu:<id>` stand for `device:CPU:<id>` and
//! `device:GPU:<id>`.

use std::fmt;
use std::str::FromStr;

use crate::diagnostics::Span;

/// Parsed device name. `None` marks an unspecified field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DeviceName {
    pub job: Option<String>,
    pub replica: Option<u32>,
    pub task: Option<u32>,
    pub device_type: Option<String>,
    pub id: Option<u32>,
}

/// Reason a device name failed to parse.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NameErrorKind {
    #[error("device name is empty")]
    Empty,
    #[error("device name must start with '/'")]
    MissingLeadingSlash,
    #[error("whitespace is not allowed in device names")]
    Whitespace,
    #[error("empty segment")]
    EmptySegment,
    /// A segment without a `key:value` separator.
    #[error("malformed segment '{0}'")]
    MalformedSegment(String),
    #[error("unknown segment key '{0}'")]
    UnknownSegment(String),
    #[error("segment '{0}' appears more than once")]
    DuplicateSegment(&'static str),
    #[error("invalid job name '{0}'")]
    InvalidJob(String),
    #[error("invalid {field} '{value}'")]
    InvalidIndex { field: &'static str, value: String },
    /// Device types are uppercase identifiers such as `CPU` or `XLA_GPU`.
    #[error("invalid device type '{0}'")]
    InvalidType(String),
}

/// Parse failure with the byte span of the offending segment.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{kind} (at byte {})", .span.start)]
pub struct DeviceNameError {
    pub kind: NameErrorKind,
    pub span: Span,
}

impl DeviceNameError {
    fn new(kind: NameErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Default)]
struct SeenSegments {
    job: bool,
    replica: bool,
    task: bool,
    device: bool,
}

impl SeenSegments {
    fn mark(&mut self, key: &'static str, span: &Span) -> Result<(), DeviceNameError> {
        let slot = match key {
            "job" => &mut self.job,
            "replica" => &mut self.replica,
            "task" => &mut self.task,
            _ => &mut self.device,
        };
        if std::mem::replace(slot, true) {
            return Err(DeviceNameError::new(
                NameErrorKind::DuplicateSegment(key),
                span.clone(),
            ));
        }
        Ok(())
    }
}

impl DeviceName {
    /// Parse a device name. See the module docs for the accepted grammar.
    pub fn parse(s: &str) -> Result<Self, DeviceNameError> {
        if s.is_empty() {
            return Err(DeviceNameError::new(NameErrorKind::Empty, 0..0));
        }
        if let Some((pos, ch)) = s.char_indices().find(|(_, c)| c.is_whitespace()) {
            return Err(DeviceNameError::new(
                NameErrorKind::Whitespace,
                pos..pos + ch.len_utf8(),
            ));
        }
        let rest = match s.strip_prefix('/') {
            Some(rest) => rest,
            None => {
                let end = s.find('/').unwrap_or(s.len());
                return Err(DeviceNameError::new(
                    NameErrorKind::MissingLeadingSlash,
                    0..end,
                ));
            }
        };

        let mut name = DeviceName::default();
        if rest.is_empty() {
            return Ok(name);
        }

        let mut seen = SeenSegments::default();
        let mut offset = 1;
        for segment in rest.split('/') {
            let span = offset..offset + segment.len();
            offset += segment.len() + 1;
            name.apply_segment(segment, span, &mut seen)?;
        }
        Ok(name)
    }

    fn apply_segment(
        &mut self,
        segment: &str,
        span: Span,
        seen: &mut SeenSegments,
    ) -> Result<(), DeviceNameError> {
        let fail = |kind| DeviceNameError::new(kind, span.clone());
        if segment.is_empty() {
            return Err(fail(NameErrorKind::EmptySegment));
        }
        let (key, value) = segment
            .split_once(':')
            .ok_or_else(|| fail(NameErrorKind::MalformedSegment(segment.to_string())))?;

        match key {
            "job" => {
                seen.mark("job", &span)?;
                self.job = parse_job(value).map_err(fail)?;
            }
            "replica" => {
                seen.mark("replica", &span)?;
                self.replica = parse_index("replica", value).map_err(fail)?;
            }
            "task" => {
                seen.mark("task", &span)?;
                self.task = parse_index("task", value).map_err(fail)?;
            }
            "device" => {
                seen.mark("device", &span)?;
                let (device_type, id) = match value.split_once(':') {
                    Some((device_type, id)) => (device_type, Some(id)),
                    None => (value, None),
                };
                self.device_type = parse_device_type(device_type).map_err(fail)?;
                self.id = match id {
                    Some(id) => parse_index("device id", id).map_err(fail)?,
                    None => None,
                };
            }
            "cpu" | "gpu" => {
                seen.mark("device", &span)?;
                self.device_type = Some(key.to_ascii_uppercase());
                self.id = parse_index("device id", value).map_err(fail)?;
            }
            other => return Err(fail(NameErrorKind::UnknownSegment(other.to_string()))),
        }
        Ok(())
    }

    /// True when job, replica, task, type and id are all specified.
    pub fn is_fully_specified(&self) -> bool {
        self.job.is_some()
            && self.replica.is_some()
            && self.task.is_some()
            && self.device_type.is_some()
            && self.id.is_some()
    }

    /// Wildcard match: every field specified in `spec` must equal the same
    /// field of `self`. Unspecified fields of `spec` match anything.
    pub fn matches(&self, spec: &DeviceName) -> bool {
        fn field<T: PartialEq>(have: &Option<T>, want: &Option<T>) -> bool {
            want.is_none() || have == want
        }
        field(&self.job, &spec.job)
            && field(&self.replica, &spec.replica)
            && field(&self.task, &spec.task)
            && field(&self.device_type, &spec.device_type)
            && field(&self.id, &spec.id)
    }
}

fn parse_job(value: &str) -> Result<Option<String>, NameErrorKind> {
    if value == "*" {
        return Ok(None);
    }
    let mut chars = value.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(Some(value.to_string()))
    } else {
        Err(NameErrorKind::InvalidJob(value.to_string()))
    }
}

fn parse_index(field: &'static str, value: &str) -> Result<Option<u32>, NameErrorKind> {
    if value == "*" {
        return Ok(None);
    }
    let invalid = || NameErrorKind::InvalidIndex {
        field,
        value: value.to_string(),
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    value.parse::<u32>().map(Some).map_err(|_| invalid())
}

fn parse_device_type(value: &str) -> Result<Option<String>, NameErrorKind> {
    if value == "*" {
        return Ok(None);
    }
    let mut chars = value.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(Some(value.to_string()))
    } else {
        Err(NameErrorKind::InvalidType(value.to_string()))
    }
}

impl FromStr for DeviceName {
    type Err = DeviceNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceName::parse(s)
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == DeviceName::default() {
            return f.write_str("/");
        }
        if let Some(job) = &self.job {
            write!(f, "/job:{}", job)?;
        }
        if let Some(replica) = self.replica {
            write!(f, "/replica:{}", replica)?;
        }
        if let Some(task) = self.task {
            write!(f, "/task:{}", task)?;
        }
        match (&self.device_type, self.id) {
            (Some(device_type), Some(id)) => write!(f, "/device:{}:{}", device_type, id),
            (Some(device_type), None) => write!(f, "/device:{}", device_type),
            (None, Some(id)) => write!(f, "/device:*:{}", id),
            (None, None) => Ok(()),
        }
    }
}
