// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Technique validation and defaulting.
//!
//! Checking and defaulting are separate stages. Checks run on raw input to
//! reject unusable techniques early, and defaults are filled in afterwards
//! right before content generation. Defaulting consumes a record and hands
//! back a new one.

use crate::{
    metadata::{MetadataRecord, TagValue},
    method_call::MethodCall,
};

use regex::Regex;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    sync::LazyLock,
};

/// Default description of a technique.
pub const DEFAULT_DESCRIPTION: &str = "";

/// Default version of a technique.
pub const DEFAULT_VERSION: &str = "1.0";

/// Default class context of a method call.
pub const DEFAULT_CLASS_CONTEXT: &str = "any";

const MANDATORY_TECHNIQUE_KEYS: &[&str] = &["name", "bundle_name", "method_calls"];

static BUNDLE_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+$").unwrap());

/// Check that technique metadata is usable.
///
/// # Errors
///
/// - Return [`ValidationError`] if `name`, `bundle_name`, or `method_calls`
///   is missing or empty, if `bundle_name` fails [`check_bundle_name`], or if
///   any method call fails [`check_technique_method_call`].
pub fn check_technique_metadata(record: &MetadataRecord) -> Result<()> {
    for &key in MANDATORY_TECHNIQUE_KEYS {
        match record.get(key) {
            None => return Err(ValidationError::missing(RecordKind::Technique, key)),
            Some(value) if value.is_empty() => {
                return Err(ValidationError::empty(RecordKind::Technique, key))
            }
            Some(_) => {}
        }
    }

    let bundle_name = record.text("bundle_name").ok_or_else(|| {
        ValidationError::new(RecordKind::Technique, "bundle_name", Reason::Malformed)
    })?;
    check_bundle_name(bundle_name)?;

    let calls = record.method_calls().ok_or_else(|| {
        ValidationError::new(RecordKind::Technique, "method_calls", Reason::Malformed)
    })?;
    for call in calls {
        check_technique_method_call(call)?;
    }

    Ok(())
}

/// Check that bundle name is a plain identifier.
///
/// Bundle names double as directory and file names in the technique store,
/// so anything beyond word characters is refused.
///
/// # Errors
///
/// - Return [`ValidationError`] if `bundle_name` is empty, or contains
///   anything but word characters.
pub fn check_bundle_name(bundle_name: &str) -> Result<()> {
    if bundle_name.is_empty() {
        return Err(ValidationError::empty(RecordKind::Technique, "bundle_name"));
    }

    if !BUNDLE_NAME.is_match(bundle_name) {
        return Err(ValidationError::new(
            RecordKind::Technique,
            "bundle_name",
            Reason::Malformed,
        ));
    }

    Ok(())
}

/// Check that method call is usable.
///
/// # Errors
///
/// - Return [`ValidationError`] if `method_name` is empty.
pub fn check_technique_method_call(call: &MethodCall) -> Result<()> {
    if call.method_name.is_empty() {
        return Err(ValidationError::empty(RecordKind::MethodCall, "method_name"));
    }

    Ok(())
}

/// Fill in missing optional technique metadata.
///
/// Sets `description` and `version` only when absent. A present value is
/// never overwritten, even an empty one. Method calls are defaulted through
/// [`add_default_values_technique_method_call`].
pub fn add_default_values_technique_metadata(record: MetadataRecord) -> MetadataRecord {
    record
        .into_iter()
        .map(|(key, value)| match value {
            TagValue::MethodCalls(calls) => (
                key,
                TagValue::MethodCalls(
                    calls
                        .into_iter()
                        .map(add_default_values_technique_method_call)
                        .collect(),
                ),
            ),
            value => (key, value),
        })
        .collect::<MetadataRecord>()
        .with_default("description", DEFAULT_DESCRIPTION)
        .with_default("version", DEFAULT_VERSION)
}

/// Fill in missing class context of method call.
///
/// An empty class context counts as missing.
pub fn add_default_values_technique_method_call(call: MethodCall) -> MethodCall {
    match call.class_context.as_deref() {
        None | Some("") => call.with_class_context(DEFAULT_CLASS_CONTEXT),
        Some(_) => call,
    }
}

trait WithDefault {
    fn with_default(self, key: &str, value: &str) -> Self;
}

impl WithDefault for MetadataRecord {
    fn with_default(self, key: &str, value: &str) -> Self {
        if self.contains_key(key) {
            return self;
        }

        self.with(key, value)
    }
}

/// Kind of record that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Technique,
    MethodCall,
}

impl Display for RecordKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Technique => fmt.write_str("technique"),
            Self::MethodCall => fmt.write_str("method call"),
        }
    }
}

/// Why a key failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Missing,
    Empty,
    Malformed,
}

impl Display for Reason {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Missing => fmt.write_str("is missing"),
            Self::Empty => fmt.write_str("cannot be empty"),
            Self::Malformed => fmt.write_str("has the wrong type"),
        }
    }
}

/// Record failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("mandatory key {key:?} {reason} in {record} metadata")]
pub struct ValidationError {
    pub record: RecordKind,
    pub key: String,
    pub reason: Reason,
}

impl ValidationError {
    pub fn new(record: RecordKind, key: impl Into<String>, reason: Reason) -> Self {
        Self {
            record,
            key: key.into(),
            reason,
        }
    }

    pub fn missing(record: RecordKind, key: impl Into<String>) -> Self {
        Self::new(record, key, Reason::Missing)
    }

    pub fn empty(record: RecordKind, key: impl Into<String>) -> Self {
        Self::new(record, key, Reason::Empty)
    }
}

/// Friendly result alias :3
pub type Result<T, E = ValidationError> = std::result::Result<T, E>;
