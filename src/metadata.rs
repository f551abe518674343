// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Bundle metadata parsing.
//!
//! Generic methods and techniques describe themselves through a block of
//! comment tags placed directly above their `bundle agent` declaration:
//!
//! ```text
//! # @name Package install
//! # @description Install a package by name
//! # @parameter package_name Name of the package to install
//! # @class_prefix package_install
//! # @class_parameter package_name
//!
//! bundle agent package_install(package_name)
//! {
//! ...
//! ```
//!
//! The declaration line itself supplies the `bundle_name` and `bundle_args`
//! tags. Everything below the declaration is opaque bundle body, so a tag line
//! found there means the metadata block was broken apart, which is rejected.
//!
//! # See Also
//!
//! - [`TagContext`]

use crate::{method_call::MethodCall, tags::TagContext};

use regex::Regex;
use serde::Serialize;
use std::{
    collections::{btree_map, BTreeMap},
    sync::LazyLock,
};

static TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*@(\w+)(?:\s+(.*?))?\s*$").unwrap());

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*bundle\s+agent\s+(\w+)\s*(?:\(([^)]*)\))?\s*(?:\{.*)?(?:#.*)?$").unwrap()
});

/// Metadata of a single bundle file.
///
/// Maps tag names to their values. Keys are kept sorted so that two records
/// with the same content always compare, print, and serialize the same way.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetadataRecord(BTreeMap<String, TagValue>);

impl MetadataRecord {
    /// Construct new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert tag value, returning the value it replaced.
    pub fn insert(
        &mut self,
        tag: impl Into<String>,
        value: impl Into<TagValue>,
    ) -> Option<TagValue> {
        self.0.insert(tag.into(), value.into())
    }

    /// Consume record and return it with tag set to value.
    pub fn with(mut self, tag: impl Into<String>, value: impl Into<TagValue>) -> Self {
        self.insert(tag, value);
        self
    }

    pub fn get(&self, tag: &str) -> Option<&TagValue> {
        self.0.get(tag)
    }

    pub fn remove(&mut self, tag: &str) -> Option<TagValue> {
        self.0.remove(tag)
    }

    pub fn contains_key(&self, tag: &str) -> bool {
        self.0.contains_key(tag)
    }

    /// Iterate over tag names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plain string value of tag, if tag holds one.
    pub fn text(&self, tag: &str) -> Option<&str> {
        match self.get(tag)? {
            TagValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// String list value of tag, if tag holds one.
    pub fn list(&self, tag: &str) -> Option<&[String]> {
        match self.get(tag)? {
            TagValue::List(list) => Some(list.as_slice()),
            _ => None,
        }
    }

    /// Integer value of tag, if tag holds one.
    pub fn integer(&self, tag: &str) -> Option<u32> {
        match self.get(tag)? {
            TagValue::Integer(int) => Some(*int),
            _ => None,
        }
    }

    /// Declared parameters of a generic method.
    pub fn parameters(&self) -> Option<&[Parameter]> {
        match self.get("parameter")? {
            TagValue::Parameters(parameters) => Some(parameters.as_slice()),
            _ => None,
        }
    }

    /// Method calls of a technique.
    ///
    /// An empty list value is also accepted, because a list literal carries no
    /// element type.
    pub fn method_calls(&self) -> Option<&[MethodCall]> {
        match self.get("method_calls")? {
            TagValue::MethodCalls(calls) => Some(calls.as_slice()),
            TagValue::List(list) if list.is_empty() => Some(&[]),
            _ => None,
        }
    }
}

impl<K, V> FromIterator<(K, V)> for MetadataRecord
where
    K: Into<String>,
    V: Into<TagValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(tag, value)| (tag.into(), value.into()))
                .collect(),
        )
    }
}

impl IntoIterator for MetadataRecord {
    type Item = (String, TagValue);
    type IntoIter = btree_map::IntoIter<String, TagValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Value held by a metadata tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    /// Plain string, e.g., `name` or `class_prefix`.
    Text(String),

    /// Ordered list of strings, e.g., `bundle_args`.
    List(Vec<String>),

    /// Integer, e.g., `class_parameter_id`.
    Integer(u32),

    /// Ordered parameter declarations of a generic method.
    Parameters(Vec<Parameter>),

    /// Ordered method calls of a technique.
    MethodCalls(Vec<MethodCall>),
}

impl TagValue {
    /// Empty string or empty sequence.
    ///
    /// Integers are never considered empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::List(list) => list.is_empty(),
            Self::Integer(_) => false,
            Self::Parameters(parameters) => parameters.is_empty(),
            Self::MethodCalls(calls) => calls.is_empty(),
        }
    }
}

impl From<String> for TagValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for TagValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<u32> for TagValue {
    fn from(int: u32) -> Self {
        Self::Integer(int)
    }
}

impl From<Vec<String>> for TagValue {
    fn from(list: Vec<String>) -> Self {
        Self::List(list)
    }
}

impl From<Vec<Parameter>> for TagValue {
    fn from(parameters: Vec<Parameter>) -> Self {
        Self::Parameters(parameters)
    }
}

impl From<Vec<MethodCall>> for TagValue {
    fn from(calls: Vec<MethodCall>) -> Self {
        Self::MethodCalls(calls)
    }
}

/// Parameter declared by a generic method.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Name of the parameter, matching one of the bundle arguments.
    pub name: String,

    /// Human readable description of the parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    /// Construct new parameter declaration.
    pub fn new(name: impl Into<String>, description: Option<impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            description: description.map(Into::into),
        }
    }
}

/// Extract raw metadata from bundle file content.
///
/// Collects every `# @tag value` line above the first `bundle agent`
/// declaration, plus `bundle_name` and `bundle_args` from the declaration
/// itself. Does not check the result against the tag registry.
///
/// # Errors
///
/// - Return [`MetadataError::Empty`] if content is blank.
/// - Return [`MetadataError::MissingDeclaration`] if no `bundle agent`
///   declaration exists.
/// - Return [`MetadataError::MisplacedTag`] if a tag line appears below the
///   declaration, or a `@parameter_description` does not follow a
///   `@parameter` with only blank lines or plain comments in between.
/// - Return [`MetadataError::DuplicateTag`] if a single valued tag repeats.
/// - Return [`MetadataError::InvalidValue`] if a `@parameter` tag has no name,
///   or the declaration lists an empty parameter.
pub fn parse_bundlefile_metadata(content: &str) -> Result<MetadataRecord> {
    if content.trim().is_empty() {
        return Err(MetadataError::Empty);
    }

    let mut record = MetadataRecord::new();
    let mut parameters: Vec<Parameter> = Vec::new();
    let mut after_parameter = false;
    let mut lines = content.lines().enumerate();
    let mut declared = false;

    for (index, line) in lines.by_ref() {
        if let Some(caps) = DECLARATION.captures(line) {
            let args = caps
                .get(2)
                .map(|args| split_bundle_args(args.as_str()))
                .transpose()?
                .unwrap_or_default();
            insert_unique(&mut record, "bundle_name", caps[1].to_string())?;
            insert_unique(&mut record, "bundle_args", args)?;
            declared = true;
            break;
        }

        let Some(caps) = TAG_LINE.captures(line) else {
            // INVARIANT: Only blank lines and plain comments keep a parameter
            // open for its description.
            let trimmed = line.trim_start();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                after_parameter = false;
            }
            continue;
        };
        let tag = &caps[1];
        let value = caps.get(2).map_or("", |value| value.as_str());

        match tag {
            "parameter" => {
                parameters.push(parse_parameter(value)?);
                after_parameter = true;
                continue;
            }
            "parameter_description" => {
                // INVARIANT: Description always belongs to the parameter right above it.
                let parameter = parameters
                    .last_mut()
                    .filter(|_| after_parameter)
                    .ok_or_else(|| MetadataError::MisplacedTag {
                        tag: tag.to_string(),
                        line: index + 1,
                    })?;
                parameter.description = Some(value.to_string());
            }
            _ => insert_unique(&mut record, tag, value.to_string())?,
        }

        after_parameter = false;
    }

    if !declared {
        return Err(MetadataError::MissingDeclaration);
    }

    // INVARIANT: Metadata block must be fully contiguous above the declaration.
    for (index, line) in lines {
        if let Some(caps) = TAG_LINE.captures(line) {
            return Err(MetadataError::MisplacedTag {
                tag: caps[1].to_string(),
                line: index + 1,
            });
        }
    }

    if !parameters.is_empty() {
        record.insert("parameter", parameters);
    }

    Ok(record)
}

/// Parse metadata of a technique.
///
/// # Errors
///
/// - Return any error of [`parse_bundlefile_metadata`].
/// - Return [`MetadataError::TagMismatch`] if the tag set differs from the
///   common and technique tags.
pub fn parse_technique_metadata(content: &str) -> Result<MetadataRecord> {
    let record = parse_bundlefile_metadata(content)?;
    check_tag_set(&record, TagContext::Technique)?;

    Ok(record)
}

/// Parse metadata of a generic method.
///
/// The `class_parameter_id` tag is normally derived as the one-based position
/// of `class_parameter` among the bundle arguments. An explicit tag overrides
/// the derivation.
///
/// # Errors
///
/// - Return any error of [`parse_bundlefile_metadata`].
/// - Return [`MetadataError::InvalidValue`] if `class_parameter` is not a
///   bundle argument, or an explicit `class_parameter_id` is not an integer.
/// - Return [`MetadataError::TagMismatch`] if the tag set differs from the
///   common and generic method tags.
pub fn parse_generic_method_metadata(content: &str) -> Result<MetadataRecord> {
    let mut record = parse_bundlefile_metadata(content)?;

    if let Some(id) = record.text("class_parameter_id") {
        let id = id.parse::<u32>().map_err(|_| MetadataError::InvalidValue {
            tag: "class_parameter_id".into(),
            value: id.to_string(),
            reason: "expected an unsigned integer".into(),
        })?;
        record.insert("class_parameter_id", id);
    } else if let Some(class_parameter) = record.text("class_parameter") {
        let args = record.list("bundle_args").unwrap_or_default();
        let position = args
            .iter()
            .position(|arg| arg == class_parameter)
            .ok_or_else(|| MetadataError::InvalidValue {
                tag: "class_parameter".into(),
                value: class_parameter.to_string(),
                reason: "does not match any of the bundle's parameters".into(),
            })?;
        record.insert("class_parameter_id", (position + 1) as u32);
    }

    check_tag_set(&record, TagContext::GenericMethod)?;

    Ok(record)
}

fn check_tag_set(record: &MetadataRecord, context: TagContext) -> Result<()> {
    let expected = context.expected_tags();
    let missing = expected
        .iter()
        .filter(|tag| !record.contains_key(tag))
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    let unexpected = record
        .keys()
        .filter(|tag| !expected.iter().any(|known| known == tag))
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    if missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }

    Err(MetadataError::TagMismatch {
        context,
        missing,
        unexpected,
    })
}

fn insert_unique(
    record: &mut MetadataRecord,
    tag: &str,
    value: impl Into<TagValue>,
) -> Result<()> {
    if record.contains_key(tag) {
        return Err(MetadataError::DuplicateTag(tag.to_string()));
    }

    record.insert(tag, value);
    Ok(())
}

fn parse_parameter(value: &str) -> Result<Parameter> {
    let mut parts = value.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return Err(MetadataError::InvalidValue {
            tag: "parameter".into(),
            value: value.to_string(),
            reason: "expected a parameter name".into(),
        });
    }

    let description = parts.next().map(str::trim).filter(|desc| !desc.is_empty());
    Ok(Parameter::new(name, description))
}

fn split_bundle_args(args: &str) -> Result<Vec<String>> {
    if args.trim().is_empty() {
        return Ok(Vec::new());
    }

    args.split(',')
        .map(|arg| match arg.trim() {
            "" => Err(MetadataError::InvalidValue {
                tag: "bundle_args".into(),
                value: args.to_string(),
                reason: "expected no empty parameter".into(),
            }),
            arg => Ok(arg.to_string()),
        })
        .collect()
}

/// Metadata parsing error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// Content to parse is blank.
    #[error("cannot parse metadata of empty bundle file")]
    Empty,

    /// No `bundle agent` declaration found.
    #[error("no bundle agent declaration found")]
    MissingDeclaration,

    /// Tag line is not part of the metadata block above the declaration.
    #[error("metadata tag '@{tag}' misplaced at line {line}")]
    MisplacedTag { tag: String, line: usize },

    /// Single valued tag defined more than once.
    #[error("metadata tag '@{0}' defined more than once")]
    DuplicateTag(String),

    /// Parsed tags do not match the registry for the bundle context.
    #[error(
        "{context} metadata tags do not match the registry (missing: {missing:?}, unexpected: {unexpected:?})"
    )]
    TagMismatch {
        context: TagContext,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// Tag value cannot be interpreted.
    #[error("invalid value {value:?} for metadata tag '@{tag}': {reason}")]
    InvalidValue {
        tag: String,
        value: String,
        reason: String,
    },
}

/// Friendly result alias :3
pub type Result<T, E = MetadataError> = std::result::Result<T, E>;
