// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Technique content generation.
//!
//! Serializes a technique record back into canonical CFEngine policy text.
//! The layout is fixed down to the whitespace, because generated files are
//! committed and diffed by downstream tooling:
//!
//! ```text
//! # @name <name>
//! # @description <description>
//! # @version <version>
//!
//! bundle agent <bundle_name>
//! {
//!   methods:
//!     "method_call" usebundle => <method_name>("<arg>", ...),
//!       ifvarclass => "<class_context>";
//! }
//! ```
//!
//! Parsing generated content yields the record it was generated from, once
//! defaults are applied to both.

use crate::{
    metadata::MetadataRecord,
    method_call::MethodCall,
    validate::{
        check_technique_metadata, Reason, RecordKind, Result, ValidationError,
        DEFAULT_CLASS_CONTEXT,
    },
};

/// Generate canonical policy text of a technique.
///
/// Method calls still lacking a class context are emitted with the default
/// class context.
///
/// # Errors
///
/// - Return [`ValidationError`] if the record fails
///   [`check_technique_metadata`], or lacks `description` or `version`.
pub fn generate_technique_content(record: &MetadataRecord) -> Result<String> {
    check_technique_metadata(record)?;

    let name = text_of(record, "name")?;
    let description = text_of(record, "description")?;
    let version = text_of(record, "version")?;
    let bundle_name = text_of(record, "bundle_name")?;
    let stanzas = record
        .method_calls()
        .unwrap_or_default()
        .iter()
        .map(method_call_stanza)
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(format!(
        "{}\n{}\n{}\n\n\
         bundle agent {bundle_name}\n\
         {{\n  \
         methods:\n\
         {stanzas}\n\
         }}\n",
        tag_line("name", name),
        tag_line("description", description),
        tag_line("version", version),
    ))
}

// An empty value leaves no trailing whitespace behind.
fn tag_line(tag: &str, value: &str) -> String {
    if value.is_empty() {
        return format!("# @{tag}");
    }

    format!("# @{tag} {value}")
}

fn method_call_stanza(call: &MethodCall) -> String {
    let args = call
        .args
        .iter()
        .map(|arg| format!("\"{arg}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let class_context = call
        .class_context
        .as_deref()
        .filter(|class| !class.is_empty())
        .unwrap_or(DEFAULT_CLASS_CONTEXT);

    format!(
        "    \"method_call\" usebundle => {}({args}),\n      ifvarclass => \"{class_context}\";",
        call.method_name
    )
}

fn text_of<'a>(record: &'a MetadataRecord, key: &str) -> Result<&'a str> {
    match record.get(key) {
        None => Err(ValidationError::missing(RecordKind::Technique, key)),
        Some(_) => record
            .text(key)
            .ok_or_else(|| ValidationError::new(RecordKind::Technique, key, Reason::Malformed)),
    }
}
