// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Metadata tag registry.
//!
//! Every bundle file carries a block of `# @tag value` comment lines above its
//! `bundle agent` declaration. Which tags must be present depends on the kind
//! of bundle being described. A __common__ set of tags applies to every bundle,
//! and each context adds its own specific tags on top of it.
//!
//! The registry is plain static data. Parsers consult it to enforce that a
//! parsed record carries exactly the expected key set.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Tags shared by every bundle file.
pub const COMMON_TAGS: &[&str] = &["name", "description", "bundle_name", "bundle_args"];

/// Tags specific to techniques.
pub const TECHNIQUE_TAGS: &[&str] = &["version"];

/// Tags specific to generic methods.
pub const GENERIC_METHOD_TAGS: &[&str] = &[
    "parameter",
    "class_prefix",
    "class_parameter",
    "class_parameter_id",
];

/// Context a tag set applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagContext {
    /// Tags every bundle must have.
    Common,

    /// Tags only techniques have.
    Technique,

    /// Tags only generic methods have.
    GenericMethod,
}

impl TagContext {
    /// Tags registered for this context alone.
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Self::Common => COMMON_TAGS,
            Self::Technique => TECHNIQUE_TAGS,
            Self::GenericMethod => GENERIC_METHOD_TAGS,
        }
    }

    /// Full key set a parsed record of this context must have.
    ///
    /// Common tags come first, followed by the context's specific tags.
    pub fn expected_tags(self) -> Vec<&'static str> {
        match self {
            Self::Common => COMMON_TAGS.to_vec(),
            _ => COMMON_TAGS.iter().chain(self.tags()).copied().collect(),
        }
    }
}

impl Display for TagContext {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Common => fmt.write_str("common"),
            Self::Technique => fmt.write_str("technique"),
            Self::GenericMethod => fmt.write_str("generic_method"),
        }
    }
}
