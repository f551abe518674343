// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Metadata tooling for CFEngine generic methods and techniques.
//!
//! CFEngine policy files describe themselves through structured comments
//! right above their bundle declaration:
//!
//! ```text
//! # @name Package install
//! # @description Install a package
//! # @parameter package_name Name of package to install
//! # @class_prefix package_install
//! # @class_parameter package_name
//! bundle agent package_install(package_name)
//! ```
//!
//! A __generic method__ is a reusable bundle with such metadata. A
//! __technique__ is a bundle composed of calls to generic methods, which ncf
//! can both read back and generate from scratch.
//!
//! This crate parses that metadata, scans a tree of generic methods and
//! techniques, generates canonical technique policy text, and writes or
//! deletes techniques while running user hooks around each modification.

pub mod config;
pub mod generate;
pub mod hook;
pub mod metadata;
pub mod method_call;
pub mod path;
pub mod scan;
pub mod store;
pub mod tags;
pub mod validate;

pub use metadata::{MetadataRecord, Parameter, TagValue};
pub use method_call::MethodCall;
