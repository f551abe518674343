// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository scanning.
//!
//! Discover generic methods and techniques on disk, and map them through the
//! metadata parsers to produce aggregate listings. Discovery always covers
//! the canonical tree, and optionally a second alternate root laid out the
//! same way. Both roots are assumed to be disjoint, so no deduplication is
//! performed.
//!
//! Listings are all or nothing. One unparsable file fails the entire listing.

use crate::{
    metadata::{
        parse_generic_method_metadata, parse_technique_metadata, MetadataError, MetadataRecord,
    },
    method_call::{parse_technique_methods_str, MethodCallError},
    path::{is_bundle_file, GENERIC_METHODS_DIR, TECHNIQUES_DIR},
};

use ignore::WalkBuilder;
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Scanner of a canonical tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanner {
    tree_dir: PathBuf,
}

impl Scanner {
    /// Construct new scanner over canonical tree directory.
    pub fn new(tree_dir: impl Into<PathBuf>) -> Self {
        Self {
            tree_dir: tree_dir.into(),
        }
    }

    /// Canonical tree directory being scanned.
    pub fn tree_dir(&self) -> &Path {
        &self.tree_dir
    }

    /// List every generic method file.
    ///
    /// # Errors
    ///
    /// - Return [`ScanError::Walk`] if directory traversal fails.
    pub fn get_all_generic_methods_filenames(
        &self,
        alt_path: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        self.bundle_filenames(GENERIC_METHODS_DIR, alt_path)
    }

    /// List every technique file.
    ///
    /// # Errors
    ///
    /// - Return [`ScanError::Walk`] if directory traversal fails.
    pub fn get_all_techniques_filenames(&self, alt_path: Option<&Path>) -> Result<Vec<PathBuf>> {
        self.bundle_filenames(TECHNIQUES_DIR, alt_path)
    }

    /// Parse metadata of every generic method.
    ///
    /// # Errors
    ///
    /// - Return [`ScanError::Walk`] if directory traversal fails.
    /// - Return [`ScanError::ReadFile`] if a generic method cannot be read.
    /// - Return [`ScanError::Metadata`] if a generic method cannot be parsed.
    #[instrument(skip(self), level = "debug")]
    pub fn get_all_generic_methods_metadata(
        &self,
        alt_path: Option<&Path>,
    ) -> Result<Vec<MetadataRecord>> {
        self.get_all_generic_methods_filenames(alt_path)?
            .into_iter()
            .map(|path| {
                let content = read_file(&path)?;
                parse_generic_method_metadata(&content)
                    .map_err(|err| ScanError::Metadata { source: err, path })
            })
            .collect()
    }

    /// Parse metadata and method calls of every technique.
    ///
    /// # Errors
    ///
    /// - Return [`ScanError::Walk`] if directory traversal fails.
    /// - Return [`ScanError::ReadFile`] if a technique cannot be read.
    /// - Return [`ScanError::Metadata`] if technique metadata cannot be parsed.
    /// - Return [`ScanError::MethodCall`] if technique method calls cannot be
    ///   parsed.
    #[instrument(skip(self), level = "debug")]
    pub fn get_all_techniques_metadata(
        &self,
        alt_path: Option<&Path>,
    ) -> Result<Vec<MetadataRecord>> {
        self.get_all_techniques_filenames(alt_path)?
            .into_iter()
            .map(|path| {
                let content = read_file(&path)?;
                let record = match parse_technique_metadata(&content) {
                    Ok(record) => record,
                    Err(err) => return Err(ScanError::Metadata { source: err, path }),
                };
                let calls = match parse_technique_methods_str(&content) {
                    Ok(calls) => calls,
                    Err(err) => return Err(ScanError::MethodCall { source: err, path }),
                };

                Ok(record.with("method_calls", calls))
            })
            .collect()
    }

    fn bundle_filenames(&self, subdir: &str, alt_path: Option<&Path>) -> Result<Vec<PathBuf>> {
        let mut filenames = find_bundle_files(self.tree_dir.join(subdir))?;
        if let Some(alt_path) = alt_path {
            filenames.extend(find_bundle_files(alt_path.join(subdir))?);
        }
        info!("found {} bundle files in {subdir}", filenames.len());

        Ok(filenames)
    }
}

fn find_bundle_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        debug!("skip missing bundle directory {:?}", dir.display());
        return Ok(Vec::new());
    }

    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;

        // INVARIANT: Only keep regular files, or links resolving to them.
        if !entry.path().is_file() || !is_bundle_file(entry.path()) {
            continue;
        }
        files.push(entry.into_path());
    }

    Ok(files)
}

fn read_file(path: &Path) -> Result<String> {
    read_to_string(path).map_err(|err| ScanError::ReadFile {
        source: err,
        path: path.to_path_buf(),
    })
}

/// Repository scanning error types.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Directory traversal fails.
    #[error(transparent)]
    Walk(#[from] ignore::Error),

    /// Bundle file cannot be read.
    #[error("failed to read bundle file at {:?}", path.display())]
    ReadFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Bundle metadata cannot be parsed.
    #[error("failed to parse metadata of {:?}", path.display())]
    Metadata {
        #[source]
        source: MetadataError,
        path: PathBuf,
    },

    /// Technique method calls cannot be parsed.
    #[error("failed to parse method calls of {:?}", path.display())]
    MethodCall {
        #[source]
        source: MethodCallError,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ScanError> = std::result::Result<T, E>;
