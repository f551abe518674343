// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

mod integration;

use std::path::{Path, PathBuf};

/// Absolute path to fixture below `test/fixtures`.
pub(crate) fn fixture(path: impl AsRef<Path>) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test")
        .join("fixtures")
        .join(path)
}

/// Canonical tree fixture.
pub(crate) fn tree_fixture() -> PathBuf {
    fixture("tree")
}

/// Alternate root fixture laid out like the canonical tree.
pub(crate) fn alt_fixture() -> PathBuf {
    fixture("test_methods")
}

/// Consume paths and return them sorted.
pub(crate) fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort();
    paths
}
