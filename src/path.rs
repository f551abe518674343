// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine where ncf keeps its files. An installation root holds a `tree/`
//! directory that contains generic methods under `30_generic_methods/` and
//! techniques under `50_techniques/`. Each technique lives in its own
//! directory named after its bundle:
//!
//! ```text
//! tree/
//! ├── 30_generic_methods/
//! │   └── package_install.cf
//! └── 50_techniques/
//!     └── bla/
//!         └── bla.cf
//! ```

use std::path::{Path, PathBuf};

/// Directory of generic methods below a tree root.
pub const GENERIC_METHODS_DIR: &str = "30_generic_methods";

/// Directory of techniques below a tree root.
pub const TECHNIQUES_DIR: &str = "50_techniques";

/// File extension of bundle files.
pub const BUNDLE_EXTENSION: &str = "cf";

/// Determine default absolute path to the configuration file.
///
/// Uses `$XDG_CONFIG_HOME/ncf/config.toml`. Does not check if the path
/// returned actually exists.
///
/// # Errors
///
/// - Return [`NoStandardDir`] if configuration directory cannot be determined.
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("ncf").join("config.toml"))
        .ok_or(NoStandardDir)
}

/// Determine default absolute path to the installation root.
///
/// Uses XDG Base Directory path `$XDG_DATA_HOME/ncf`. Does not check if the
/// path returned actually exists.
///
/// # Errors
///
/// - Return [`NoStandardDir`] if data directory cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_root_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|path| path.join("ncf"))
        .ok_or(NoStandardDir)
}

/// Directory holding every file of a technique.
pub fn technique_dir(root: impl AsRef<Path>, bundle_name: &str) -> PathBuf {
    root.as_ref().join(TECHNIQUES_DIR).join(bundle_name)
}

/// Canonical path of a technique's policy file.
pub fn technique_path(root: impl AsRef<Path>, bundle_name: &str) -> PathBuf {
    technique_dir(root, bundle_name).join(format!("{bundle_name}.{BUNDLE_EXTENSION}"))
}

/// Check if path names a discoverable bundle file.
///
/// Files starting with an underscore are private by convention.
pub fn is_bundle_file(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            !name.starts_with('_') && name.ends_with(&format!(".{BUNDLE_EXTENSION}"))
        })
}

/// No way to determine a standard user directory.
///
/// # See Also
///
/// - [`dirs::data_dir`](https://docs.rs/dirs/latest/dirs/fn.data_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to standard user directory")]
pub struct NoStandardDir;

/// Friendly result alias :3
pub type Result<T, E = NoStandardDir> = std::result::Result<T, E>;
