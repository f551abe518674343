// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the configuration file that ncf uses to simplify the
//! process of serialization and deserialization. File I/O is left to the
//! caller to figure out.
//!
//! # General Layout
//!
//! ```toml
//! [settings]
//! root = "$HOME/ncf"
//! hooks_dir = "/etc/ncf/hooks.d"
//! alt_path = "/var/lib/ncf/local"
//! ```
//!
//! Only `root` is mandatory. All paths go through shell expansion when the
//! configuration is parsed.

use crate::path::{default_root_dir, NoStandardDir};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Name of the tree directory below the installation root.
pub const TREE_DIR: &str = "tree";

/// Name of the default hooks directory below the installation root.
pub const HOOKS_DIR: &str = "hooks.d";

/// Top-level configuration file layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct NcfConfig {
    /// General settings.
    pub settings: Settings,
}

impl NcfConfig {
    /// Construct configuration rooted at the default installation root.
    ///
    /// # Errors
    ///
    /// - Return [`NoStandardDir`] if the default root cannot be determined.
    pub fn try_default() -> Result<Self, NoStandardDir> {
        Ok(Self {
            settings: Settings {
                root: default_root_dir()?,
                ..Default::default()
            },
        })
    }
}

impl FromStr for NcfConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: NcfConfig = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every path field.
        let settings = &mut config.settings;
        settings.root = expand(&settings.root)?;
        settings.hooks_dir = settings.hooks_dir.as_deref().map(expand).transpose()?;
        settings.alt_path = settings.alt_path.as_deref().map(expand).transpose()?;

        Ok(config)
    }
}

impl Display for NcfConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// General settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Installation root holding the canonical tree.
    pub root: PathBuf,

    /// Directory of hook executables, `<root>/hooks.d` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hooks_dir: Option<PathBuf>,

    /// Second root to scan for generic methods and techniques.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_path: Option<PathBuf>,
}

impl Settings {
    /// Canonical tree directory below installation root.
    pub fn tree_dir(&self) -> PathBuf {
        self.root.join(TREE_DIR)
    }

    /// Directory to look up hooks in.
    pub fn hooks_dir(&self) -> PathBuf {
        self.hooks_dir
            .clone()
            .unwrap_or_else(|| self.root.join(HOOKS_DIR))
    }
}

fn expand(path: &Path) -> Result<PathBuf> {
    Ok(PathBuf::from(
        shellexpand::full(path.to_string_lossy().as_ref())?.into_owned(),
    ))
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
