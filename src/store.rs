// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Technique store management and manipulation.
//!
//! Techniques that ncf writes are grouped together into one place called the
//! __technique store__, i.e., the `50_techniques/` directory of a tree. Each
//! technique owns a directory named after its bundle, holding the generated
//! policy file of the same name:
//!
//! ```text
//! <root>/50_techniques/bla/bla.cf
//! ```
//!
//! Every modification is wrapped in `pre` and `post` hooks. A failing `pre`
//! hook aborts the modification before anything touches the filesystem.

use crate::{
    generate::generate_technique_content,
    hook::{HookArgs, HookError, Hooks, Phase},
    metadata::MetadataRecord,
    path::{technique_dir, technique_path},
    validate::{
        add_default_values_technique_metadata, check_bundle_name, check_technique_metadata,
        ValidationError,
    },
};

use std::{
    fs::{create_dir_all, remove_dir_all, write},
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Action name of technique writes for hook lookup.
pub const WRITE_TECHNIQUE: &str = "write_technique";

/// Action name of technique deletion for hook lookup.
pub const DELETE_TECHNIQUE: &str = "delete_technique";

/// Technique store rooted at a tree directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechniqueStore {
    root: PathBuf,
    hooks: Hooks,
}

impl TechniqueStore {
    /// Construct new technique store over tree root with hook dispatcher.
    pub fn new(root: impl Into<PathBuf>, hooks: Hooks) -> Self {
        Self {
            root: root.into(),
            hooks,
        }
    }

    /// Tree root of store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of technique in store.
    pub fn technique_dir(&self, bundle_name: &str) -> PathBuf {
        technique_dir(&self.root, bundle_name)
    }

    /// Policy file of technique in store.
    pub fn technique_path(&self, bundle_name: &str) -> PathBuf {
        technique_path(&self.root, bundle_name)
    }

    /// Write technique into store.
    ///
    /// Checks the record, fills in defaults, and writes the generated policy
    /// text to `<root>/50_techniques/<bundle_name>/<bundle_name>.cf`. An
    /// existing policy file is overwritten. Returns path of written file.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Validation`] if record is not a usable technique.
    /// - Return [`StoreError::Hook`] if a `pre` or `post` hook fails.
    /// - Return [`StoreError::CreateDir`] if technique directory cannot be
    ///   created.
    /// - Return [`StoreError::WriteFile`] if policy file cannot be written.
    #[instrument(skip(self, record), level = "debug")]
    pub fn write_technique(&self, record: &MetadataRecord) -> Result<PathBuf> {
        check_technique_metadata(record)?;
        let record = add_default_values_technique_metadata(record.clone());
        let content = generate_technique_content(&record)?;

        // INVARIANT: Bundle name is known to be a plain identifier after check.
        let bundle_name = record.text("bundle_name").unwrap_or_default();
        let args = self.hook_args(bundle_name);

        self.hooks.run(Phase::Pre, WRITE_TECHNIQUE, &args)?;

        let dir = self.technique_dir(bundle_name);
        create_dir_all(&dir).map_err(|err| StoreError::CreateDir {
            source: err,
            path: dir.clone(),
        })?;

        let path = self.technique_path(bundle_name);
        write(&path, content).map_err(|err| StoreError::WriteFile {
            source: err,
            path: path.clone(),
        })?;
        info!("wrote technique {bundle_name:?} to {:?}", path.display());

        self.hooks.run(Phase::Post, WRITE_TECHNIQUE, &args)?;

        Ok(path)
    }

    /// Delete technique directory from store, with everything inside it.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Validation`] if `bundle_name` is not a plain
    ///   identifier. No hooks run in that case.
    /// - Return [`StoreError::NotFound`] if technique directory does not
    ///   exist. No hooks run in that case.
    /// - Return [`StoreError::Hook`] if a `pre` or `post` hook fails.
    /// - Return [`StoreError::RemoveDir`] if technique directory cannot be
    ///   removed.
    #[instrument(skip(self), level = "debug")]
    pub fn delete_technique(&self, bundle_name: &str) -> Result<()> {
        // INVARIANT: Bundle name must never resolve outside its own directory.
        check_bundle_name(bundle_name)?;

        let dir = self.technique_dir(bundle_name);
        if !dir.is_dir() {
            return Err(StoreError::NotFound {
                bundle_name: bundle_name.to_string(),
                path: dir,
            });
        }

        let args = self.hook_args(bundle_name);
        self.hooks.run(Phase::Pre, DELETE_TECHNIQUE, &args)?;

        remove_dir_all(&dir).map_err(|err| StoreError::RemoveDir {
            source: err,
            path: dir.clone(),
        })?;
        info!("deleted technique {bundle_name:?} at {:?}", dir.display());

        self.hooks.run(Phase::Post, DELETE_TECHNIQUE, &args)?;

        Ok(())
    }

    fn hook_args(&self, bundle_name: &str) -> HookArgs {
        HookArgs::new()
            .arg("technique_name", bundle_name)
            .arg("path", self.root.to_string_lossy())
    }
}

/// All possible error types for technique store interaction.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Technique record is not usable.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Hook failed around store modification.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// Technique directory cannot be created.
    #[error("failed to create technique directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Technique policy file cannot be written.
    #[error("failed to write technique file {:?}", path.display())]
    WriteFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Technique directory cannot be removed.
    #[error("failed to remove technique directory {:?}", path.display())]
    RemoveDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Technique to delete does not exist.
    #[error("technique {bundle_name:?} not found at {:?}", path.display())]
    NotFound { bundle_name: String, path: PathBuf },
}

/// Friendly result alias :3
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
