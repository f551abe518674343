// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Hook discovery and dispatch.
//!
//! Hooks are external executables that run around operations which modify
//! the tree, e.g., committing a freshly written technique into version
//! control. All hooks live flat in one directory, and are named after the
//! phase and action they trigger on:
//!
//! ```text
//! hooks.d/
//! ├── pre.delete_technique.commit.sh
//! ├── post.write_technique.commit.sh
//! └── post.create_technique.notify.exe
//! ```
//!
//! The action part of a lookup is a live regular expression fragment, so one
//! lookup like `(write|create)_technique` can collect hooks of several
//! actions at once.
//!
//! Hooks are opaque. Nothing here interprets what a hook does beyond its exit
//! status.

use regex::Regex;
use std::{
    ffi::OsStr,
    fmt::{Display, Formatter, Result as FmtResult},
    fs::read_dir,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::Command,
    str::FromStr,
};
use tracing::{debug, info, instrument};

/// When a hook runs relative to its action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the action touches the filesystem.
    Pre,

    /// After the action completed.
    Post,
}

impl Display for Phase {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Pre => fmt.write_str("pre"),
            Self::Post => fmt.write_str("post"),
        }
    }
}

impl FromStr for Phase {
    type Err = HookError;

    fn from_str(data: &str) -> Result<Self> {
        match data {
            "pre" => Ok(Self::Pre),
            "post" => Ok(Self::Post),
            other => Err(HookError::UnknownPhase(other.to_string())),
        }
    }
}

/// List hooks of phase whose action matches pattern.
///
/// Matches file names of the immediate entries of `hooks_dir` against
/// `^<phase>\.(?:<action_pattern>)\.`. Results are sorted lexicographically.
/// A missing hooks directory simply has no hooks.
///
/// # Errors
///
/// - Return [`HookError::Pattern`] if `action_pattern` is not a valid regular
///   expression.
/// - Return [`HookError::ReadDir`] if hooks directory cannot be listed.
#[instrument(skip(hooks_dir), level = "debug")]
pub fn get_hooks(
    phase: Phase,
    action_pattern: &str,
    hooks_dir: impl AsRef<Path>,
) -> Result<Vec<String>> {
    let hooks_dir = hooks_dir.as_ref();
    let pattern = Regex::new(&format!(r"^{phase}\.(?:{action_pattern})\.")).map_err(|err| {
        HookError::Pattern {
            source: err,
            pattern: action_pattern.to_string(),
        }
    })?;

    let entries = match read_dir(hooks_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("no hooks directory at {:?}", hooks_dir.display());
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(HookError::ReadDir {
                source: err,
                path: hooks_dir.to_path_buf(),
            })
        }
    };

    let mut hooks = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| HookError::ReadDir {
            source: err,
            path: hooks_dir.to_path_buf(),
        })?;

        // INVARIANT: Hook names must be valid UTF-8 to be matched at all.
        let Some(name) = entry.file_name().to_str().map(ToString::to_string) else {
            continue;
        };

        if pattern.is_match(&name) {
            hooks.push(name);
        }
    }
    hooks.sort();

    Ok(hooks)
}

/// Arguments handed to every hook of a dispatch.
///
/// Rendered as `--key=value` in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HookArgs(Vec<(String, String)>);

impl HookArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume arguments and return them with one more key.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// Render arguments as command line flags.
    pub fn to_flags(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|(key, value)| format!("--{key}={value}"))
            .collect()
    }
}

/// Hook dispatcher.
///
/// Runs matching hooks from one hooks directory, or nothing at all when
/// disabled.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Hooks {
    hooks_dir: Option<PathBuf>,
}

impl Hooks {
    /// Construct new dispatcher over hooks directory.
    pub fn new(hooks_dir: impl Into<PathBuf>) -> Self {
        Self {
            hooks_dir: Some(hooks_dir.into()),
        }
    }

    /// Construct dispatcher that never runs anything.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Hooks directory, if any.
    pub fn hooks_dir(&self) -> Option<&Path> {
        self.hooks_dir.as_deref()
    }

    /// Run every hook registered for phase of exact action.
    ///
    /// Hooks run one after another in lexicographic order, blocking until
    /// each one exits.
    ///
    /// # Errors
    ///
    /// - Return [`HookError::Spawn`] if a hook cannot be executed.
    /// - Return [`HookError::Failed`] if a hook exits with failure. Remaining
    ///   hooks do not run.
    #[instrument(skip(self, args), level = "debug")]
    pub fn run(&self, phase: Phase, action: &str, args: &HookArgs) -> Result<()> {
        let Some(hooks_dir) = self.hooks_dir.as_deref() else {
            return Ok(());
        };

        for hook in get_hooks(phase, &regex::escape(action), hooks_dir)? {
            info!("run {phase} hook {hook:?} for {action}");
            let output = syscall_non_interactive(hooks_dir.join(&hook), args.to_flags())?;
            if !output.is_empty() {
                info!("{output}");
            }
        }

        Ok(())
    }
}

fn syscall_non_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<String> {
    let hook = PathBuf::from(cmd.as_ref());
    let output = Command::new(cmd.as_ref())
        .args(args)
        .output()
        .map_err(|err| HookError::Spawn {
            source: err,
            hook: hook.clone(),
        })?;
    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();
    let mut message = String::new();

    if !stdout.is_empty() {
        message.push_str(format!("stdout: {stdout}").as_str());
    }

    if !stderr.is_empty() {
        message.push_str(format!("stderr: {stderr}").as_str());
    }

    // INVARIANT: Chomp trailing newlines.
    let message = message
        .strip_suffix("\r\n")
        .or(message.strip_suffix('\n'))
        .map(ToString::to_string)
        .unwrap_or(message);

    if !output.status.success() {
        return Err(HookError::Failed { hook, message });
    }

    Ok(message)
}

/// Hook discovery and dispatch error types.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Phase name is neither `pre` nor `post`.
    #[error("unknown hook phase {0:?}, expected \"pre\" or \"post\"")]
    UnknownPhase(String),

    /// Action pattern is not a valid regular expression.
    #[error("invalid hook action pattern {pattern:?}")]
    Pattern {
        #[source]
        source: regex::Error,
        pattern: String,
    },

    /// Hooks directory cannot be listed.
    #[error("failed to read hooks directory at {:?}", path.display())]
    ReadDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Hook cannot be executed.
    #[error("failed to execute hook {:?}", hook.display())]
    Spawn {
        #[source]
        source: std::io::Error,
        hook: PathBuf,
    },

    /// Hook exited with failure.
    #[error("hook {:?} failed:\n{message}", hook.display())]
    Failed { hook: PathBuf, message: String },
}

/// Friendly result alias :3
pub type Result<T, E = HookError> = std::result::Result<T, E>;
