//! Spawn options.

use crate::limits::ResourceLimits;
use std::collections::HashMap;
use std::path::PathBuf;

/// Whether (and through which shell) a command line is run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShellMode {
    /// Execute the program directly (default).
    #[default]
    Disabled,

    /// Run through the platform shell: `cmd.exe` (or `COMSPEC`) on Windows,
    /// `/bin/sh` elsewhere.
    Default,

    /// Run through the shell at this path.
    Custom(String),
}

impl ShellMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, ShellMode::Disabled)
    }

    /// Explicit shell path, if one was given.
    pub fn custom(&self) -> Option<&str> {
        match self {
            ShellMode::Custom(shell) => Some(shell),
            _ => None,
        }
    }
}

/// Options for a spawn request.
///
/// Only `shell`, `force_shell` and `verbatim_arguments` influence how a command
/// is prepared; everything else is carried through to the spawned process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnOptions {
    /// Shell delegation mode.
    pub shell: ShellMode,

    /// Always wrap in `cmd.exe` on Windows, even for `.exe` files.
    ///
    /// Exists so the shell-wrapped path can be exercised in tests.
    pub force_shell: bool,

    /// Arguments are already escaped and must be passed to the process
    /// without further quoting.
    ///
    /// Set by preparation whenever it builds a `cmd.exe` command line.
    pub verbatim_arguments: bool,

    /// Working directory for the process. Inherited when `None`.
    pub cwd: Option<PathBuf>,

    /// Variables added to the inherited environment.
    pub env: HashMap<String, String>,

    /// Bounds for this request. The launcher's bounds apply when `None`.
    pub limits: Option<ResourceLimits>,
}

impl SpawnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run through the platform's default shell.
    pub fn with_shell(mut self) -> Self {
        self.shell = ShellMode::Default;
        self
    }

    /// Run through a specific shell.
    pub fn with_shell_path(mut self, shell: impl Into<String>) -> Self {
        self.shell = ShellMode::Custom(shell.into());
        self
    }

    pub fn with_force_shell(mut self, force: bool) -> Self {
        self.force_shell = force;
        self
    }

    /// Set the working directory.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Add a single environment variable.
    pub fn with_env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Override the launcher's resource limits for this request.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = Some(limits);
        self
    }
}
