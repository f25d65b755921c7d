//! Platform profile.
//!
//! Everything the resolver and the orchestrator need to know about the target
//! platform lives here: which family it is, how the search path is split, which
//! extensions count as executable, which shell to wrap commands in. Tests build
//! fixed profiles so Windows behaviour can be exercised on any host.

use std::collections::HashMap;
use std::path::PathBuf;

/// Extensions assumed when `PATHEXT` is unset.
pub const DEFAULT_PATHEXT: &str = ".EXE;.CMD;.BAT;.COM";

/// Command interpreter used when `COMSPEC` is unset.
pub const DEFAULT_COMSPEC: &str = "cmd.exe";

/// Target platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    Windows,
    Unix,
    /// POSIX variant whose shell lives at `/system/bin/sh`.
    Android,
}

impl PlatformKind {
    /// The family this binary was compiled for.
    pub fn host() -> Self {
        if cfg!(windows) {
            PlatformKind::Windows
        } else if cfg!(target_os = "android") {
            PlatformKind::Android
        } else {
            PlatformKind::Unix
        }
    }
}

/// Injected description of the platform a command will run on.
#[derive(Debug, Clone)]
pub struct Platform {
    kind: PlatformKind,

    /// Fixed environment; `None` reads the live process environment.
    env: Option<HashMap<String, String>>,

    /// Fixed working directory; `None` uses the process's current directory.
    cwd: Option<PathBuf>,

    /// Whether the downstream spawn primitive handles `shell` itself.
    native_shell: bool,
}

impl Platform {
    /// Profile of the host, reading the live environment on every lookup.
    pub fn current() -> Self {
        Self::with_kind(PlatformKind::host())
    }

    /// Windows profile with an empty fixed environment.
    pub fn windows() -> Self {
        Self::with_kind(PlatformKind::Windows).with_env(HashMap::new())
    }

    /// Generic POSIX profile with an empty fixed environment.
    pub fn unix() -> Self {
        Self::with_kind(PlatformKind::Unix).with_env(HashMap::new())
    }

    /// Android profile with an empty fixed environment.
    pub fn android() -> Self {
        Self::with_kind(PlatformKind::Android).with_env(HashMap::new())
    }

    fn with_kind(kind: PlatformKind) -> Self {
        Self {
            kind,
            env: None,
            cwd: None,
            native_shell: false,
        }
    }

    /// Replace the environment with a fixed map.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Set a single variable, switching to a fixed environment if needed.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Pin the working directory used for relative lookups.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Declare that the downstream spawn primitive delegates to a shell on its
    /// own, so shell-mode invocations are passed through untouched.
    pub fn with_native_shell(mut self, native: bool) -> Self {
        self.native_shell = native;
        self
    }

    /// Platform family.
    pub fn kind(&self) -> PlatformKind {
        self.kind
    }

    /// Whether this is the Windows profile.
    pub fn is_windows(&self) -> bool {
        self.kind == PlatformKind::Windows
    }

    /// Whether shell-mode invocations are left to the spawn primitive.
    pub fn native_shell(&self) -> bool {
        self.native_shell
    }

    /// Read an environment variable. Names are case-insensitive on Windows.
    pub fn var(&self, key: &str) -> Option<String> {
        match &self.env {
            Some(env) if self.is_windows() => env
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.clone()),
            Some(env) => env.get(key).cloned(),
            None => std::env::var(key).ok(),
        }
    }

    /// Working directory for relative lookups.
    pub fn cwd(&self) -> Option<PathBuf> {
        match &self.cwd {
            Some(cwd) => Some(cwd.clone()),
            None => std::env::current_dir()
                .map_err(|e| tracing::debug!(error = %e, "Cannot read current directory"))
                .ok(),
        }
    }

    /// Separator between `PATH` entries.
    pub fn path_delimiter(&self) -> char {
        if self.is_windows() {
            ';'
        } else {
            ':'
        }
    }

    /// Whether `command` names a path rather than a bare program name.
    pub fn has_path_separator(&self, command: &str) -> bool {
        command.contains('/') || (self.is_windows() && command.contains('\\'))
    }

    /// Directories listed in `PATH`, unquoted.
    ///
    /// An empty entry (and an unset `PATH`) stands for the working directory
    /// and comes back as an empty path, which lookups join onto `cwd`.
    pub fn search_path(&self) -> Vec<PathBuf> {
        let path = self.var("PATH").unwrap_or_default();

        path.split(self.path_delimiter())
            .map(|entry| {
                entry
                    .strip_prefix('"')
                    .and_then(|e| e.strip_suffix('"'))
                    .unwrap_or(entry)
            })
            .map(PathBuf::from)
            .collect()
    }

    /// Extensions recognised as executable (`PATHEXT`). Empty off Windows.
    pub fn executable_extensions(&self) -> Vec<String> {
        if !self.is_windows() {
            return Vec::new();
        }

        let pathext = self
            .var("PATHEXT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PATHEXT.to_string());

        pathext
            .split(';')
            .filter(|ext| !ext.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Windows command interpreter (`COMSPEC`, falling back to `cmd.exe`).
    pub fn comspec(&self) -> String {
        self.var("COMSPEC")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_COMSPEC.to_string())
    }

    /// Shell used for shell-mode invocations when none is given explicitly.
    pub fn default_shell(&self) -> String {
        match self.kind {
            PlatformKind::Windows => self.comspec(),
            PlatformKind::Android => "/system/bin/sh".to_string(),
            PlatformKind::Unix => "/bin/sh".to_string(),
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}
