//! Executable lookup across the search path.
//!
//! Resolution follows what a shell does when handed a bare program name:
//! - a name containing a path separator is looked up relative to the working
//!   directory only
//! - otherwise every `PATH` entry is tried in order (on Windows the working
//!   directory comes first)
//! - an empty `PATH` entry means the working directory
//! - on Windows each `PATHEXT` extension is appended in turn, so `foo` finds
//!   `foo.bat`
//!
//! Lookups are cached, hits and misses alike.

use crate::cache::{Cached, CommandCache};
use crate::file_check::is_executable;
use crate::platform::Platform;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// Resolves command names to absolute executable paths.
#[derive(Debug, Default)]
pub struct Resolver {
    cache: CommandCache<PathBuf>,
}

impl Resolver {
    pub fn new(cache: CommandCache<PathBuf>) -> Self {
        Self { cache }
    }

    /// Resolve `command` to an absolute path, or `None` if nothing matches.
    ///
    /// With `no_extension` set, `PATHEXT` inference is disabled: only a file
    /// whose name is exactly `command` counts. This is how an already
    /// fully-named file (`script.js`, an extensionless shebang script) is
    /// found on Windows.
    pub fn resolve(&self, platform: &Platform, command: &str, no_extension: bool) -> Option<PathBuf> {
        let key = format!("{command}!{no_extension}");

        match self.cache.get(&key) {
            Cached::Found(path) => {
                trace!(command, no_extension, path = %path.display(), "Resolution cache hit");
                return Some(path);
            }
            Cached::Absent => {
                trace!(command, no_extension, "Resolution cache hit (not found)");
                return None;
            }
            Cached::Miss => {}
        }

        let resolved = search(platform, command, no_extension);
        match &resolved {
            Some(path) => debug!(command, no_extension, path = %path.display(), "Resolved command"),
            None => debug!(command, no_extension, "Command not found on search path"),
        }

        self.cache.set(key, resolved.clone());
        resolved
    }

    /// Resolve with extension inference, falling back to an exact-name lookup.
    pub fn resolve_any(&self, platform: &Platform, command: &str) -> Option<PathBuf> {
        self.resolve(platform, command, false)
            .or_else(|| self.resolve(platform, command, true))
    }

    /// Forget every cached lookup.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn search(platform: &Platform, command: &str, no_extension: bool) -> Option<PathBuf> {
    if command.is_empty() {
        return None;
    }

    let cwd = platform.cwd();

    let dirs: Vec<PathBuf> = if platform.has_path_separator(command) {
        vec![PathBuf::new()]
    } else {
        let mut dirs = Vec::new();
        if platform.is_windows() {
            dirs.extend(cwd.clone());
        }
        dirs.extend(platform.search_path());
        dirs
    };

    let extensions = if no_extension {
        Vec::new()
    } else {
        platform.executable_extensions()
    };

    // A name that already carries a dot may be complete as given
    let mut suffixes: Vec<&str> = Vec::with_capacity(extensions.len() + 1);
    if extensions.is_empty() || command.contains('.') {
        suffixes.push("");
    }
    suffixes.extend(extensions.iter().map(String::as_str));

    for dir in &dirs {
        for suffix in &suffixes {
            let candidate = absolutize(&dir.join(format!("{command}{suffix}")), cwd.as_deref());
            trace!(candidate = %candidate.display(), "Checking candidate");

            if is_executable(&candidate, platform, &extensions) {
                return Some(candidate);
            }
        }
    }

    None
}

/// Make `path` absolute against `cwd` and fold `.` and `..` lexically.
fn absolutize(path: &Path, cwd: Option<&Path>) -> PathBuf {
    let joined = match cwd {
        Some(cwd) if path.is_relative() => cwd.join(path),
        _ => path.to_path_buf(),
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() && !normalized.has_root() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_file(path: &Path, content: &str, mode: u32) {
        std::fs::write(path, content).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    fn unix_with_path(dir: &Path) -> Platform {
        Platform::unix()
            .with_var("PATH", dir.display().to_string())
            .with_cwd(dir)
    }

    #[test]
    fn test_unix_finds_executable_on_path() {
        let tmp = TempDir::new().unwrap();
        let tool = tmp.path().join("mytool");
        write_file(&tool, "#!/bin/sh\n", 0o755);

        let resolver = Resolver::default();
        let platform = unix_with_path(tmp.path());
        assert_eq!(resolver.resolve(&platform, "mytool", false), Some(tool.clone()));
        assert_eq!(resolver.resolve(&platform, "mytool", true), Some(tool));
    }

    #[test]
    fn test_unix_skips_non_executable() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("data"), "plain", 0o644);

        let resolver = Resolver::default();
        assert_eq!(resolver.resolve(&unix_with_path(tmp.path()), "data", false), None);
    }

    #[test]
    fn test_path_order_is_respected() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_file(&first.path().join("dup"), "", 0o755);
        write_file(&second.path().join("dup"), "", 0o755);

        let platform = Platform::unix().with_var(
            "PATH",
            format!("{}:{}", first.path().display(), second.path().display()),
        );
        let resolver = Resolver::default();
        assert_eq!(
            resolver.resolve(&platform, "dup", false),
            Some(first.path().join("dup"))
        );
    }

    #[test]
    fn test_empty_path_entry_is_working_directory() {
        let tmp = TempDir::new().unwrap();
        let tool = tmp.path().join("local-tool");
        write_file(&tool, "", 0o755);

        let elsewhere = TempDir::new().unwrap();
        let platform = Platform::unix()
            .with_var("PATH", format!("{}:", elsewhere.path().display()))
            .with_cwd(tmp.path());
        let resolver = Resolver::default();
        assert_eq!(resolver.resolve(&platform, "local-tool", false), Some(tool));

        let platform = Platform::unix()
            .with_var("PATH", elsewhere.path().display().to_string())
            .with_cwd(tmp.path());
        assert_eq!(Resolver::default().resolve(&platform, "local-tool", false), None);
    }

    #[test]
    fn test_relative_command_resolves_against_cwd() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("bin")).unwrap();
        let tool = tmp.path().join("bin").join("tool");
        write_file(&tool, "", 0o755);

        // PATH deliberately empty: a path-like command never consults it
        let platform = Platform::unix().with_cwd(tmp.path());
        let resolver = Resolver::default();
        assert_eq!(resolver.resolve(&platform, "./bin/tool", false), Some(tool.clone()));
        assert_eq!(resolver.resolve(&platform, "bin/../bin/tool", false), Some(tool));
    }

    #[test]
    fn test_cache_hit_does_not_touch_filesystem() {
        let tmp = TempDir::new().unwrap();
        let tool = tmp.path().join("ephemeral");
        write_file(&tool, "", 0o755);

        let resolver = Resolver::default();
        let platform = unix_with_path(tmp.path());
        assert_eq!(resolver.resolve(&platform, "ephemeral", false), Some(tool.clone()));
        assert_eq!(resolver.resolve(&platform, "ephemeral", true), Some(tool.clone()));

        // Once cached, deleting the file changes nothing
        std::fs::remove_file(&tool).unwrap();
        assert_eq!(resolver.resolve(&platform, "ephemeral", false), Some(tool.clone()));
        assert_eq!(resolver.resolve(&platform, "ephemeral", true), Some(tool));

        resolver.clear_cache();
        assert_eq!(resolver.resolve(&platform, "ephemeral", false), None);
    }

    #[test]
    fn test_negative_result_is_cached() {
        let tmp = TempDir::new().unwrap();
        let resolver = Resolver::default();
        let platform = unix_with_path(tmp.path());

        assert_eq!(resolver.resolve(&platform, "late", false), None);

        // Appears after the miss was cached: still reported missing
        write_file(&tmp.path().join("late"), "", 0o755);
        assert_eq!(resolver.resolve(&platform, "late", false), None);
    }

    #[test]
    fn test_windows_pathext_inference() {
        let tmp = TempDir::new().unwrap();
        let bat = tmp.path().join("foo.bat");
        write_file(&bat, "@echo foo", 0o644);

        let platform = Platform::windows()
            .with_var("PATH", "")
            .with_var("PATHEXT", ".com;.exe;.bat")
            .with_cwd(tmp.path());
        let resolver = Resolver::default();

        // Working directory is searched first on Windows
        assert_eq!(resolver.resolve(&platform, "foo", false), Some(bat.clone()));
        // Exact-name lookup does not infer extensions
        assert_eq!(resolver.resolve(&platform, "foo", true), None);
        // Already-suffixed names match as given
        assert_eq!(resolver.resolve(&platform, "foo.bat", false), Some(bat));
    }

    #[test]
    fn test_windows_unlisted_extension_needs_exact_lookup() {
        let tmp = TempDir::new().unwrap();
        let script = tmp.path().join("shebang.js");
        write_file(&script, "#!/usr/bin/env node\n", 0o644);

        let platform = Platform::windows()
            .with_var("PATHEXT", ".exe;.bat")
            .with_cwd(tmp.path());
        let resolver = Resolver::default();

        assert_eq!(resolver.resolve(&platform, "shebang.js", false), None);
        assert_eq!(resolver.resolve_any(&platform, "shebang.js"), Some(script));
    }

    #[test]
    fn test_empty_command_is_unresolved() {
        let resolver = Resolver::default();
        assert_eq!(resolver.resolve(&Platform::unix(), "", false), None);
    }

    #[test]
    fn test_absolutize() {
        let cwd = Path::new("/work/project");
        assert_eq!(
            absolutize(Path::new("./a/../b"), Some(cwd)),
            PathBuf::from("/work/project/b")
        );
        assert_eq!(absolutize(Path::new("/x/./y"), Some(cwd)), PathBuf::from("/x/y"));
        assert_eq!(absolutize(Path::new("/../x"), None), PathBuf::from("/x"));
        assert_eq!(absolutize(Path::new("../x"), None), PathBuf::from("../x"));
    }
}
