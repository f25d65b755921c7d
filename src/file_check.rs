//! File type and permission checks for lookup candidates.

use crate::platform::Platform;
use std::fs::Metadata;
use std::path::Path;

/// Check whether `path` is something the platform would execute.
///
/// The candidate must be a regular file. On top of that:
/// - Windows: its extension must be listed in `extensions`, unless
///   `extensions` is empty (exact-name lookups accept any file)
/// - Unix: an execute bit must apply to the current user
pub fn is_executable(path: &Path, platform: &Platform, extensions: &[String]) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };

    if !metadata.is_file() {
        return false;
    }

    if platform.is_windows() {
        return extensions.is_empty() || has_listed_extension(path, extensions);
    }

    has_execute_permission(&metadata)
}

/// Whether the file name ends in one of `extensions` (case-insensitive).
pub fn has_listed_extension(path: &Path, extensions: &[String]) -> bool {
    let name = path.to_string_lossy().to_ascii_lowercase();
    extensions
        .iter()
        .any(|ext| name.ends_with(&ext.to_ascii_lowercase()))
}

/// Check the execute bits that apply to the current user.
#[cfg(unix)]
fn has_execute_permission(metadata: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode();

    let uid = unsafe { libc::getuid() };
    let gid = unsafe { libc::getgid() };

    // Owner
    if uid == metadata.uid() && (mode & 0o100) != 0 {
        return true;
    }

    // Group
    if gid == metadata.gid() && (mode & 0o010) != 0 {
        return true;
    }

    // Other
    if (mode & 0o001) != 0 {
        return true;
    }

    // Root may execute anything with at least one execute bit
    uid == 0 && (mode & 0o111) != 0
}

#[cfg(not(unix))]
fn has_execute_permission(_metadata: &Metadata) -> bool {
    true
}
