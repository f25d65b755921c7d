//! Not-found detection for shell-wrapped commands.
//!
//! When Windows runs a command through `cmd.exe` and the command doesn't exist,
//! the spawn itself succeeds (cmd.exe exists) and the failure only shows up as
//! exit status 1. If the command never resolved during preparation, that status
//! is reported as a proper not-found error instead.

use crate::error::ExecError;
use crate::parse::ParsedInvocation;
use crate::platform::PlatformKind;
use std::io;

/// Error for a command that could not be found, named after the caller's
/// original command.
pub fn not_found_error(parsed: &ParsedInvocation, syscall: &'static str) -> ExecError {
    ExecError::NotFound {
        command: parsed.original().to_string(),
        syscall,
    }
}

/// Map an exit status to a not-found error where that is what it means.
pub fn verify_exit(parsed: &ParsedInvocation, code: Option<i32>, syscall: &'static str) -> Option<ExecError> {
    if parsed.platform() == PlatformKind::Windows && code == Some(1) && parsed.file().is_none() {
        return Some(not_found_error(parsed, syscall));
    }

    None
}

/// Map an error from process creation.
pub fn verify_spawn(parsed: &ParsedInvocation, error: io::Error, syscall: &'static str) -> ExecError {
    if error.kind() == io::ErrorKind::NotFound {
        return not_found_error(parsed, syscall);
    }

    ExecError::SpawnFailed {
        reason: error.to_string(),
    }
}
