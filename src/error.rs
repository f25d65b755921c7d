//! Error types for proc_spawn.
//!
//! Resolution never fails: a command that cannot be found is represented as an
//! absent value and handed to the spawn adapter unchanged. The errors here cover
//! the two places where something can actually go wrong:
//! - [`ConfigError`]: the launcher was configured with impossible settings
//! - [`ExecError`]: the prepared invocation could not be run to completion

use std::time::Duration;
use thiserror::Error;

/// Invalid launcher configuration detected during `build()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A lookup cache must be able to hold at least one entry
    #[error("cache capacity must be greater than zero")]
    ZeroCacheCapacity,
}

/// Execution error during `spawn()`.
///
/// These errors indicate the invocation was prepared but running it failed.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The command (or the shell-wrapped command) does not exist
    #[error("{syscall} {command} ENOENT: command not found")]
    NotFound {
        command: String,
        syscall: &'static str,
    },

    /// Process exceeded timeout and was killed
    #[error("process timed out after {elapsed:?} (limit: {limit:?})")]
    Timeout { limit: Duration, elapsed: Duration },

    /// Process exceeded stdout limit and was killed
    #[error("stdout limit exceeded: {limit} bytes")]
    StdoutLimitExceeded { limit: usize },

    /// Process exceeded stderr limit and was killed
    #[error("stderr limit exceeded: {limit} bytes")]
    StderrLimitExceeded { limit: usize },

    /// Failed to spawn the process
    #[error("failed to spawn process: {reason}")]
    SpawnFailed { reason: String },
}

impl ExecError {
    /// Whether this error reports a missing command.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ExecError::NotFound { .. })
    }
}
