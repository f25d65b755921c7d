//! Optional bounds on a spawned process.
//!
//! Nothing is bounded unless asked for: a default `ResourceLimits` lets the
//! process run as long as it likes and captures all of its output, the same as
//! handing it straight to the OS.

use std::time::Duration;

/// Bounds applied while a spawned process runs. Every bound is opt-in.
///
/// When a bound that is set gets exceeded, the process is killed and the
/// matching `ExecError` is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Wall-clock time before the process is killed.
    pub timeout: Option<Duration>,

    /// Bytes of stdout captured before the process is killed.
    pub max_stdout: Option<usize>,

    /// Bytes of stderr captured before the process is killed.
    pub max_stderr: Option<usize>,
}

impl ResourceLimits {
    /// No timeout and no output caps.
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_stdout(mut self, max: usize) -> Self {
        self.max_stdout = Some(max);
        self
    }

    pub fn with_max_stderr(mut self, max: usize) -> Self {
        self.max_stderr = Some(max);
        self
    }

    /// Whether no bound is set at all.
    pub fn is_unlimited(&self) -> bool {
        self.timeout.is_none() && self.max_stdout.is_none() && self.max_stderr.is_none()
    }
}
