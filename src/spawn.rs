//! Running a prepared invocation.
//!
//! The spawn adapter hands the prepared `{command, args, options}` to
//! `tokio::process` unchanged. Pre-escaped `cmd.exe` command lines are appended
//! with `raw_arg` on Windows so the standard library doesn't quote them again.

use crate::enoent::{verify_exit, verify_spawn};
use crate::error::ExecError;
use crate::limits::ResourceLimits;
use crate::output::Output;
use crate::parse::ParsedInvocation;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

impl ParsedInvocation {
    /// Execute the invocation asynchronously, capturing its output.
    ///
    /// Bounds come from `options.limits`; without them the process runs
    /// unbounded.
    ///
    /// # Errors
    ///
    /// - `ExecError::NotFound` if the command does not exist
    /// - `ExecError::SpawnFailed` if the process couldn't be started
    /// - `ExecError::Timeout` if the process exceeded the timeout
    /// - `ExecError::StdoutLimitExceeded` if stdout exceeded the limit
    /// - `ExecError::StderrLimitExceeded` if stderr exceeded the limit
    pub async fn spawn(self) -> Result<Output, ExecError> {
        let limits = self.options.limits.unwrap_or_default();
        self.run(limits, "spawn").await
    }

    /// Execute the invocation synchronously.
    ///
    /// The process is driven by a private runtime. When called from inside a
    /// runtime, that private runtime lives on a helper thread, so the caller's
    /// runtime (of any flavor) is never asked to drive it.
    pub fn spawn_sync(self) -> Result<Output, ExecError> {
        let limits = self.options.limits.unwrap_or_default();
        self.run_blocking(limits)
    }

    pub(crate) fn run_blocking(self, limits: ResourceLimits) -> Result<Output, ExecError> {
        if tokio::runtime::Handle::try_current().is_err() {
            return self.run_on_own_runtime(limits);
        }

        // Runtimes can't be nested on one thread
        std::thread::spawn(move || self.run_on_own_runtime(limits))
            .join()
            .unwrap_or_else(|_| {
                Err(ExecError::SpawnFailed {
                    reason: "spawn thread panicked".to_string(),
                })
            })
    }

    fn run_on_own_runtime(self, limits: ResourceLimits) -> Result<Output, ExecError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ExecError::SpawnFailed {
                reason: format!("failed to create runtime: {}", e),
            })?;
        rt.block_on(self.run(limits, "spawnSync"))
    }

    pub(crate) async fn run(
        self,
        limits: ResourceLimits,
        syscall: &'static str,
    ) -> Result<Output, ExecError> {
        let start = Instant::now();

        debug!(
            command = %self.command,
            args = self.args.len(),
            verbatim = self.options.verbatim_arguments,
            bounded = !limits.is_unlimited(),
            "Spawning process"
        );

        let mut child = self
            .build_command()
            .spawn()
            .map_err(|e| verify_spawn(&self, e, syscall))?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let _ = child.kill().await;
            return Err(ExecError::SpawnFailed {
                reason: "output pipes were not created".to_string(),
            });
        };

        let read_both = async {
            tokio::try_join!(
                read_limited(stdout, limits.max_stdout, "stdout", |limit| {
                    ExecError::StdoutLimitExceeded { limit }
                }),
                read_limited(stderr, limits.max_stderr, "stderr", |limit| {
                    ExecError::StderrLimitExceeded { limit }
                }),
            )
        };

        let captured = match limits.timeout {
            Some(limit) => match timeout(limit, read_both).await {
                Ok(captured) => captured,
                Err(_) => {
                    let elapsed = start.elapsed();
                    let _ = child.kill().await;
                    return Err(ExecError::Timeout { limit, elapsed });
                }
            },
            None => read_both.await,
        };

        let (stdout, stderr) = match captured {
            Ok(streams) => streams,
            Err(error) => {
                let _ = child.kill().await;
                return Err(error);
            }
        };

        let status = child.wait().await.map_err(|e| ExecError::SpawnFailed {
            reason: format!("wait error: {}", e),
        })?;

        if let Some(error) = verify_exit(&self, status.code(), syscall) {
            return Err(error);
        }

        Ok(Output {
            stdout,
            stderr,
            status,
        })
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.command);
        self.push_args(&mut cmd);

        if let Some(cwd) = &self.options.cwd {
            cmd.current_dir(cwd);
        }

        cmd.envs(&self.options.env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    #[cfg(windows)]
    fn push_args(&self, cmd: &mut Command) {
        if self.options.verbatim_arguments {
            for arg in &self.args {
                cmd.raw_arg(arg);
            }
        } else {
            cmd.args(&self.args);
        }
    }

    #[cfg(not(windows))]
    fn push_args(&self, cmd: &mut Command) {
        cmd.args(&self.args);
    }
}

/// Read a stream to the end, failing once more than `limit` bytes arrive.
async fn read_limited<R: AsyncRead + Unpin>(
    mut reader: R,
    limit: Option<usize>,
    stream: &str,
    exceeded: fn(usize) -> ExecError,
) -> Result<Vec<u8>, ExecError> {
    let mut captured = Vec::new();
    let mut buf = [0u8; 8192];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => return Ok(captured), // EOF
            Ok(n) => {
                if let Some(limit) = limit {
                    if captured.len() + n > limit {
                        return Err(exceeded(limit));
                    }
                }
                captured.extend_from_slice(&buf[..n]);
            }
            Err(e) => {
                return Err(ExecError::SpawnFailed {
                    reason: format!("{stream} read error: {e}"),
                });
            }
        }
    }
}
