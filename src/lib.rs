//! # proc_spawn
//!
//! Cross-platform command preparation for process spawning.
//!
//! `proc_spawn` sits between a caller who wants to run `command args...` and the
//! OS process-creation call. It makes spawning behave the same everywhere:
//! bare names are found through `PATH` (and `PATHEXT` on Windows), `#!`
//! scripts are run through their interpreter on Windows, and anything that has
//! to go through `cmd.exe` is escaped so arguments arrive exactly as given.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use proc_spawn::{Launcher, SpawnOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Build once, reuse: the launcher owns the lookup caches
//! let launcher = Launcher::new();
//!
//! // Inspect what would be executed
//! let parsed = launcher.parse("npm", &["install", "left pad"], &SpawnOptions::new());
//! println!("{} {:?}", parsed.command(), parsed.args());
//!
//! // Or run it
//! let output = launcher.spawn("npm", &["--version"], &SpawnOptions::new()).await?;
//! println!("stdout: {}", output.stdout_string());
//! # Ok(())
//! # }
//! ```
//!
//! ## What happens on each platform
//!
//! - **Unix**: direct invocations pass through untouched; the kernel already
//!   handles PATH lookup and shebangs. Shell invocations become
//!   `/bin/sh -c "<line>"` (`/system/bin/sh` on Android).
//! - **Windows**: the command is resolved, shebang scripts are rewritten to run
//!   their interpreter, and anything that is not a `.exe`/`.com` is wrapped in
//!   `cmd.exe /d /s /c "<escaped line>"` with verbatim arguments.
//!
//! Preparation never fails. A command that can't be resolved is passed on as
//! given and surfaces as `ExecError::NotFound` when spawned.

mod cache;
mod enoent;
mod error;
mod escape;
mod file_check;
mod launcher;
mod limits;
mod options;
mod output;
mod parse;
mod platform;
mod resolve;
mod shebang;
mod spawn;

// Public API
pub use cache::{Cached, CommandCache, DEFAULT_CAPACITY, DEFAULT_TTL};
pub use error::{ConfigError, ExecError};
pub use escape::{escape_argument, escape_command};
pub use launcher::{Launcher, LauncherBuilder};
pub use limits::ResourceLimits;
pub use options::{ShellMode, SpawnOptions};
pub use output::Output;
pub use parse::{ParsedInvocation, Parser};
pub use platform::{Platform, PlatformKind, DEFAULT_COMSPEC, DEFAULT_PATHEXT};
pub use resolve::Resolver;
pub use shebang::{parse_shebang, ShebangReader, SHEBANG_READ_LIMIT};
