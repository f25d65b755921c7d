//! Invocation preparation.
//!
//! Turns a `(command, args, options)` request into the exact program and
//! argument list to hand to the OS, so that spawning behaves like a shell would:
//!
//! - **Direct mode** (no `shell` option): off Windows this is a passthrough, the
//!   kernel resolves PATH and shebangs itself. On Windows the command is
//!   resolved through PATH/PATHEXT, a `#!` interpreter is substituted for
//!   scripts, and anything that is not a `.exe`/`.com` is wrapped in
//!   `cmd.exe /d /s /c "..."` with every token escaped.
//! - **Shell mode**: command and arguments are joined into one line and handed
//!   to the platform shell unescaped, unless the downstream spawner delegates
//!   to a shell natively.
//!
//! Preparation never fails. A command that cannot be resolved is passed on
//! unchanged and fails at spawn time like any missing program.

use crate::escape::{escape_argument, escape_command};
use crate::options::SpawnOptions;
use crate::platform::{Platform, PlatformKind};
use crate::resolve::Resolver;
use crate::shebang::ShebangReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A fully prepared invocation.
///
/// Produced by [`Parser::parse`] (usually through `Launcher`). Holds copies of
/// the caller's arguments and options, never references to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInvocation {
    pub(crate) command: String,
    pub(crate) args: Vec<String>,
    pub(crate) options: SpawnOptions,
    pub(crate) file: Option<PathBuf>,
    pub(crate) original: String,
    pub(crate) platform: PlatformKind,
}

impl ParsedInvocation {
    /// Program to execute.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Arguments to pass (not including the program itself).
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Options, including `verbatim_arguments` when the args are pre-escaped.
    pub fn options(&self) -> &SpawnOptions {
        &self.options
    }

    /// Resolved executable, if resolution ran and succeeded.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// The command exactly as the caller gave it.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Platform the invocation was prepared for.
    pub fn platform(&self) -> PlatformKind {
        self.platform
    }
}

/// Prepares invocations for one platform profile.
#[derive(Debug)]
pub struct Parser {
    platform: Platform,
    resolver: Resolver,
    shebang: ShebangReader,
}

impl Parser {
    pub fn new(platform: Platform, resolver: Resolver, shebang: ShebangReader) -> Self {
        Self {
            platform,
            resolver,
            shebang,
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Prepare `command` with `args`.
    ///
    /// Arguments may be anything printable; they are stringified on entry.
    pub fn parse<S: ToString>(
        &self,
        command: &str,
        args: &[S],
        options: &SpawnOptions,
    ) -> ParsedInvocation {
        let parsed = ParsedInvocation {
            command: command.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            options: options.clone(),
            file: None,
            original: command.to_string(),
            platform: self.platform.kind(),
        };

        if parsed.options.shell.is_enabled() {
            self.parse_shell(parsed)
        } else {
            self.parse_direct(parsed)
        }
    }

    /// Prepare `command` without arguments.
    pub fn parse_command(&self, command: &str, options: &SpawnOptions) -> ParsedInvocation {
        self.parse::<&str>(command, &[], options)
    }

    /// Forget every cached lookup.
    pub fn clear_caches(&self) {
        self.resolver.clear_cache();
        self.shebang.clear_cache();
    }

    fn parse_direct(&self, mut parsed: ParsedInvocation) -> ParsedInvocation {
        if !self.platform.is_windows() {
            return parsed;
        }

        let command_file = self.detect_shebang(&mut parsed);

        // Executables run directly; scripts and unresolved names need cmd.exe
        let needs_shell = !command_file.as_deref().is_some_and(is_direct_executable);

        if parsed.options.force_shell || needs_shell {
            let program = match &command_file {
                Some(file) => file.to_string_lossy().into_owned(),
                None => parsed.command.clone(),
            };

            let mut line = escape_command(&program);
            for arg in &parsed.args {
                line.push(' ');
                line.push_str(&escape_argument(arg));
            }

            debug!(
                original = %parsed.original,
                force_shell = parsed.options.force_shell,
                "Wrapping command in cmd.exe"
            );

            let comspec = self.platform.comspec();
            wrap_in_cmd(&mut parsed, comspec, &line);
        }

        parsed
    }

    /// Resolve the command and substitute its `#!` interpreter, if it has one.
    ///
    /// Returns the file that will actually be executed.
    fn detect_shebang(&self, parsed: &mut ParsedInvocation) -> Option<PathBuf> {
        let file = self.resolver.resolve_any(&self.platform, &parsed.command)?;
        parsed.file = Some(file.clone());

        let Some(interpreter) = self.shebang.read(&file) else {
            return Some(file);
        };

        debug!(file = %file.display(), interpreter = %interpreter, "Running script through its interpreter");

        parsed.args.insert(0, file.to_string_lossy().into_owned());
        parsed.command = interpreter;

        let interpreter_file = self.resolver.resolve_any(&self.platform, &parsed.command);
        if let Some(resolved) = &interpreter_file {
            parsed.file = Some(resolved.clone());
        }

        interpreter_file
    }

    fn parse_shell(&self, mut parsed: ParsedInvocation) -> ParsedInvocation {
        if self.platform.native_shell() {
            return parsed;
        }

        let mut line = parsed.command.clone();
        for arg in &parsed.args {
            line.push(' ');
            line.push_str(arg);
        }

        let shell = match parsed.options.shell.custom() {
            Some(shell) => shell.to_string(),
            None => self.platform.default_shell(),
        };

        if self.platform.is_windows() {
            wrap_in_cmd(&mut parsed, shell, &line);
        } else {
            parsed.command = shell;
            parsed.args = vec!["-c".to_string(), line];
        }

        parsed
    }
}

fn wrap_in_cmd(parsed: &mut ParsedInvocation, shell: String, line: &str) {
    parsed.command = shell;
    parsed.args = vec![
        "/d".to_string(),
        "/s".to_string(),
        "/c".to_string(),
        format!("\"{line}\""),
    ];
    parsed.options.verbatim_arguments = true;
}

/// Whether Windows can start `file` without a shell.
fn is_direct_executable(file: &Path) -> bool {
    let name = file.to_string_lossy().to_ascii_lowercase();
    name.ends_with(".exe") || name.ends_with(".com")
}
