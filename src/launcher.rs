//! Configured entry point.
//!
//! A `Launcher` owns the platform profile and both lookup caches. Build one at
//! startup and share it; the caches only pay off when the same launcher
//! prepares many invocations.

use crate::cache::{CommandCache, DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::error::{ConfigError, ExecError};
use crate::limits::ResourceLimits;
use crate::options::SpawnOptions;
use crate::output::Output;
use crate::parse::{ParsedInvocation, Parser};
use crate::platform::Platform;
use crate::resolve::Resolver;
use crate::shebang::ShebangReader;
use std::num::NonZeroUsize;
use std::time::Duration;

/// Prepares and runs commands for one platform.
///
/// Create using `Launcher::new()` or `Launcher::builder()`.
#[derive(Debug)]
pub struct Launcher {
    parser: Parser,

    /// Bounds for requests that don't carry their own. Unlimited by default.
    limits: ResourceLimits,
}

impl Launcher {
    /// Launcher for the host platform with default settings.
    pub fn new() -> Self {
        Self::from_parts(Platform::current(), DEFAULT_CAPACITY, DEFAULT_TTL, ResourceLimits::default())
    }

    /// Create a new launcher builder.
    pub fn builder() -> LauncherBuilder {
        LauncherBuilder::new()
    }

    fn from_parts(
        platform: Platform,
        capacity: NonZeroUsize,
        ttl: Duration,
        limits: ResourceLimits,
    ) -> Self {
        let resolver = Resolver::new(CommandCache::new(capacity, ttl));
        let shebang = ShebangReader::new(CommandCache::new(capacity, ttl));

        Self {
            parser: Parser::new(platform, resolver, shebang),
            limits,
        }
    }

    pub fn platform(&self) -> &Platform {
        self.parser.platform()
    }

    /// Prepare an invocation without running it.
    pub fn parse<S: ToString>(
        &self,
        command: &str,
        args: &[S],
        options: &SpawnOptions,
    ) -> ParsedInvocation {
        self.parser.parse(command, args, options)
    }

    /// Prepare an invocation that takes no arguments.
    pub fn parse_command(&self, command: &str, options: &SpawnOptions) -> ParsedInvocation {
        self.parser.parse_command(command, options)
    }

    /// Prepare and run a command, capturing its output.
    ///
    /// # Errors
    ///
    /// See [`ParsedInvocation::spawn`].
    pub async fn spawn<S: ToString>(
        &self,
        command: &str,
        args: &[S],
        options: &SpawnOptions,
    ) -> Result<Output, ExecError> {
        let parsed = self.parse(command, args, options);
        let limits = parsed.options.limits.unwrap_or(self.limits);
        parsed.run(limits, "spawn").await
    }

    /// Blocking variant of [`Launcher::spawn`].
    pub fn spawn_sync<S: ToString>(
        &self,
        command: &str,
        args: &[S],
        options: &SpawnOptions,
    ) -> Result<Output, ExecError> {
        let parsed = self.parse(command, args, options);
        let limits = parsed.options.limits.unwrap_or(self.limits);
        parsed.run_blocking(limits)
    }

    /// Forget every cached lookup, e.g. after changing `PATH`.
    pub fn clear_caches(&self) {
        self.parser.clear_caches();
    }
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Launcher`.
#[derive(Debug, Clone)]
pub struct LauncherBuilder {
    platform: Platform,

    /// Entries per lookup cache (validated at build).
    cache_capacity: usize,

    cache_ttl: Duration,

    limits: ResourceLimits,
}

impl LauncherBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            platform: Platform::current(),
            cache_capacity: DEFAULT_CAPACITY.get(),
            cache_ttl: DEFAULT_TTL,
            limits: ResourceLimits::default(),
        }
    }

    /// Set the platform profile.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Set how many entries each lookup cache keeps.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set how long cached lookups stay valid.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Kill processes that run longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.limits.timeout = Some(timeout);
        self
    }

    /// Set default bounds for every spawn.
    pub fn limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Build the launcher.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroCacheCapacity` if the cache capacity is zero.
    pub fn build(self) -> Result<Launcher, ConfigError> {
        let capacity = NonZeroUsize::new(self.cache_capacity).ok_or(ConfigError::ZeroCacheCapacity)?;

        Ok(Launcher::from_parts(
            self.platform,
            capacity,
            self.cache_ttl,
            self.limits,
        ))
    }
}

impl Default for LauncherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
