//! Shebang detection.
//!
//! Windows has no kernel support for `#!` lines, so a script such as
//! `#!/usr/bin/env node` has to be run through its interpreter explicitly.
//! Only a short prefix of the file is read: shebang lines are short, and
//! binaries shouldn't be loaded just to learn they have none.

use crate::cache::{Cached, CommandCache};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, trace};

/// Maximum number of bytes inspected at the start of a file.
pub const SHEBANG_READ_LIMIT: u64 = 150;

/// Reads and caches interpreter lines.
#[derive(Debug, Default)]
pub struct ShebangReader {
    cache: CommandCache<String>,
}

impl ShebangReader {
    pub fn new(cache: CommandCache<String>) -> Self {
        Self { cache }
    }

    /// Interpreter command declared by the file at `path`, if any.
    ///
    /// Unreadable, missing or non-regular files yield `None`, never an error.
    pub fn read(&self, path: &Path) -> Option<String> {
        let key = path.to_string_lossy();

        match self.cache.get(&key) {
            Cached::Found(shebang) => return Some(shebang),
            Cached::Absent => return None,
            Cached::Miss => {}
        }

        let shebang = read_prefix(path).and_then(|buf| parse_shebang(&String::from_utf8_lossy(&buf)));
        if let Some(interpreter) = &shebang {
            debug!(path = %path.display(), interpreter = %interpreter, "Detected shebang");
        }

        self.cache.set(key.into_owned(), shebang.clone());
        shebang
    }

    /// Forget every cached result.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn read_prefix(path: &Path) -> Option<Vec<u8>> {
    let mut buf = Vec::with_capacity(SHEBANG_READ_LIMIT as usize);

    let result = File::open(path).and_then(|file| file.take(SHEBANG_READ_LIMIT).read_to_end(&mut buf));
    if let Err(e) = result {
        trace!(path = %path.display(), error = %e, "Cannot read file prefix");
        return None;
    }

    Some(buf)
}

/// Extract the interpreter command from the text at the start of a file.
///
/// `#!/usr/bin/env node` gives `node`, `#!/bin/sh -e` gives `sh -e`. Only the
/// first word after the interpreter is kept.
pub fn parse_shebang(text: &str) -> Option<String> {
    let rest = text.strip_prefix("#!")?;
    let line = rest.split(['\n', '\r']).next().unwrap_or_default();
    let line = line.strip_prefix(' ').unwrap_or(line);

    let mut words = line.split(' ');
    let program = words.next().unwrap_or_default();
    let arg = words.next().filter(|a| !a.is_empty());

    let bin = program.rsplit('/').next().unwrap_or(program);

    if bin == "env" {
        return arg.map(str::to_string);
    }

    if bin.is_empty() {
        return None;
    }

    Some(match arg {
        Some(arg) => format!("{bin} {arg}"),
        None => bin.to_string(),
    })
}
