//! Adversarial tests for proc_spawn.
//!
//! These tests feed hostile arguments and command names through the Windows
//! preparation path and check that a `cmd.exe /d /s /c` command line built from
//! them cannot run anything extra and decodes back to the exact input.

use proc_spawn::{escape_argument, escape_command, Launcher, Platform, SpawnOptions};

// =============================================================================
// Test Helpers
// =============================================================================

/// Model of how `cmd.exe /s /c "<line>"` and then the MSVC runtime turn a
/// command line back into a program name and its argv.
///
/// cmd.exe takes the program from the first token, honouring carets, and the
/// program splits the rest itself. Panics if the line contains anything
/// cmd.exe would act on: a live operator, or a `%name%` span that could expand.
fn cmd_round_trip(outer: &str) -> (String, Vec<String>) {
    // /s: the first and last quote are stripped, the rest is kept as-is
    let line = outer
        .strip_prefix('"')
        .and_then(|l| l.strip_suffix('"'))
        .expect("command line wrapped in quotes");

    assert_no_percent_expansion(line);

    // Phase 2: carets, quote state, operators, end of the program token
    let mut program = String::new();
    let mut rest = String::new();
    let mut in_program = true;
    let mut in_quotes = false;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        let target = if in_program { &mut program } else { &mut rest };
        match c {
            '"' => {
                in_quotes = !in_quotes;
                target.push(c);
            }
            '^' if !in_quotes => {
                if let Some(next) = chars.next() {
                    target.push(next);
                }
            }
            '&' | '|' | '<' | '>' if !in_quotes => {
                panic!("live operator {c:?} in {line}");
            }
            ' ' | '\t' if in_program && !in_quotes => in_program = false,
            _ => target.push(c),
        }
    }

    (program, msvc_split(&rest))
}

/// Undefined variables are left alone on the command line, so `%x%` is only
/// dangerous when `x` could name a real variable; an escaped `^%` keeps the
/// caret inside the name.
fn assert_no_percent_expansion(line: &str) {
    let parts: Vec<&str> = line.split('%').collect();
    for name in parts.iter().skip(1).take(parts.len().saturating_sub(2)) {
        assert!(
            name.is_empty() || name.contains('^'),
            "expandable %{name}% in {line}"
        );
    }
}

/// Split a command line into argv using the MSVC runtime rules.
fn msvc_split(line: &str) -> Vec<String> {
    let mut argv = Vec::new();
    let mut current = String::new();
    let mut has_token = false;
    let mut in_quotes = false;
    let mut backslashes = 0usize;

    for c in line.chars() {
        match c {
            '\\' => {
                backslashes += 1;
                has_token = true;
            }
            '"' => {
                current.extend(std::iter::repeat('\\').take(backslashes / 2));
                if backslashes % 2 == 1 {
                    current.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
                backslashes = 0;
                has_token = true;
            }
            ' ' | '\t' if !in_quotes => {
                current.extend(std::iter::repeat('\\').take(backslashes));
                backslashes = 0;
                if has_token {
                    argv.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            _ => {
                current.extend(std::iter::repeat('\\').take(backslashes));
                backslashes = 0;
                current.push(c);
                has_token = true;
            }
        }
    }
    current.extend(std::iter::repeat('\\').take(backslashes));
    if has_token {
        argv.push(current);
    }
    argv
}

/// Windows launcher where nothing resolves, so every command is shell-wrapped.
fn windows_launcher() -> Launcher {
    let platform = Platform::windows()
        .with_var("PATH", "")
        .with_cwd(std::env::temp_dir().join("proc_spawn_nonexistent_dir"));
    Launcher::builder()
        .platform(platform)
        .build()
        .expect("valid launcher")
}

fn assert_round_trip(args: &[&str]) {
    let launcher = windows_launcher();
    let parsed = launcher.parse("node", args, &SpawnOptions::new());

    assert_eq!(parsed.command(), "cmd.exe");
    assert_eq!(parsed.args()[..3].to_vec(), vec!["/d", "/s", "/c"]);
    assert!(parsed.options().verbatim_arguments);

    let (program, argv) = cmd_round_trip(&parsed.args()[3]);
    assert_eq!(program, "node");
    assert_eq!(argv, args, "line: {}", parsed.args()[3]);
}

// =============================================================================
// SHELL METACHARACTERS
// =============================================================================

#[test]
fn test_shell_special_chars() {
    assert_round_trip(&[
        "foo", "()", "foo", "[]", "foo", "%!", "foo", "^<", "foo", ">&", "foo", "|;", "foo",
        ", ", "foo", "!=", "foo", "\\*", "foo", "\"f\"", "foo", "?.", "foo", "=`", "foo", "'",
        "foo",
    ]);
}

#[test]
fn test_quotes_followed_by_meta_chars() {
    assert_round_trip(&["\"(foo|bar>baz|foz)\""]);
}

#[test]
fn test_command_chaining_attempts() {
    assert_round_trip(&["a & calc.exe", "b && del /q *", "c || shutdown", "d | more"]);
}

#[test]
fn test_breaking_out_of_quotes() {
    // Close the quote early, then chain a command
    assert_round_trip(&["\" & calc & \"", "x\\\" & calc", "\"\"\"", "\\\"&"]);
}

#[test]
fn test_redirection_attempts() {
    assert_round_trip(&["> C:\\Windows\\win.ini", "< nul", "2>&1", ">>log"]);
}

// =============================================================================
// VARIABLE EXPANSION
// =============================================================================

#[test]
fn test_percent_variables_do_not_expand() {
    assert_round_trip(&["%PATH%", "%COMSPEC%", "%%", "100%", "%CD%\\x", "%~dp0"]);
}

#[test]
fn test_delayed_expansion_syntax_is_literal() {
    assert_round_trip(&["!PATH!", "!", "a!b!c"]);
}

// =============================================================================
// QUOTING AND BACKSLASHES
// =============================================================================

#[test]
fn test_embedded_quotes() {
    assert_round_trip(&["foo\"bar\"foo", "\"", "\"\""]);
}

#[test]
fn test_trailing_backslashes() {
    assert_round_trip(&["bar\\", "bar\\\\", "C:\\dir\\", "\\"]);
}

#[test]
fn test_backslashes_before_quotes() {
    assert_round_trip(&["\\\"", "\\\\\"", "a\\\\\\\"b"]);
}

#[test]
fn test_empty_and_whitespace_arguments() {
    assert_round_trip(&["", " ", "\t", "foo", "", "bar"]);
}

#[test]
fn test_everything_at_once() {
    assert_round_trip(&["()[]%!^\"`<>&|;, *?\t\\"]);
}

// =============================================================================
// COMMAND NAMES
// =============================================================================

#[test]
fn test_command_with_spaces_stays_one_token() {
    let launcher = windows_launcher();
    let parsed = launcher.parse("C:\\fixtures\\bar space", &["foo bar"], &SpawnOptions::new());

    let (program, argv) = cmd_round_trip(&parsed.args()[3]);
    assert_eq!(program, "C:\\fixtures\\bar space");
    assert_eq!(argv, vec!["foo bar"]);
}

#[test]
fn test_command_with_special_chars() {
    let launcher = windows_launcher();
    let parsed = launcher.parse_command("C:\\fixtures\\()%!^&;, ", &SpawnOptions::new());

    let line = &parsed.args()[3];
    assert!(line.contains(&escape_command("()%!^&;,")));

    let (program, argv) = cmd_round_trip(line);
    assert_eq!(program, "C:\\fixtures\\()%!^&;, ");
    assert!(argv.is_empty());
}

#[test]
fn test_command_named_after_variable() {
    let launcher = windows_launcher();
    let parsed = launcher.parse_command("C:\\fixtures\\%CD%", &SpawnOptions::new());
    let (program, argv) = cmd_round_trip(&parsed.args()[3]);
    assert_eq!(program, "C:\\fixtures\\%CD%");
    assert!(argv.is_empty());
}

#[test]
fn test_injection_through_command_name() {
    let launcher = windows_launcher();
    let parsed = launcher.parse_command("foo & calc", &SpawnOptions::new());
    let (program, argv) = cmd_round_trip(&parsed.args()[3]);
    assert_eq!(program, "foo & calc");
    assert!(argv.is_empty());
}

// =============================================================================
// NULL BYTES AND CONTROL CHARACTERS
// =============================================================================

#[test]
fn test_control_characters_pass_through() {
    let escaped = escape_argument("line1\nline2\r\u{1b}[31m");
    assert_eq!(escaped, "^\"line1\nline2\r\u{1b}^[31m^\"");
}

#[test]
fn test_null_byte_in_argument() {
    // Never truncated or dropped during preparation
    let arg = "pattern\0--file=C:\\secret";
    let escaped = escape_argument(arg);
    assert!(escaped.contains('\0'));
    assert!(escaped.ends_with("secret^\""));
}

// =============================================================================
// SHELL MODE IS NOT ESCAPED
// =============================================================================

#[test]
fn test_shell_mode_keeps_operators_live() {
    let launcher = windows_launcher();
    let parsed = launcher.parse("echo", &["hello &&", "echo there"], &SpawnOptions::new().with_shell());

    // Shell mode asks for shell semantics: operators are deliberately left alone
    assert_eq!(parsed.args()[3], "\"echo hello && echo there\"");
}
