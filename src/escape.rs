//! Escaping for command lines handed to `cmd.exe /d /s /c "..."`.
//!
//! Two layers of parsing have to be survived. `cmd.exe` itself interprets
//! metacharacters (`&`, `|`, `%`, `^`, ...) even inside quotes once its own
//! quote state flips, so every metacharacter, the quotes included, is
//! caret-escaped. The target program then splits its command line with the
//! MSVC runtime rules, where backslashes are only special before a `"`.

/// Characters `cmd.exe` may act on, each of which gets a `^` prefix.
const META_CHARS: &[char] = &[
    '(', ')', '[', ']', '%', '!', '^', '"', '`', '<', '>', '&', '|', ';', ',', ' ', '\t', '*',
    '?',
];

fn is_meta(c: char) -> bool {
    META_CHARS.contains(&c)
}

fn caret_escape(s: &str, out: &mut String) {
    for c in s.chars() {
        if is_meta(c) {
            out.push('^');
        }
        out.push(c);
    }
}

/// Escape a bare command token so `cmd.exe` neither splits nor expands it.
pub fn escape_command(command: &str) -> String {
    let mut out = String::with_capacity(command.len() * 2);
    caret_escape(command, &mut out);
    out
}

/// Quote and escape one argument.
///
/// The argument is first quoted for the program's own argv parser (a run of
/// backslashes before a `"` or at the very end is doubled, embedded quotes
/// become `\"`), then the whole quoted token is caret-escaped for `cmd.exe`.
pub fn escape_argument(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');

    let mut backslashes = 0usize;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                push_backslashes(&mut quoted, backslashes * 2 + 1);
                quoted.push('"');
                backslashes = 0;
            }
            _ => {
                push_backslashes(&mut quoted, backslashes);
                quoted.push(c);
                backslashes = 0;
            }
        }
    }
    push_backslashes(&mut quoted, backslashes * 2);
    quoted.push('"');

    let mut out = String::with_capacity(quoted.len() * 2);
    caret_escape(&quoted, &mut out);
    out
}

fn push_backslashes(out: &mut String, count: usize) {
    out.extend(std::iter::repeat('\\').take(count));
}
