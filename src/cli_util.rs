use std::io::{self, Write};
use crate::InterpreterError;

/// Pretty-print an [`InterpreterError`] with caret positioning.
/// If `program` is `Some("brainfoop")`, prefix messages with "brainfoop: ..."
pub fn print_interpreter_error(program: Option<&str>, code: &str, err: &InterpreterError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        InterpreterError::UnmatchedBracket { ip, kind } => {
            let msg = prefix_program(&format!("Structural error: unmatched bracket {kind}"));
            print_error_with_context(&msg, code, *ip);
        }
        InterpreterError::Io { ip, source } => {
            let msg = prefix_program(&format!("I/O error: {source}"));
            print_error_with_context(&msg, code, *ip);
        }
        InterpreterError::StepLimitExceeded { .. } | InterpreterError::Canceled => {
            eprintln!("{}", prefix_program(&err.to_string()));
            let _ = io::stderr().flush();
        }
    }
}

/// Print a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    eprintln!("{prefix} at instruction {pos}");
    eprint!("{}", error_context(code, pos));
    let _ = io::stderr().flush();
}

/// A short window of `code` around char index `pos` with a caret under it.
fn error_context(code: &str, pos: usize) -> String {
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    // Newlines would break the caret alignment.
    let slice: String = code
        .chars()
        .skip(start_char)
        .take(end_char.saturating_sub(start_char))
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    let caret_offset_chars = pos.saturating_sub(start_char);
    format!("  {}\n  {}^\n", slice, " ".repeat(caret_offset_chars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_points_at_position() {
        assert_eq!(error_context("++[-", 2), "  ++[-\n    ^\n");
    }

    #[test]
    fn window_is_clipped_on_long_programs() {
        let code = format!("{}]{}", "+".repeat(40), "-".repeat(40));
        let ctx = error_context(&code, 40);
        let mut lines = ctx.lines();
        let window = lines.next().unwrap().trim_start();
        let caret = lines.next().unwrap();
        assert_eq!(window.chars().count(), 65);
        assert_eq!(caret.trim_start(), "^");
        assert_eq!(caret.len(), 2 + 32 + 1);
    }

    #[test]
    fn newlines_are_flattened() {
        assert_eq!(error_context("+\n[", 2), "  + [\n    ^\n");
    }
}
