use std::env;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use reedline::{DefaultPrompt, DefaultPromptSegment, Signal};
use crate::config::{RunConfig, ENV_REPL_MODE};
use crate::highlight::InstructionHighlighter;
use crate::input::InputQueue;
use crate::runner::{self, RunError};
use crate::{cli_util, token};

/// A line consisting of just this ends the session.
pub const QUIT: &str = "q";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    Bare,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlagOverride {
    None,
    Bare,
    Editor,
}

/// What a single submitted line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    Quit,
    Skip,
    Execute(String),
}

/// Whether the session keeps reading lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(i32),
}

/// Only an exact `q` quits; padded variants are comments like any other text.
pub fn classify_line(line: &str) -> LineAction {
    let trimmed = line.trim();
    if line == QUIT {
        LineAction::Quit
    } else if token::bf_only(trimmed).is_empty() {
        LineAction::Skip
    } else {
        LineAction::Execute(trimmed.to_string())
    }
}

/// Run one line on a fresh interpreter (fresh tape) and decide whether to go on.
///
/// A structural error ends the session with status 1; aborted runs are
/// reported and the session continues. With `input`, `,` reads from the
/// same queue the session reads its lines from.
pub fn handle_line(line: &str, config: &RunConfig, input: Option<&Arc<InputQueue>>) -> Flow {
    let code = match classify_line(line) {
        LineAction::Quit => return Flow::Exit(0),
        LineAction::Skip => return Flow::Continue,
        LineAction::Execute(code) => code,
    };

    match runner::execute_with_input(token::tokenize(&code), *config, false, input.cloned()) {
        Ok(()) => Flow::Continue,
        Err(err) => {
            report(&code, &err);
            if err.is_fatal() { Flow::Exit(1) } else { Flow::Continue }
        }
    }
}

fn report(code: &str, err: &RunError) {
    match err {
        RunError::Interpreter(inner) => cli_util::print_interpreter_error(None, code, inner),
        other => {
            eprintln!("{other}");
            let _ = io::stderr().flush();
        }
    }
}

/// Bare mode: read stdin line by line, prompting only when stderr is a TTY.
///
/// Lines and `,` share one stdin queue, so `,` inside a program consumes
/// the input that follows its line.
pub fn run_bare(config: &RunConfig) -> io::Result<i32> {
    let prompt = io::stderr().is_terminal();
    let input = InputQueue::stdin();

    loop {
        if prompt {
            eprint!(">> ");
            io::stderr().flush()?;
        }

        let Some(line) = input.read_line() else {
            return Ok(0);
        };

        if let Flow::Exit(code) = handle_line(&line, config, Some(&input)) {
            return Ok(code);
        }
    }
}

/// Editor mode: reedline with history and instruction highlighting.
///
/// reedline owns the terminal here, so `,` reads stdin directly and a
/// timed-out read cannot be interrupted.
pub fn run_editor(config: &RunConfig) -> io::Result<i32> {
    let mut editor = init_line_editor()?;
    let prompt = DefaultPrompt::new(DefaultPromptSegment::Basic(">>".to_string()), DefaultPromptSegment::Empty);

    loop {
        match editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                if let Flow::Exit(code) = handle_line(&line, config, None) {
                    return Ok(code);
                }
            }
            Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => {
                println!();
                io::stdout().flush()?;
                return Ok(0);
            }
            Err(e) => {
                eprintln!("repl: editor error: {e}");
                let _ = io::stderr().flush();
                return Ok(1);
            }
        }
    }
}

fn init_line_editor() -> io::Result<reedline::Reedline> {
    use reedline::{default_emacs_keybindings, Emacs, FileBackedHistory, Reedline};

    let history = FileBackedHistory::new(1_000).map_err(|e| io::Error::other(e.to_string()))?;

    let editor = Reedline::create()
        .with_highlighter(Box::new(InstructionHighlighter::default()))
        .with_history(Box::new(history))
        .with_edit_mode(Box::new(Emacs::new(default_emacs_keybindings())));

    Ok(editor)
}

/// Pick the REPL mode: flag -> environment -> auto-detect.
pub fn select_mode(flag: ModeFlagOverride) -> Result<ReplMode, String> {
    select_mode_with(flag, env::var(ENV_REPL_MODE).ok(), io::stdin().is_terminal())
}

fn select_mode_with(flag: ModeFlagOverride, env_mode: Option<String>, stdin_tty: bool) -> Result<ReplMode, String> {
    match flag {
        ModeFlagOverride::Bare => return Ok(ReplMode::Bare),
        ModeFlagOverride::Editor => {
            if !stdin_tty {
                return Err("cannot start editor: stdin is not a TTY (use --bare or BFOOP_REPL_MODE=bare)".to_string());
            }
            return Ok(ReplMode::Editor);
        }
        ModeFlagOverride::None => {}
    }

    if let Some(val) = env_mode {
        return match val.trim().to_ascii_lowercase().as_str() {
            "bare" => Ok(ReplMode::Bare),
            "editor" => {
                if !stdin_tty {
                    return Err("cannot start editor: stdin is not a TTY (use BFOOP_REPL_MODE=bare)".to_string());
                }
                Ok(ReplMode::Editor)
            }
            _ => Err(format!("invalid {ENV_REPL_MODE} value: {val}, must be 'bare' or 'editor'")),
        };
    }

    if stdin_tty { Ok(ReplMode::Editor) } else { Ok(ReplMode::Bare) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_quit_skip_and_code() {
        assert_eq!(classify_line("q"), LineAction::Quit);
        assert_eq!(classify_line("  q "), LineAction::Skip);
        assert_eq!(classify_line("q\t"), LineAction::Skip);
        assert_eq!(classify_line(""), LineAction::Skip);
        assert_eq!(classify_line("just words"), LineAction::Skip);
        assert_eq!(classify_line(" +[-] zero "), LineAction::Execute("+[-] zero".to_string()));
        // "quit" is a comment, not the quit command
        assert_eq!(classify_line("quit"), LineAction::Skip);
    }

    #[test]
    fn structural_error_ends_session_with_status_1() {
        assert_eq!(handle_line("+[", &RunConfig::default(), None), Flow::Exit(1));
        assert_eq!(handle_line("]", &RunConfig::default(), None), Flow::Exit(1));
    }

    #[test]
    fn quit_and_valid_lines() {
        assert_eq!(handle_line("q", &RunConfig::default(), None), Flow::Exit(0));
        assert_eq!(handle_line("+++[-]", &RunConfig::default(), None), Flow::Continue);
    }

    #[test]
    fn mode_flags_override_environment() {
        assert_eq!(select_mode_with(ModeFlagOverride::Bare, Some("editor".into()), true), Ok(ReplMode::Bare));
        assert!(select_mode_with(ModeFlagOverride::Editor, None, false).is_err());
    }

    #[test]
    fn mode_from_environment_and_auto_detect() {
        assert_eq!(select_mode_with(ModeFlagOverride::None, Some(" Bare ".into()), true), Ok(ReplMode::Bare));
        assert!(select_mode_with(ModeFlagOverride::None, Some("fancy".into()), true).is_err());
        assert_eq!(select_mode_with(ModeFlagOverride::None, None, true), Ok(ReplMode::Editor));
        assert_eq!(select_mode_with(ModeFlagOverride::None, None, false), Ok(ReplMode::Bare));
    }
}
