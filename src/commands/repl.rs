use std::io::{self, IsTerminal, Write};
use clap::Args;

use crate::config::RunConfig;
use crate::interpreter::OutputMode;
use crate::repl::{run_bare, run_editor, select_mode, ModeFlagOverride, ReplMode};

#[derive(Args, Debug, Default)]
#[command(disable_help_flag = true)]
pub struct ReplArgs {
    /// Force non-interactive bare mode
    #[arg(long = "bare", conflicts_with = "editor")]
    pub bare: bool,

    /// Force interactive mode (errors if stdin is not a TTY)
    #[arg(long = "editor", conflicts_with = "bare")]
    pub editor: bool,

    /// How '.' separates characters: line (default) or raw (fallback BFOOP_OUTPUT)
    #[arg(short = 'o', long = "output", value_name = "MODE")]
    pub output: Option<OutputMode>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

impl ReplArgs {
    pub fn mode_flag(&self) -> ModeFlagOverride {
        match (self.bare, self.editor) {
            (true, _) => ModeFlagOverride::Bare,
            (_, true) => ModeFlagOverride::Editor,
            _ => ModeFlagOverride::None,
        }
    }
}

// Public entry point for the REPL from main.rs
pub fn run(program: &str, args: ReplArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    // Determine mode: flags -> env -> auto-detect via is_terminal()
    let mode = match select_mode(args.mode_flag()) {
        Ok(m) => m,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    // Limits are honored through the environment; the REPL has no limit flags.
    let config = match RunConfig::resolve(args.output, None, None) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };

    // Install SIGINT (ctrl+c) handler to flush and exit(0) immediately
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(0);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    let result = match mode {
        ReplMode::Editor => {
            // Print banners only if stderr is a TTY
            if io::stderr().is_terminal() {
                eprintln!("brainfoop REPL (interactive editor mode)");
                eprintln!("Each line runs on a fresh tape. Enter 'q' or press ctrl+d to exit");
                let _ = io::stderr().flush();
            }
            run_editor(&config)
        }
        ReplMode::Bare => run_bare(&config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{program}: REPL error: {e}");
            let _ = io::stderr().flush();
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} repl   # Start a line-oriented REPL

Options:
  --help,   -h         Show this help
  --bare               Force non-interactive bare mode
  --editor             Force interactive editor mode (errors if stdin is not a TTY)
  --output, -o <MODE>  line (default): newline after every '.'; raw: no separator

Description:
  Reads one line at a time and runs it as a complete program.

Notes:
    - Each line starts with a fresh tape and cursor.
    - A line containing only `q` ends the session; so does end of input.
    - Non-instruction characters are ignored.
    - An unmatched bracket ends the session with exit status 1.
    - Ctrl+C exits the REPL immediately.
    - Mode selection:
        * Flags: --bare|--editor override environment and auto-detection.
        * Env: BFOOP_REPL_MODE=bare|editor overrides auto-detection.
        * Auto-detect: if stdin is a TTY, starts in interactive editor mode; otherwise, bare mode.
        * Prompts/banners suppressed if stderr is not a TTY.
    - BFOOP_TIMEOUT_MS and BFOOP_MAX_STEPS limit every line's execution.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
