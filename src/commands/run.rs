use clap::Args;
use std::fs;
use std::io::{self, Write};
use crate::cli_util::print_interpreter_error;
use crate::config::RunConfig;
use crate::interpreter::OutputMode;
use crate::runner::{self, RunError};
use crate::token::tokenize;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of operations instead of executing
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Read program text from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// How '.' separates characters: line (default) or raw (fallback BFOOP_OUTPUT)
    #[arg(short = 'o', long = "output", value_name = "MODE")]
    pub output: Option<OutputMode>,

    /// Wall-clock timeout in milliseconds (fallback BFOOP_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BFOOP_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Concatenated program parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        debug,
        file,
        output,
        timeout_ms,
        max_steps,
        code,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let config = match RunConfig::resolve(output, timeout_ms, max_steps) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };

    let code_str = if let Some(path) = file {
        match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else {
        code.join("")
    };

    // Tokenize the unfiltered text so error positions point into it
    let exit_code = match runner::execute(tokenize(&code_str), config, debug) {
        Ok(()) => 0,
        Err(RunError::Interpreter(err)) => {
            print_interpreter_error(Some(program), &code_str, &err);
            1
        }
        Err(other) => {
            eprintln!("{other}");
            1
        }
    };
    let _ = io::stderr().flush();

    // Line mode already ends every character with a newline
    if config.output_mode == OutputMode::Raw {
        println!();
    }
    let _ = io::stdout().flush();
    exit_code
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,   -f <PATH>  Read program text from PATH instead of positional "<code>"
  --debug,  -d         Print a step-by-step table of operations instead of executing
  --output, -o <MODE>  line (default): newline after every '.'; raw: no separator
  --timeout <MS>       Abort after MS milliseconds of wall-clock time
  --max-steps <N>      Abort after N interpreter steps
  --help,   -h         Show this help

Environment:
  BFOOP_OUTPUT, BFOOP_TIMEOUT_MS, BFOOP_MAX_STEPS are used when the flag is absent.

Notes:
- Characters outside of +-<>.,[] are comments and are ignored.
- The tape has 1024 cells and wraps around at both ends; '-' stops at 0.
- Input (`,`) reads a single byte from stdin; at end of input the cell is set to -1.
- An unmatched '[' or ']' is reported before anything runs and exits with status 1.

Examples:
- Load a program from a file:
    {0} run --file ./program.bf
- Echo one byte from stdin:
    echo Z | {0} run ",."
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
