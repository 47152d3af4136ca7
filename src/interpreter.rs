//! The execution engine.
//!
//! A program is tokenized, its brackets are matched once up front, and the
//! token snapshot is then executed against a single [`Tape`] in one flat
//! pass. `[` jumps past its partner when the current cell is not positive and
//! `]` jumps back into the body while it is, so nesting depth costs no stack.
//!
//! Behaviors:
//! - Cells start at 0; `-` never takes a cell below 0.
//! - `<` and `>` wrap around the ends of the tape.
//! - `,` reads one byte; end of input stores -1 in the current cell.
//! - `.` writes the current cell as a character followed by a newline
//!   ([`OutputMode::Line`]) or on its own ([`OutputMode::Raw`]).
//! - Unbalanced brackets are rejected before anything executes.
//!
//! ```no_run
//! use brainfoop::Interpreter;
//!
//! let mut bf = Interpreter::new();
//! bf.run_source("++++++++[>++++++++<-]>+.").expect("program should run");
//! ```

use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::loops::LoopTable;
use crate::tape::Tape;
use crate::token::{tokenize, Instruction, Token};

/// Value stored by `,` when the input is exhausted.
pub const EOF: i32 = -1;

/// Errors that can occur while interpreting a program.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// A `[` or `]` has no partner; `ip` is the bracket's source position.
    #[error("Unmatched bracket {kind} at instruction {ip}")]
    UnmatchedBracket { ip: usize, kind: UnmatchedBracketKind },

    /// Reading input or writing output failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io { ip: usize, #[source] source: io::Error },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout)
    #[error("Execution aborted: cancelled")]
    Canceled,
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}

/// How `.` separates the characters it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Every character is followed by a newline.
    #[default]
    Line,
    /// Characters are written back to back.
    Raw,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(OutputMode::Line),
            "raw" => Ok(OutputMode::Raw),
            other => Err(format!("invalid output mode '{other}', must be 'line' or 'raw'")),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Line => write!(f, "line"),
            OutputMode::Raw => write!(f, "raw"),
        }
    }
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

type OutputSink = Box<dyn FnMut(&[u8]) + Send>;
type InputProvider = Box<dyn FnMut() -> Option<u8> + Send>;

/// Per-run state of one execution.
struct Run<'a> {
    tokens: &'a [Token],
    loops: &'a LoopTable,
    debug: bool,
    control: Option<&'a StepControl>,
    step: usize,
}

impl Run<'_> {
    /// Count one step, honoring cancellation and the step limit.
    fn tick(&mut self) -> Result<(), InterpreterError> {
        if let Some(ctrl) = self.control {
            if ctrl.cancel_flag.load(Ordering::Relaxed) {
                return Err(InterpreterError::Canceled);
            }
            if let Some(max) = ctrl.max_steps {
                if self.step >= max {
                    return Err(InterpreterError::StepLimitExceeded { limit: max });
                }
            }
        }
        self.step += 1;
        Ok(())
    }

    fn trace(&self, token: Token, ptr: usize, cell: i32, action: Option<String>) {
        if let Some(action) = action {
            println!(
                "{:<4} | {:<3} | {:<4} | {:<4} |  {}    | {}",
                self.step, token.pos, ptr, cell, token.op, action
            );
        }
    }
}

/// An interpreter owning one tape for the lifetime of a program run.
pub struct Interpreter {
    tape: Tape,
    output_mode: OutputMode,
    // Optional hooks:
    output_sink: Option<OutputSink>,
    input_provider: Option<InputProvider>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter with a zeroed 1024-cell tape and line output.
    pub fn new() -> Self {
        Self::with_tape(Tape::new())
    }

    /// An interpreter running against `tape`.
    pub fn with_tape(tape: Tape) -> Self {
        Self {
            tape,
            output_mode: OutputMode::default(),
            output_sink: None,
            input_provider: None,
        }
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    /// Provide an output sink. When set, '.' sends bytes to this sink instead of stdout.
    /// Each '.' produces one call: the UTF-8 encoded character, plus `\n` in line mode.
    pub fn set_output_sink<F>(&mut self, sink: F)
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        self.output_sink = Some(Box::new(sink));
    }

    /// Provide an input provider. When set, ',' reads from this provider instead of stdin.
    /// Returning None indicates end of input.
    pub fn set_input_provider<F>(&mut self, provider: F)
    where
        F: FnMut() -> Option<u8> + Send + 'static,
    {
        self.input_provider = Some(Box::new(provider));
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Execute `tokens` until completion.
    ///
    /// A loop repeats while the current cell is positive (`> 0`), so the -1
    /// end-of-input value ends a loop the same way 0 does.
    pub fn run(&mut self, tokens: &[Token]) -> Result<(), InterpreterError> {
        self.execute(tokens, false, None)
    }

    /// Tokenize `source` and execute it.
    pub fn run_source(&mut self, source: &str) -> Result<(), InterpreterError> {
        self.run(&tokenize(source))
    }

    /// Debug-run the program, printing a step-by-step table of operations
    /// instead of producing I/O side effects. The tape advances exactly as it
    /// would during a real run, but:
    /// - '.' does not write the character; the action is logged instead
    /// - ',' does not read input; it simulates end of input and stores -1
    pub fn run_debug(&mut self, tokens: &[Token]) -> Result<(), InterpreterError> {
        self.execute(tokens, true, None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn run_with_control(&mut self, tokens: &[Token], step_control: StepControl) -> Result<(), InterpreterError> {
        self.execute(tokens, false, Some(&step_control))
    }

    /// Debug-run with cooperative cancellation and optional step limit.
    pub fn run_debug_with_control(&mut self, tokens: &[Token], step_control: StepControl) -> Result<(), InterpreterError> {
        self.execute(tokens, true, Some(&step_control))
    }

    fn execute(&mut self, tokens: &[Token], debug: bool, control: Option<&StepControl>) -> Result<(), InterpreterError> {
        // Validate every bracket before running anything.
        let loops = LoopTable::build(tokens)?;

        if debug {
            println!("STEP | IP  | PTR  | CELL | INSTR | ACTION");
            println!("-----+-----+------+------+-------+------------------------------------------------");
        }

        let mut run = Run {
            tokens,
            loops: &loops,
            debug,
            control,
            step: 0,
        };
        self.scan(&mut run)
    }

    /// Walk the program once, jumping between matched brackets through the loop table.
    fn scan(&mut self, run: &mut Run<'_>) -> Result<(), InterpreterError> {
        let mut ip = 0;

        while ip < run.tokens.len() {
            run.tick()?;

            let token = run.tokens[ip];
            let (ptr_before, cell_before) = (self.tape.cursor(), self.tape.read());
            let mut action: Option<String> = if run.debug { Some(String::new()) } else { None };
            let mut next = ip + 1;

            match token.op {
                Instruction::Increment => {
                    self.tape.increment();
                    if let Some(a) = action.as_mut() { *a = format!("Increment cell[{}] from {} to {}", ptr_before, cell_before, self.tape.read()); }
                }
                Instruction::Decrement => {
                    self.tape.decrement();
                    if let Some(a) = action.as_mut() { *a = format!("Decrement cell[{}] from {} to {}", ptr_before, cell_before, self.tape.read()); }
                }
                Instruction::MoveForward => {
                    self.tape.move_forward();
                    if let Some(a) = action.as_mut() { *a = format!("Moved cursor to index {}", self.tape.cursor()); }
                }
                Instruction::MoveBackward => {
                    self.tape.move_backward();
                    if let Some(a) = action.as_mut() { *a = format!("Moved cursor to index {}", self.tape.cursor()); }
                }
                Instruction::Output => {
                    let ch = cell_to_char(cell_before);
                    if let Some(a) = action.as_mut() {
                        *a = format!("Output '{}' (suppressed in debug)", ch.escape_default());
                    } else {
                        self.emit(ch).map_err(|source| InterpreterError::Io { ip: token.pos, source })?;
                    }
                }
                Instruction::Input => {
                    if let Some(a) = action.as_mut() {
                        self.tape.write(EOF);
                        *a = format!("Read input -> simulated end of input (set cell to {EOF})");
                    } else {
                        let value = self.read_input().map_err(|source| InterpreterError::Io { ip: token.pos, source })?;
                        self.tape.write(value);
                    }
                }
                Instruction::LoopOpen => {
                    let Some(close) = run.loops.close_of(ip) else {
                        return Err(InterpreterError::UnmatchedBracket {
                            ip: token.pos,
                            kind: UnmatchedBracketKind::Open,
                        });
                    };
                    let enter = cell_before > 0;
                    if !enter {
                        next = close + 1;
                    }
                    if let Some(a) = action.as_mut() {
                        *a = if enter {
                            "Enter loop (cell > 0)".to_string()
                        } else {
                            format!("Cell is 0; skip past matching ']' at IP {}", run.tokens[close].pos)
                        };
                    }
                }
                Instruction::LoopClose => {
                    let Some(open) = run.loops.open_of(ip) else {
                        return Err(InterpreterError::UnmatchedBracket {
                            ip: token.pos,
                            kind: UnmatchedBracketKind::Close,
                        });
                    };
                    // Re-check against whatever cell the cursor points at now.
                    let again = cell_before > 0;
                    if again {
                        next = open + 1;
                    }
                    if let Some(a) = action.as_mut() {
                        *a = if again {
                            format!("Cell > 0; repeat loop from IP {}", run.tokens[open].pos)
                        } else {
                            "Exit loop (cell is 0)".to_string()
                        };
                    }
                }
            }

            run.trace(token, ptr_before, cell_before, action);
            ip = next;
        }

        Ok(())
    }

    fn emit(&mut self, ch: char) -> io::Result<()> {
        let mut buf = [0u8; 5];
        let mut len = ch.encode_utf8(&mut buf).len();
        if self.output_mode == OutputMode::Line {
            buf[len] = b'\n';
            len += 1;
        }

        // Use output sink when provided; fallback to stdout.
        match self.output_sink.as_mut() {
            Some(sink) => {
                sink(&buf[..len]);
                Ok(())
            }
            None => {
                let mut out = io::stdout().lock();
                out.write_all(&buf[..len])?;
                out.flush()
            }
        }
    }

    fn read_input(&mut self) -> io::Result<i32> {
        // Prefer input provider when set; fall back to stdin.
        let byte = match self.input_provider.as_mut() {
            Some(provider) => provider(),
            None => {
                let mut buf = [0u8; 1];
                match io::stdin().read(&mut buf)? {
                    0 => None,
                    _ => Some(buf[0]),
                }
            }
        };
        Ok(byte.map_or(EOF, i32::from))
    }
}

/// The character a cell holds; values outside the char range map to U+FFFD.
fn cell_to_char(value: i32) -> char {
    u32::try_from(value)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}
