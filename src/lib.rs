//! A small Brainfuck-family interpreter.
//!
//! Programs run against a fixed 1024-cell tape of signed cells whose cursor
//! wraps around at both ends. Brackets are matched once, with a stack, before
//! a program runs; each loop body is then re-executed while the current cell
//! is positive.
//!
//! Features and behaviors:
//! - Characters other than `+-<>.,[]` are comments and are skipped.
//! - `-` on a zero cell leaves it at zero.
//! - `,` reads one byte; at end of input the cell is set to -1.
//! - `.` writes the cell as a character followed by a newline by default;
//!   [`OutputMode::Raw`] drops the newline.
//! - Unmatched brackets are a typed [`InterpreterError::UnmatchedBracket`].
//!
//! Quick start:
//!
//! ```no_run
//! use brainfoop::{tokenize, Interpreter};
//!
//! // Prints "A" followed by a newline
//! let tokens = tokenize("++++++++[>++++++++<-]>+.");
//! let mut bf = Interpreter::new();
//! bf.run(&tokens).expect("program should run");
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod highlight;
pub mod input;
pub mod interpreter;
pub mod loops;
pub mod repl;
pub mod runner;
pub mod tape;
pub mod token;

pub use config::{ConfigError, RunConfig};
pub use interpreter::{Interpreter, InterpreterError, OutputMode, StepControl, UnmatchedBracketKind, EOF};
pub use loops::LoopTable;
pub use runner::RunError;
pub use tape::{Tape, TAPE_LEN};
pub use token::{bf_only, tokenize, Instruction, Token};
