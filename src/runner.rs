//! Program execution with optional wall-clock and step limits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use crate::config::RunConfig;
use crate::input::InputQueue;
use crate::interpreter::{Interpreter, InterpreterError, StepControl};
use crate::token::Token;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Interpreter(#[from] InterpreterError),

    #[error("Execution aborted: wall-clock timeout exceeded ({ms} ms)")]
    Timeout { ms: u128 },

    #[error("Execution aborted: interpreter thread exited without a result")]
    WorkerLost,
}

impl RunError {
    /// Errors after which a session must not continue.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RunError::Interpreter(InterpreterError::UnmatchedBracket { .. } | InterpreterError::Io { .. })
                | RunError::WorkerLost
        )
    }
}

/// Run `tokens` on a fresh interpreter.
///
/// Unlimited runs execute on the calling thread. With a timeout or step
/// limit the interpreter runs on a worker thread that is cancelled
/// cooperatively once the timeout elapses.
pub fn execute(tokens: Vec<Token>, config: RunConfig, debug: bool) -> Result<(), RunError> {
    execute_with_input(tokens, config, debug, None)
}

/// Like [`execute`], with `,` reading from `input` instead of stdin.
///
/// A timed-out worker reading from `input` stops waiting as soon as it is
/// cancelled and is joined before returning, so it never consumes input
/// meant for whoever reads the queue next.
pub fn execute_with_input(
    tokens: Vec<Token>,
    config: RunConfig,
    debug: bool,
    input: Option<Arc<InputQueue>>,
) -> Result<(), RunError> {
    let cancel = Arc::new(AtomicBool::new(false));
    let interpreter = || {
        let mut bf = Interpreter::new();
        bf.set_output_mode(config.output_mode);
        if let Some(queue) = input.clone() {
            let cancel = cancel.clone();
            bf.set_input_provider(move || queue.read_byte(&cancel));
        }
        bf
    };

    if !config.is_limited() {
        let mut bf = interpreter();
        let res = if debug { bf.run_debug(&tokens) } else { bf.run(&tokens) };
        return res.map_err(RunError::from);
    }

    let (tx, rx) = mpsc::channel::<Result<(), InterpreterError>>();
    let mut bf = interpreter();
    let ctrl = StepControl::new(config.max_steps, cancel.clone());

    let worker = thread::spawn(move || {
        let res = if debug {
            bf.run_debug_with_control(&tokens, ctrl)
        } else {
            bf.run_with_control(&tokens, ctrl)
        };
        let _ = tx.send(res);
    });

    let received = match config.timeout {
        Some(timeout) => rx.recv_timeout(timeout),
        None => rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected),
    };

    match received {
        Ok(res) => res.map_err(RunError::from),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::SeqCst);
            // A worker blocked on plain stdin cannot be woken; only wait for queue readers.
            if let Some(queue) = input {
                queue.wake();
                let _ = worker.join();
            }
            let ms = config.timeout.map(|t| t.as_millis()).unwrap_or_default();
            Err(RunError::Timeout { ms })
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(RunError::WorkerLost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use std::time::Duration;

    #[test]
    fn unlimited_run_succeeds() {
        let res = execute(tokenize("+++[-]"), RunConfig::default(), false);
        assert!(res.is_ok());
    }

    #[test]
    fn structural_error_is_fatal() {
        let err = execute(tokenize("["), RunConfig::default(), false).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(
            err,
            RunError::Interpreter(InterpreterError::UnmatchedBracket { .. })
        ));
    }

    #[test]
    fn step_limit_is_reported_and_not_fatal() {
        let config = RunConfig { max_steps: Some(50), ..RunConfig::default() };
        let err = execute(tokenize("+[]"), config, false).unwrap_err();
        assert!(matches!(
            err,
            RunError::Interpreter(InterpreterError::StepLimitExceeded { limit: 50 })
        ));
        assert!(!err.is_fatal());
    }

    #[test]
    fn timeout_cancels_infinite_loop() {
        let config = RunConfig { timeout: Some(Duration::from_millis(50)), ..RunConfig::default() };
        let err = execute(tokenize("+[]"), config, false).unwrap_err();
        assert!(matches!(err, RunError::Timeout { ms: 50 }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn timed_out_input_read_leaves_queue_untouched() {
        let queue = Arc::new(InputQueue::default());
        let config = RunConfig { timeout: Some(Duration::from_millis(50)), ..RunConfig::default() };

        let err = execute_with_input(tokenize(",."), config, false, Some(queue.clone())).unwrap_err();
        assert!(matches!(err, RunError::Timeout { ms: 50 }));

        // Input that arrives after the timeout belongs to the next reader
        queue.push(b"+.\n");
        assert_eq!(queue.read_line().as_deref(), Some("+."));
    }

    #[test]
    fn input_queue_feeds_comma() {
        let queue = Arc::new(InputQueue::default());
        queue.push(b"Z");
        queue.close();
        let res = execute_with_input(tokenize(",[-]"), RunConfig::default(), false, Some(queue.clone()));
        assert!(res.is_ok());
        assert_eq!(queue.read_line(), None);
    }
}
