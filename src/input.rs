//! Shared stdin for the bare REPL.
//!
//! A pump thread copies stdin into an [`InputQueue`]. The REPL takes whole
//! lines from it and a running program's `,` takes single bytes, so both
//! consume one stream in order. A byte read waits on the queue instead of
//! blocking in `read(2)`, which lets a cancelled run give up without taking
//! anything that belongs to the next line.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

/// How often a waiting byte read re-checks its cancel flag.
const CANCEL_POLL: Duration = Duration::from_millis(20);

#[derive(Default)]
struct Buffered {
    bytes: VecDeque<u8>,
    closed: bool,
}

#[derive(Default)]
pub struct InputQueue {
    state: Mutex<Buffered>,
    ready: Condvar,
}

impl InputQueue {
    /// A queue fed from stdin by a background thread.
    pub fn stdin() -> Arc<Self> {
        Self::from_reader(io::stdin())
    }

    /// A queue fed from `reader` by a background thread until end of input.
    pub fn from_reader<R: Read + Send + 'static>(mut reader: R) -> Arc<Self> {
        let queue = Arc::new(Self::default());
        let feeder = queue.clone();

        thread::spawn(move || {
            let mut buf = [0u8; 4096];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => feeder.push(&buf[..n]),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
            feeder.close();
        });

        queue
    }

    pub fn push(&self, bytes: &[u8]) {
        self.lock().bytes.extend(bytes);
        self.ready.notify_all();
    }

    /// Mark end of input; readers drain what is left and then see `None`.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    /// Wake every waiting reader so it re-checks its cancel flag.
    pub fn wake(&self) {
        let _guard = self.lock();
        self.ready.notify_all();
    }

    /// Next line without its terminator. `None` once the input is exhausted.
    pub fn read_line(&self) -> Option<String> {
        let mut state = self.lock();
        loop {
            if let Some(end) = state.bytes.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = state.bytes.drain(..=end).collect();
                return Some(decode_line(&raw));
            }
            if state.closed {
                if state.bytes.is_empty() {
                    return None;
                }
                let raw: Vec<u8> = state.bytes.drain(..).collect();
                return Some(decode_line(&raw));
            }
            state = self.ready.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Next byte, or `None` at end of input or once `cancel` is set.
    ///
    /// The flag is checked under the queue lock before a byte is taken, so a
    /// cancelled reader never consumes input.
    pub fn read_byte(&self, cancel: &AtomicBool) -> Option<u8> {
        let mut state = self.lock();
        loop {
            if cancel.load(Ordering::SeqCst) {
                return None;
            }
            if let Some(byte) = state.bytes.pop_front() {
                return Some(byte);
            }
            if state.closed {
                return None;
            }
            state = self
                .ready
                .wait_timeout(state, CANCEL_POLL)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Buffered> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn decode_line(raw: &[u8]) -> String {
    let mut line = String::from_utf8_lossy(raw).into_owned();
    let len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(len);
    line
}
