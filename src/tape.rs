//! Fixed-length circular memory tape.

/// Number of cells on the tape the interpreter runs against.
pub const TAPE_LEN: usize = 1024;

/// A fixed-length array of signed cells with a wraparound cursor.
///
/// Moving past either end wraps to the other end. Decrementing a cell at
/// zero is a no-op, so cells never go negative through arithmetic; only
/// [`Tape::write`] can store a negative value (the end-of-input sentinel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<i32>,
    cursor: usize,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl Tape {
    /// A zeroed tape of [`TAPE_LEN`] cells.
    pub fn new() -> Self {
        Self::with_len(TAPE_LEN)
    }

    /// A zeroed tape of `len` cells (at least one).
    pub fn with_len(len: usize) -> Self {
        Self {
            cells: vec![0; len.max(1)],
            cursor: 0,
        }
    }

    pub fn increment(&mut self) {
        let cell = &mut self.cells[self.cursor];
        *cell = cell.saturating_add(1);
    }

    pub fn decrement(&mut self) {
        let cell = &mut self.cells[self.cursor];
        if *cell > 0 {
            *cell -= 1;
        }
    }

    pub fn move_forward(&mut self) {
        self.cursor = (self.cursor + 1) % self.cells.len();
    }

    pub fn move_backward(&mut self) {
        self.cursor = (self.cursor + self.cells.len() - 1) % self.cells.len();
    }

    pub fn read(&self) -> i32 {
        self.cells[self.cursor]
    }

    pub fn write(&mut self, value: i32) {
        self.cells[self.cursor] = value;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a tape has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[i32] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrement_floors_at_zero() {
        let mut tape = Tape::new();
        tape.decrement();
        assert_eq!(tape.read(), 0);

        tape.increment();
        tape.decrement();
        tape.decrement();
        assert_eq!(tape.read(), 0);
    }

    #[test]
    fn forward_wraps_from_last_index_to_zero() {
        for len in [1, 2, 3, TAPE_LEN] {
            let mut tape = Tape::with_len(len);
            for _ in 0..len - 1 {
                tape.move_forward();
            }
            assert_eq!(tape.cursor(), len - 1);
            tape.move_forward();
            assert_eq!(tape.cursor(), 0, "len {len}");
        }
    }

    #[test]
    fn backward_wraps_from_zero_to_last_index() {
        for len in [1, 2, 3, TAPE_LEN] {
            let mut tape = Tape::with_len(len);
            tape.move_backward();
            assert_eq!(tape.cursor(), len - 1, "len {len}");
        }
    }

    #[test]
    fn zero_length_is_raised_to_one_cell() {
        let mut tape = Tape::with_len(0);
        assert_eq!(tape.len(), 1);
        tape.move_forward();
        tape.move_backward();
        assert_eq!(tape.cursor(), 0);
    }

    #[test]
    fn increment_has_no_upper_wrap() {
        let mut tape = Tape::new();
        for _ in 0..300 {
            tape.increment();
        }
        assert_eq!(tape.read(), 300);

        tape.write(i32::MAX);
        tape.increment();
        assert_eq!(tape.read(), i32::MAX);
    }

    #[test]
    fn write_targets_the_current_cell() {
        let mut tape = Tape::with_len(4);
        tape.move_forward();
        tape.write(-1);
        assert_eq!(tape.cells(), &[0, -1, 0, 0]);
    }
}
