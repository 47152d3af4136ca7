//! Bracket matching for a token sequence.

use std::ops::Range;

use crate::interpreter::{InterpreterError, UnmatchedBracketKind};
use crate::token::{Instruction, Token};

/// Pairing of every `[` with its nested `]`, indexed by token position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopTable {
    // partner[i] holds the index of the matching bracket for a bracket at i.
    partner: Vec<Option<usize>>,
}

impl LoopTable {
    /// Match brackets with a stack of pending opens.
    ///
    /// A close with no pending open, or an open still pending at the end, is
    /// reported as [`InterpreterError::UnmatchedBracket`] at that token's
    /// source position.
    pub fn build(tokens: &[Token]) -> Result<Self, InterpreterError> {
        let mut partner = vec![None; tokens.len()];
        let mut stack: Vec<usize> = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            match token.op {
                Instruction::LoopOpen => stack.push(i),
                Instruction::LoopClose => {
                    let Some(open) = stack.pop() else {
                        return Err(InterpreterError::UnmatchedBracket {
                            ip: token.pos,
                            kind: UnmatchedBracketKind::Close,
                        });
                    };
                    partner[open] = Some(i);
                    partner[i] = Some(open);
                }
                _ => {}
            }
        }

        // Report the innermost open; it is the one closest to the missing ']'.
        if let Some(open) = stack.last().copied() {
            return Err(InterpreterError::UnmatchedBracket {
                ip: tokens[open].pos,
                kind: UnmatchedBracketKind::Open,
            });
        }

        Ok(Self { partner })
    }

    /// Index of the `]` closing the `[` at `open`.
    pub fn close_of(&self, open: usize) -> Option<usize> {
        self.partner.get(open).copied().flatten().filter(|&close| close > open)
    }

    /// Index of the `[` opened for the `]` at `close`.
    pub fn open_of(&self, close: usize) -> Option<usize> {
        self.partner.get(close).copied().flatten().filter(|&open| open < close)
    }

    /// Token range strictly between the `[` at `open` and its `]`.
    pub fn body(&self, open: usize) -> Option<Range<usize>> {
        self.close_of(open).map(|close| open + 1..close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    #[test]
    fn pairs_nested_loops() {
        let tokens = tokenize("++[>+++[-]<-]");
        let table = LoopTable::build(&tokens).expect("balanced");
        assert_eq!(table.close_of(2), Some(12));
        assert_eq!(table.close_of(7), Some(9));
        assert_eq!(table.open_of(12), Some(2));
        assert_eq!(table.open_of(9), Some(7));
        assert_eq!(table.body(7), Some(8..9));
    }

    #[test]
    fn sibling_loops_get_their_own_close() {
        let tokens = tokenize("[>]+[<]");
        let table = LoopTable::build(&tokens).expect("balanced");
        assert_eq!(table.close_of(0), Some(2));
        assert_eq!(table.close_of(4), Some(6));
    }

    #[test]
    fn non_brackets_have_no_partner() {
        let tokens = tokenize("+[]");
        let table = LoopTable::build(&tokens).expect("balanced");
        assert_eq!(table.close_of(0), None);
        assert_eq!(table.open_of(0), None);
        assert_eq!(table.close_of(2), None);
        assert_eq!(table.body(1), Some(2..2));
    }

    #[test]
    fn lone_open_is_structural_error() {
        let err = LoopTable::build(&tokenize("[")).unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::UnmatchedBracket { ip: 0, kind: UnmatchedBracketKind::Open }
        ));
    }

    #[test]
    fn stray_close_is_structural_error() {
        let err = LoopTable::build(&tokenize("+ ]")).unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::UnmatchedBracket { ip: 2, kind: UnmatchedBracketKind::Close }
        ));
    }

    #[test]
    fn close_before_open_is_structural_error() {
        let err = LoopTable::build(&tokenize("][")).unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::UnmatchedBracket { kind: UnmatchedBracketKind::Close, .. }
        ));
    }

    #[test]
    fn unmatched_inner_open_reports_innermost() {
        let err = LoopTable::build(&tokenize("[[[]")).unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::UnmatchedBracket { ip: 1, kind: UnmatchedBracketKind::Open }
        ));
    }
}
