//! Character-to-instruction tokenizer.
//!
//! Recognized characters are `+ - > < . , [ ]`. Everything else is treated
//! as a comment and silently dropped, so any input (including the empty
//! string) tokenizes successfully.

use std::fmt;

/// A single interpreter instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// `+`
    Increment,
    /// `-`
    Decrement,
    /// `>`
    MoveForward,
    /// `<`
    MoveBackward,
    /// `[`
    LoopOpen,
    /// `]`
    LoopClose,
    /// `.`
    Output,
    /// `,`
    Input,
}

impl Instruction {
    /// Map a source character to its instruction, if it is one.
    pub fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            '+' => Instruction::Increment,
            '-' => Instruction::Decrement,
            '>' => Instruction::MoveForward,
            '<' => Instruction::MoveBackward,
            '[' => Instruction::LoopOpen,
            ']' => Instruction::LoopClose,
            '.' => Instruction::Output,
            ',' => Instruction::Input,
            _ => return None,
        })
    }

    /// The source character this instruction is written as.
    pub fn as_char(self) -> char {
        match self {
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::MoveForward => '>',
            Instruction::MoveBackward => '<',
            Instruction::LoopOpen => '[',
            Instruction::LoopClose => ']',
            Instruction::Output => '.',
            Instruction::Input => ',',
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An instruction together with the char index it was read from.
///
/// Two tokens compare equal when their instructions match; the position is
/// only carried along for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub op: Instruction,
    pub pos: usize,
}

impl Token {
    pub fn new(op: Instruction, pos: usize) -> Self {
        Self { op, pos }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op
    }
}

impl Eq for Token {}

impl PartialEq<Instruction> for Token {
    fn eq(&self, other: &Instruction) -> bool {
        self.op == *other
    }
}

/// Tokenize `source`, keeping input order and dropping unrecognized characters.
pub fn tokenize(source: &str) -> Vec<Token> {
    source
        .chars()
        .enumerate()
        .filter_map(|(pos, ch)| Instruction::from_char(ch).map(|op| Token::new(op, pos)))
        .collect()
}

/// Keep only instruction characters.
pub fn bf_only(s: &str) -> String {
    s.chars().filter(|&c| Instruction::from_char(c).is_some()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use Instruction::*;

    #[test]
    fn drops_unrecognized_characters_in_order() {
        let ops: Vec<Instruction> = tokenize("a+b-").iter().map(|t| t.op).collect();
        assert_eq!(ops, vec![Increment, Decrement]);
    }

    #[test]
    fn recognizes_every_instruction() {
        let ops: Vec<Instruction> = tokenize("+-><[].,").iter().map(|t| t.op).collect();
        assert_eq!(
            ops,
            vec![Increment, Decrement, MoveForward, MoveBackward, LoopOpen, LoopClose, Output, Input]
        );
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("hello, world?").iter().all(|t| t.op == Input));
    }

    #[test]
    fn positions_are_char_indices() {
        let tokens = tokenize("é+ x]");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].pos, 1);
        assert_eq!(tokens[1].pos, 4);
    }

    #[test]
    fn equality_ignores_position() {
        assert_eq!(Token::new(LoopClose, 3), Token::new(LoopClose, 99));
        assert_ne!(Token::new(LoopClose, 3), Token::new(LoopOpen, 3));
        assert_eq!(tokenize("  +"), vec![Token::new(Increment, 0)]);
    }

    #[test]
    fn tokenizing_is_pure() {
        let src = "++[>+++[-]<-] comment ,.";
        assert_eq!(tokenize(src), tokenize(src));
    }

    #[test]
    fn bf_only_strips_comments() {
        assert_eq!(bf_only("add: ++ then print ."), "++.");
    }
}
