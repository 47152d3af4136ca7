use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

use crate::token::Instruction;

/// Catppuccin Mocha accents used for instruction classes.
pub mod mocha {
    use nu_ansi_term::Color;

    pub const SURFACE2: Color = Color::Rgb(108, 112, 134);
    pub const RED: Color = Color::Rgb(243, 139, 168);
    pub const GREEN: Color = Color::Rgb(166, 227, 161);
    pub const YELLOW: Color = Color::Rgb(249, 226, 175);
    pub const MAUVE: Color = Color::Rgb(203, 166, 247);
    pub const PEACH: Color = Color::Rgb(250, 179, 135);
    pub const TEAL: Color = Color::Rgb(148, 226, 213);
    pub const SKY: Color = Color::Rgb(137, 220, 235);
}

/// Colors REPL input by instruction; comments are dimmed.
pub struct InstructionHighlighter {
    comment: Style,
}

impl Default for InstructionHighlighter {
    fn default() -> Self {
        Self {
            comment: Style::new().fg(mocha::SURFACE2),
        }
    }
}

impl InstructionHighlighter {
    fn color_for(op: Instruction) -> Color {
        // movement: sky/teal, arithmetic: green/red, I/O: yellow/peach, loops: mauve
        match op {
            Instruction::MoveForward => mocha::SKY,
            Instruction::MoveBackward => mocha::TEAL,
            Instruction::Increment => mocha::GREEN,
            Instruction::Decrement => mocha::RED,
            Instruction::Output => mocha::YELLOW,
            Instruction::Input => mocha::PEACH,
            Instruction::LoopOpen | Instruction::LoopClose => mocha::MAUVE,
        }
    }

    #[inline]
    fn style_for(&self, ch: char) -> Style {
        match Instruction::from_char(ch) {
            Some(op) => Style::new().fg(Self::color_for(op)).bold(),
            None => self.comment,
        }
    }
}

impl Highlighter for InstructionHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut out = StyledText::new();
        let mut run: Option<(Style, String)> = None;

        // Merge adjacent characters sharing a style into one span.
        for ch in line.chars() {
            let style = self.style_for(ch);
            if let Some((current, buffer)) = run.as_mut() {
                if *current == style {
                    buffer.push(ch);
                    continue;
                }
            }
            if let Some(done) = run.take() {
                out.push(done);
            }
            run = Some((style, ch.to_string()));
        }

        if let Some(done) = run {
            out.push(done);
        }
        out
    }
}
