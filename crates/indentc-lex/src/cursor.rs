//! Character-level cursor over the source text.
//!
//! Modeled on the teacher lexer's `Cursor`, adapted from a byte-offset
//! cursor to a `Vec<char>`-backed one: the source language this compiles has
//! no multi-byte-sensitive lexing rules (identifiers are ASCII, operators are
//! ASCII), and working in `char`s directly keeps line/column bookkeeping
//! exactly one increment per character, matching the character-stream
//! tokenizer this was distilled from.

pub struct Cursor {
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
}

impl Cursor {
    pub fn new(source: &str) -> Self {
        Cursor {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    pub fn current_char(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    pub fn peek_char(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Advances past the current character, updating line/column. A `\n`
    /// resets the column and bumps the line, matching the original
    /// tokenizer's per-character line/pos accounting.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Advances past the current character only if it equals `expected`.
    pub fn match_char(&mut self, expected: char) -> bool {
        if self.current_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }
}
