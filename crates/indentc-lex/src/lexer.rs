use crate::cursor::Cursor;
use crate::error::{LexError, Result};
use crate::token::{Token, TokenKind};

fn is_operator_char(ch: char) -> bool {
    matches!(
        ch,
        '+' | '-' | '*' | '/' | '~' | '!' | '<' | '>' | '(' | ')' | '=' | '?'
    )
}

fn keyword(text: &str) -> Option<TokenKind> {
    Some(match text {
        "return" => TokenKind::KeywordReturn,
        "and" => TokenKind::KeywordAnd,
        "or" => TokenKind::KeywordOr,
        "if" => TokenKind::KeywordIf,
        "elif" => TokenKind::KeywordElif,
        "else" => TokenKind::KeywordElse,
        "while" => TokenKind::KeywordWhile,
        "def" => TokenKind::KeywordDef,
        _ => return None,
    })
}

/// Produces one [`Token`] at a time from a source string.
///
/// Dispatch order on the current character matches the original tokenizer
/// this was distilled from: whitespace/newline/colon/comma get dedicated
/// single-character handling, then operator characters, then alphabetic
/// (identifier/keyword) and digit (literal) runs, with anything else a fatal
/// `InvalidCharacter`.
pub struct Lexer {
    cursor: Cursor,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            cursor: Cursor::new(source),
        }
    }

    /// Lexes and returns the whole token stream, ending in a single
    /// `TokenKind::Eof` sentinel so the parser never has to special-case
    /// "ran off the end of the vector."
    pub fn tokenize(source: &str) -> Result<Vec<Token>> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            if self.cursor.is_at_end() {
                return Ok(Token::new(
                    TokenKind::Eof,
                    "",
                    self.cursor.line(),
                    self.cursor.column(),
                ));
            }

            let line = self.cursor.line();
            let column = self.cursor.column();
            let ch = self.cursor.current_char().expect("checked not at end");

            if ch == ' ' || ch == '\t' {
                if column == 1 {
                    return Ok(self.lex_whitespace(line, column));
                }
                // Mid-line whitespace carries no meaning in this language;
                // it is consumed and never reaches the parser.
                self.cursor.advance();
                continue;
            }

            if ch == '\n' {
                self.cursor.advance();
                return Ok(Token::new(TokenKind::NewLine, "\n", line, column));
            }

            if ch == ':' {
                self.cursor.advance();
                return Ok(Token::new(TokenKind::Colon, ":", line, column));
            }

            if ch == ',' {
                self.cursor.advance();
                return Ok(Token::new(TokenKind::Comma, ",", line, column));
            }

            if ch.is_ascii_alphabetic() || ch == '_' {
                return Ok(self.lex_identifier(line, column));
            }

            if ch.is_ascii_digit() {
                return Ok(self.lex_literal(line, column));
            }

            if is_operator_char(ch) {
                return self.lex_operator(line, column);
            }

            self.cursor.advance();
            return Err(LexError::InvalidCharacter {
                text: ch.to_string(),
                line,
                column,
            });
        }
    }

    fn lex_whitespace(&mut self, line: u32, column: u32) -> Token {
        debug_assert_eq!(column, 1);
        let mut text = String::new();
        while matches!(self.cursor.current_char(), Some(' ') | Some('\t')) {
            text.push(self.cursor.advance().expect("just peeked"));
        }
        let len = text.chars().count() as u32;
        Token::new(TokenKind::Whitespace(len), text, line, column)
    }

    fn lex_identifier(&mut self, line: u32, column: u32) -> Token {
        let mut text = String::new();
        while let Some(ch) = self.cursor.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                text.push(ch);
                self.cursor.advance();
            } else {
                break;
            }
        }
        let kind = keyword(&text).unwrap_or(TokenKind::Identifier);
        Token::new(kind, text, line, column)
    }

    fn lex_literal(&mut self, line: u32, column: u32) -> Token {
        let mut text = String::new();
        while let Some(ch) = self.cursor.current_char() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.cursor.advance();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Literal, text, line, column)
    }

    /// Lexes operator/punctuation characters.
    ///
    /// Unlike the distilled source's greedy "consume every operator
    /// character, then look the lexeme up in a table" approach, this uses a
    /// single-character lookahead per operator (the same technique the
    /// teacher lexer's `lex_plus`/`lex_bang`/etc. use). The language's full
    /// two-character operator set (`<= >= == !=`) is closed and small enough
    /// that one lookahead fully covers it, and doing it this way is what
    /// makes `!=` lex as one `NotEq` token instead of two — see DESIGN.md.
    fn lex_operator(&mut self, line: u32, column: u32) -> Result<Token> {
        let ch = self.cursor.advance().expect("checked not at end");
        let (kind, text): (TokenKind, &'static str) = match ch {
            '+' => (TokenKind::Plus, "+"),
            '-' => (TokenKind::Minus, "-"),
            '*' => (TokenKind::Star, "*"),
            '/' => (TokenKind::Slash, "/"),
            '~' => (TokenKind::Tilde, "~"),
            '(' => (TokenKind::LeftParen, "("),
            ')' => (TokenKind::RightParen, ")"),
            '?' => (TokenKind::Question, "?"),
            '<' => {
                if self.cursor.match_char('=') {
                    (TokenKind::LtEq, "<=")
                } else {
                    (TokenKind::Lt, "<")
                }
            }
            '>' => {
                if self.cursor.match_char('=') {
                    (TokenKind::GtEq, ">=")
                } else {
                    (TokenKind::Gt, ">")
                }
            }
            '=' => {
                if self.cursor.match_char('=') {
                    (TokenKind::EqEq, "==")
                } else {
                    (TokenKind::Assign, "=")
                }
            }
            '!' => {
                if self.cursor.match_char('=') {
                    (TokenKind::NotEq, "!=")
                } else {
                    (TokenKind::Bang, "!")
                }
            }
            other => {
                return Err(LexError::UnknownOperator {
                    text: other.to_string(),
                    line,
                    column,
                })
            }
        };
        Ok(Token::new(kind, text, line, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_keywords() {
        for (text, kind) in [
            ("return", TokenKind::KeywordReturn),
            ("and", TokenKind::KeywordAnd),
            ("or", TokenKind::KeywordOr),
            ("if", TokenKind::KeywordIf),
            ("elif", TokenKind::KeywordElif),
            ("else", TokenKind::KeywordElse),
            ("while", TokenKind::KeywordWhile),
            ("def", TokenKind::KeywordDef),
        ] {
            assert_eq!(kinds(text), vec![kind, TokenKind::Eof]);
        }
    }

    #[test]
    fn distinguishes_identifier_from_keyword_prefix() {
        assert_eq!(kinds("returning"), vec![TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn lexes_literal() {
        assert_eq!(kinds("1234"), vec![TokenKind::Literal, TokenKind::Eof]);
    }

    #[test]
    fn lexes_not_eq_as_single_token() {
        assert_eq!(kinds("!="), vec![TokenKind::NotEq, TokenKind::Eof]);
    }

    #[test]
    fn bare_bang_is_negation() {
        assert_eq!(kinds("!x"), vec![TokenKind::Bang, TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn two_character_comparisons() {
        assert_eq!(kinds("<="), vec![TokenKind::LtEq, TokenKind::Eof]);
        assert_eq!(kinds(">="), vec![TokenKind::GtEq, TokenKind::Eof]);
        assert_eq!(kinds("=="), vec![TokenKind::EqEq, TokenKind::Eof]);
        assert_eq!(kinds("<"), vec![TokenKind::Lt, TokenKind::Eof]);
        assert_eq!(kinds(">"), vec![TokenKind::Gt, TokenKind::Eof]);
        assert_eq!(kinds("="), vec![TokenKind::Assign, TokenKind::Eof]);
    }

    #[test]
    fn leading_whitespace_is_significant() {
        let tokens = Lexer::tokenize("  x").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Whitespace(2));
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn mid_line_whitespace_is_discarded() {
        let tokens = Lexer::tokenize("x y").unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.kind.clone()).collect::<Vec<_>>(),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn newline_resets_column_tracking() {
        let tokens = Lexer::tokenize("x\n  y").unwrap();
        // second line's leading whitespace is still column 1 on that line
        let ws = tokens
            .iter()
            .find(|t| matches!(t.kind, TokenKind::Whitespace(_)))
            .unwrap();
        assert_eq!(ws.line, 2);
        assert_eq!(ws.column, 1);
    }

    #[test]
    fn unknown_character_is_an_error() {
        let err = Lexer::tokenize("@").unwrap_err();
        assert_eq!(err.line(), 1);
        assert_eq!(err.column(), 1);
    }

    #[test]
    fn non_ascii_letters_are_not_identifier_characters() {
        // identifiers are [A-Za-z_][A-Za-z0-9_]*; a non-ASCII letter is
        // neither a valid identifier start nor a valid source character.
        let err = Lexer::tokenize("x\u{00e9} = 1\n").unwrap_err();
        assert_eq!(err.line(), 1);
        assert_eq!(err.column(), 2);
    }
}
