//! Lexical analysis: turns source text into a flat token stream.
//!
//! Dispatch, indentation-significant whitespace, and the fatal error
//! conditions all follow the contract described for this language; see
//! `cursor`, `token`, and `lexer` for the pieces.

mod cursor;
mod error;
mod lexer;
mod token;

pub use error::{LexError, Result};
pub use lexer::Lexer;
pub use token::{Token, TokenKind};
