use thiserror::Error;

/// Lexical errors. Both are fatal: the lexer never recovers and emits at most
/// one of these per run.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("invalid token '{text}' on line {line}, column {column}")]
    InvalidCharacter {
        text: String,
        line: u32,
        column: u32,
    },

    #[error("unknown operator '{text}' on line {line}, column {column}")]
    UnknownOperator {
        text: String,
        line: u32,
        column: u32,
    },
}

impl LexError {
    pub fn line(&self) -> u32 {
        match self {
            LexError::InvalidCharacter { line, .. } => *line,
            LexError::UnknownOperator { line, .. } => *line,
        }
    }

    pub fn column(&self) -> u32 {
        match self {
            LexError::InvalidCharacter { column, .. } => *column,
            LexError::UnknownOperator { column, .. } => *column,
        }
    }
}

pub type Result<T> = std::result::Result<T, LexError>;
