use thiserror::Error;

/// Parse-time errors. All fatal, single-line positional diagnostics — the
/// parser never attempts recovery or reports more than the first failure.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected token '{found}' on line {line}, column {column}")]
    UnexpectedToken {
        found: String,
        line: u32,
        column: u32,
    },

    #[error("expected {expected} but found '{found}' on line {line}, column {column}")]
    ExpectedToken {
        expected: String,
        found: String,
        line: u32,
        column: u32,
    },

    #[error("unbalanced parentheses starting at line {line}, column {column}")]
    UnbalancedParens { line: u32, column: u32 },

    #[error("bad indentation on line {line}, column {column}: {message}")]
    BadIndentation {
        message: String,
        line: u32,
        column: u32,
    },

    #[error("undefined variable '{name}' on line {line}, column {column}")]
    UndefinedVariable {
        name: String,
        line: u32,
        column: u32,
    },

    #[error("call to unknown function '{name}' on line {line}, column {column}")]
    UnknownFunction {
        name: String,
        line: u32,
        column: u32,
    },

    #[error("integer literal '{text}' out of range on line {line}, column {column}")]
    IntegerOverflow {
        text: String,
        line: u32,
        column: u32,
    },
}

pub type Result<T> = std::result::Result<T, ParseError>;
