use thiserror::Error;

/// Internal-invariant violations: a well-formed AST out of the parser should
/// never trigger any of these. They indicate a parser bug, not a user error,
/// so they carry no source position.
#[derive(Debug, Error)]
pub enum CodeGenError {
    #[error("unexpected node in expression context: {what}")]
    UnexpectedExprNode { what: String },

    #[error("assignment target '{name}' has no recorded stack offset")]
    UnknownVariable { name: String },

    #[error("unhandled operator case: {what}")]
    UnhandledOperator { what: String },
}

pub type Result<T> = std::result::Result<T, CodeGenError>;
