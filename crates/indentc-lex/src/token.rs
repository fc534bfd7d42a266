//! Token kinds and the priority table that drives the parser's
//! precedence-climbing expression parser.

/// All lexeme kinds this language's lexer ever produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of spaces/tabs at column 1. Only significant as an indentation
    /// marker; the same run occurring mid-line is consumed silently and
    /// never reaches the parser as a token (see [`crate::lexer::Lexer`]).
    Whitespace(u32),
    NewLine,
    Colon,
    Comma,
    Identifier,
    /// Decimal digit run; the text carries the literal, parsed to `i32` by
    /// the parser, not the lexer (so overflow is a *parse* error, matching
    /// where the parser owns diagnostics for all other AST-shape problems).
    Literal,

    // Keywords
    KeywordReturn,
    KeywordAnd,
    KeywordOr,
    KeywordIf,
    KeywordElif,
    KeywordElse,
    KeywordWhile,
    KeywordDef,

    // Operators and punctuation
    Plus,
    Minus,
    Star,
    Slash,
    Tilde,
    /// `!`, logical negation.
    Bang,
    LeftParen,
    RightParen,
    Question,
    Lt,
    LtEq,
    Gt,
    GtEq,
    EqEq,
    NotEq,
    /// `=`, assignment.
    Assign,

    Eof,
}

impl TokenKind {
    pub fn is_unary_operator(&self) -> bool {
        matches!(self, TokenKind::Minus | TokenKind::Tilde | TokenKind::Bang)
    }

    pub fn is_binary_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash
        )
    }

    pub fn is_logic_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Lt
                | TokenKind::LtEq
                | TokenKind::Gt
                | TokenKind::GtEq
                | TokenKind::EqEq
                | TokenKind::NotEq
                | TokenKind::KeywordAnd
                | TokenKind::KeywordOr
        )
    }

    pub fn is_ternary_operator(&self) -> bool {
        matches!(self, TokenKind::Question | TokenKind::Colon)
    }

    pub fn is_short_circuit(&self) -> bool {
        matches!(self, TokenKind::KeywordAnd | TokenKind::KeywordOr)
    }

    /// Binding priority: higher binds tighter. This is the one place the
    /// distilled priority table (all arithmetic and comparison operators at
    /// a single priority of 80, matching the evolutionary-draft original) is
    /// deliberately *not* reproduced: `*`/`/` are given 85 so that standard
    /// arithmetic precedence holds, per the resolution recorded in
    /// DESIGN.md. Everything else matches the original's table, including
    /// `and`/`or` binding tighter than comparisons (90 vs 80) — unusual, but
    /// not something left ambiguous by the source this was distilled from.
    ///
    /// `Minus` is both a unary and an infix operator; this table only
    /// governs infix binding (the parser's unary dispatch uses a fixed
    /// priority of 100 directly, never this method), so `Minus` is priced
    /// here at its binary priority of 80, not 100. `Tilde`/`Bang` are
    /// unary-only and never reach this method from an infix position.
    pub fn priority(&self) -> u8 {
        match self {
            TokenKind::Assign => 95,
            TokenKind::Question | TokenKind::Colon => 92,
            TokenKind::KeywordAnd | TokenKind::KeywordOr => 90,
            TokenKind::Star | TokenKind::Slash => 85,
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::EqEq
            | TokenKind::NotEq => 80,
            _ => 1,
        }
    }
}

/// A single lexeme: its kind, the exact source text, and its starting
/// position. Positions are always points (see [`indentc_util::Span`]), never
/// ranges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
            column,
        }
    }
}
