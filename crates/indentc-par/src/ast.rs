//! Abstract syntax tree.
//!
//! Nodes carry their children as named, owned fields (`Box<Expr>`, `Vec<Stmt>`,
//! ...) rather than pointing back at a parent. Anything that needs to walk
//! "upward" (codegen's function-flattening pass, the AST dumper) threads that
//! context through its own recursion instead of following a stored pointer —
//! this is a deliberate departure from the source this was distilled from,
//! which tagged nodes with a parent/role side channel.

use indentc_util::{Span, Symbol};

#[derive(Debug)]
pub struct Program {
    pub functions: Vec<FunctionDefinition>,
}

#[derive(Debug)]
pub struct FunctionDefinition {
    pub name: Symbol,
    pub params: Vec<Symbol>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug)]
pub enum Stmt {
    Return(Expr),
    VarDecl(VariableDeclaration),
    Condition(Condition),
    While(WhileStatement),
    FunctionDef(FunctionDefinition),
    Expr(Expr),
}

#[derive(Debug)]
pub struct VariableDeclaration {
    pub name: Symbol,
    pub init: Expr,
    pub span: Span,
}

/// One `if`/`elif` clause. `if` and `elif` are structurally identical (both
/// carry a condition and a body) and are grouped into a single flat list here
/// instead of a nested `ElifStatement` chain, matching how the code generator
/// walks them (same lowering for every clause but the last).
#[derive(Debug)]
pub struct IfClause {
    pub condition: Expr,
    pub body: Block,
}

#[derive(Debug)]
pub struct Condition {
    pub clauses: Vec<IfClause>,
    pub else_block: Option<Block>,
}

#[derive(Debug)]
pub struct WhileStatement {
    pub condition: Expr,
    pub body: Block,
}

#[derive(Debug)]
pub enum Expr {
    Constant(i32),
    VariableReference(Symbol),
    Unary(UnaryOperator),
    Binary(BinaryOperator),
    Logic(LogicOperator),
    Ternary(TernaryOperator),
    Call(FunctionCall),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    BitwiseComplement,
    LogicalNegation,
}

#[derive(Debug)]
pub struct UnaryOperator {
    pub op: UnaryOp,
    pub expr: Box<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Reassignment of an already-declared variable. A fresh declaration is
    /// `VariableDeclaration`, never this — see `VariableDeclaration` above.
    Assign,
}

#[derive(Debug)]
pub struct BinaryOperator {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    NotEq,
}

#[derive(Debug)]
pub struct LogicOperator {
    pub op: LogicOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

#[derive(Debug)]
pub struct TernaryOperator {
    pub condition: Box<Expr>,
    pub true_expr: Box<Expr>,
    pub false_expr: Box<Expr>,
}

#[derive(Debug)]
pub struct FunctionCall {
    pub name: Symbol,
    pub args: Vec<Expr>,
    pub span: Span,
}
