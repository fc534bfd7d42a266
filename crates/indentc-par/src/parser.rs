//! Recursive-descent parser with a precedence-climbing expression parser.
//!
//! Expression parsing is value-returning (`parse_expression` takes a minimum
//! binding priority and returns the `Expr` it built) rather than threaded
//! through a shared mutable out-parameter stack — see the module docs on
//! `ast` and DESIGN.md for why. Binding: a pending infix operator is
//! consumed by the current call frame only if its priority is *strictly
//! greater* than the priority the frame was entered with; otherwise the
//! frame returns and lets an enclosing (lower-priority) frame either bind it
//! or likewise return.

use indentc_lex::{Token, TokenKind};
use indentc_util::{Span, StringTable, Symbol};
use rustc_hash::FxHashSet;

use crate::ast::*;
use crate::error::{ParseError, Result};

pub struct Parser<'a, 'arena> {
    tokens: Vec<Token>,
    pos: usize,
    strings: &'a mut StringTable<'arena>,
    declared_functions: FxHashSet<Symbol>,
    declared_vars: Vec<FxHashSet<Symbol>>,
    /// Column width of the innermost block currently being parsed; `0` at
    /// top level, where statements have no leading `Whitespace` token at
    /// all. Saved and restored around every nested `parse_block` call,
    /// mirroring the single mutable field the distilled source threads this
    /// through.
    indentation_level: u32,
}

impl<'a, 'arena> Parser<'a, 'arena> {
    pub fn new(tokens: Vec<Token>, strings: &'a mut StringTable<'arena>) -> Self {
        Parser {
            tokens,
            pos: 0,
            strings,
            declared_functions: FxHashSet::default(),
            declared_vars: vec![FxHashSet::default()],
            indentation_level: 0,
        }
    }

    pub fn parse(tokens: Vec<Token>, strings: &'a mut StringTable<'arena>) -> Result<Program> {
        let mut parser = Parser::new(tokens, strings);
        parser.parse_program()
    }

    // ---- token stream helpers ----

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current().kind == kind {
            Ok(self.advance())
        } else {
            Err(ParseError::ExpectedToken {
                expected: format!("{:?}", kind),
                found: format!("{:?}", self.current().kind),
                line: self.current().line,
                column: self.current().column,
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<Token> {
        if self.current().kind == TokenKind::Identifier {
            Ok(self.advance())
        } else {
            Err(ParseError::ExpectedToken {
                expected: "identifier".to_string(),
                found: format!("{:?}", self.current().kind),
                line: self.current().line,
                column: self.current().column,
            })
        }
    }

    fn skip_blank_lines(&mut self) {
        while self.current().kind == TokenKind::NewLine {
            self.advance();
        }
    }

    fn expect_newline_then_skip_blank(&mut self) -> Result<()> {
        self.expect(TokenKind::NewLine)?;
        self.skip_blank_lines();
        Ok(())
    }

    /// Returns `(indentation, next-real-token-kind)` for the statement
    /// starting at the cursor, without consuming anything. Top-level
    /// statements (no preceding `Whitespace` token) report indentation `0`.
    /// End of input reports `u32::MAX` so no real indentation ever matches
    /// it, letting block loops terminate uniformly.
    fn peek_statement_indent_and_kind(&self) -> (u32, TokenKind) {
        match &self.current().kind {
            TokenKind::Whitespace(len) => (*len, self.peek(1).kind.clone()),
            TokenKind::Eof => (u32::MAX, TokenKind::Eof),
            other => (0, other.clone()),
        }
    }

    fn consume_statement_leading_whitespace(&mut self, expected: u32) -> Result<()> {
        if expected == 0 {
            return Ok(());
        }
        match self.current().kind {
            TokenKind::Whitespace(len) if len == expected => {
                self.advance();
                Ok(())
            }
            _ => Err(ParseError::BadIndentation {
                message: format!("expected indentation of {expected} columns"),
                line: self.current().line,
                column: self.current().column,
            }),
        }
    }

    // ---- declared-name tracking ----

    fn push_var_scope(&mut self) {
        self.declared_vars.push(FxHashSet::default());
    }

    fn pop_var_scope(&mut self) {
        self.declared_vars.pop();
    }

    fn is_declared(&self, name: Symbol) -> bool {
        self.declared_vars
            .last()
            .map(|scope| scope.contains(&name))
            .unwrap_or(false)
    }

    fn declare(&mut self, name: Symbol) {
        if let Some(scope) = self.declared_vars.last_mut() {
            scope.insert(name);
        }
    }

    // ---- program / top level ----

    fn parse_program(&mut self) -> Result<Program> {
        let mut functions = Vec::new();
        let mut main_stmts = Vec::new();

        self.skip_blank_lines();
        loop {
            let (indent, kind) = self.peek_statement_indent_and_kind();
            if kind == TokenKind::Eof {
                break;
            }
            if indent != 0 {
                return Err(ParseError::BadIndentation {
                    message: "unexpected indentation at top level".to_string(),
                    line: self.current().line,
                    column: self.current().column,
                });
            }
            if let Some(stmt) = self.parse_statement(0)? {
                match stmt {
                    Stmt::FunctionDef(f) => functions.push(f),
                    other => main_stmts.push(other),
                }
            }
            self.skip_blank_lines();
        }

        let main_name = self.strings.intern("main");
        let has_explicit_main = functions.iter().any(|f| f.name == main_name);
        if has_explicit_main {
            if !main_stmts.is_empty() {
                if let Some(f) = functions.iter_mut().find(|f| f.name == main_name) {
                    f.body.statements.extend(main_stmts);
                }
            }
        } else {
            functions.insert(
                0,
                FunctionDefinition {
                    name: main_name,
                    params: Vec::new(),
                    body: Block {
                        statements: main_stmts,
                    },
                    span: Span::new(1, 1),
                },
            );
        }

        Ok(Program { functions })
    }

    // ---- statements ----

    fn parse_statement(&mut self, indent: u32) -> Result<Option<Stmt>> {
        match self.current().kind.clone() {
            TokenKind::KeywordReturn => Ok(Some(self.parse_return()?)),
            TokenKind::KeywordIf => Ok(Some(self.parse_condition(indent)?)),
            TokenKind::KeywordWhile => Ok(Some(self.parse_while()?)),
            TokenKind::KeywordDef => Ok(Some(self.parse_function_def()?)),
            TokenKind::Identifier => Ok(Some(self.parse_identifier_statement()?)),
            // A blank line (possibly indented, e.g. inside a `while`/`if`
            // body) produces no statement; the caller's block loop already
            // treats `None` as "nothing to push."
            TokenKind::NewLine => {
                self.advance();
                Ok(None)
            }
            TokenKind::Eof => Ok(None),
            other => Err(ParseError::UnexpectedToken {
                found: format!("{other:?}"),
                line: self.current().line,
                column: self.current().column,
            }),
        }
    }

    /// Parses the body of a function, `if`/`elif`/`else` clause, or `while`
    /// loop: a run of statements whose leading `Whitespace` is strictly wider
    /// than the enclosing block's and all equal to each other.
    fn parse_block(&mut self) -> Result<Block> {
        let (len, _) = self.peek_statement_indent_and_kind();
        if len == u32::MAX || len <= self.indentation_level {
            return Err(ParseError::BadIndentation {
                message: "expected an indented block".to_string(),
                line: self.current().line,
                column: self.current().column,
            });
        }
        let saved = self.indentation_level;
        self.indentation_level = len;

        let mut statements = Vec::new();
        loop {
            let (cur_len, kind) = self.peek_statement_indent_and_kind();
            if cur_len != len || kind == TokenKind::Eof {
                break;
            }
            self.consume_statement_leading_whitespace(len)?;
            if let Some(stmt) = self.parse_statement(len)? {
                statements.push(stmt);
            }
            self.skip_blank_lines();
        }

        self.indentation_level = saved;
        Ok(Block { statements })
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::KeywordReturn)?;
        let expr = self.parse_expression(0)?;
        Ok(Stmt::Return(expr))
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::KeywordWhile)?;
        let condition = self.parse_expression(0)?;
        self.expect(TokenKind::Colon)?;
        self.expect_newline_then_skip_blank()?;
        let body = self.parse_block()?;
        Ok(Stmt::While(WhileStatement { condition, body }))
    }

    fn parse_condition(&mut self, own_indent: u32) -> Result<Stmt> {
        self.expect(TokenKind::KeywordIf)?;
        let condition = self.parse_expression(0)?;
        self.expect(TokenKind::Colon)?;
        self.expect_newline_then_skip_blank()?;
        let body = self.parse_block()?;
        let mut clauses = vec![IfClause { condition, body }];
        let mut else_block = None;

        loop {
            let (indent, kind) = self.peek_statement_indent_and_kind();
            if indent != own_indent {
                break;
            }
            match kind {
                TokenKind::KeywordElif => {
                    self.consume_statement_leading_whitespace(own_indent)?;
                    self.expect(TokenKind::KeywordElif)?;
                    let condition = self.parse_expression(0)?;
                    self.expect(TokenKind::Colon)?;
                    self.expect_newline_then_skip_blank()?;
                    let body = self.parse_block()?;
                    clauses.push(IfClause { condition, body });
                }
                TokenKind::KeywordElse => {
                    self.consume_statement_leading_whitespace(own_indent)?;
                    self.expect(TokenKind::KeywordElse)?;
                    self.expect(TokenKind::Colon)?;
                    self.expect_newline_then_skip_blank()?;
                    let body = self.parse_block()?;
                    else_block = Some(body);
                    break;
                }
                _ => break,
            }
        }

        Ok(Stmt::Condition(Condition {
            clauses,
            else_block,
        }))
    }

    fn parse_function_def(&mut self) -> Result<Stmt> {
        let span = Span::new(self.current().line, self.current().column);
        self.expect(TokenKind::KeywordDef)?;
        let name_tok = self.expect_identifier()?;
        let name = self.strings.intern(&name_tok.text);
        self.declared_functions.insert(name);

        self.expect(TokenKind::LeftParen)?;
        let mut params = Vec::new();
        while self.current().kind != TokenKind::RightParen {
            let p = self.expect_identifier()?;
            params.push(self.strings.intern(&p.text));
            if self.current().kind == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;
        self.expect(TokenKind::Colon)?;
        self.expect_newline_then_skip_blank()?;

        self.push_var_scope();
        for p in &params {
            self.declare(*p);
        }
        let body = self.parse_block()?;
        self.pop_var_scope();

        Ok(Stmt::FunctionDef(FunctionDefinition {
            name,
            params,
            body,
            span,
        }))
    }

    fn parse_identifier_statement(&mut self) -> Result<Stmt> {
        let span = Span::new(self.current().line, self.current().column);
        let name_tok = self.advance();
        let sym = self.strings.intern(&name_tok.text);

        if self.current().kind == TokenKind::Assign {
            self.advance();
            let already_declared = self.is_declared(sym);
            let init = self.parse_expression(0)?;
            if already_declared {
                let lhs = Box::new(Expr::VariableReference(sym));
                Ok(Stmt::Expr(Expr::Binary(BinaryOperator {
                    op: BinaryOp::Assign,
                    lhs,
                    rhs: Box::new(init),
                })))
            } else {
                self.declare(sym);
                Ok(Stmt::VarDecl(VariableDeclaration {
                    name: sym,
                    init,
                    span,
                }))
            }
        } else if self.current().kind == TokenKind::LeftParen {
            let call = self.parse_call_args(sym, name_tok.line, name_tok.column)?;
            Ok(Stmt::Expr(Expr::Call(call)))
        } else {
            if !self.is_declared(sym) {
                return Err(ParseError::UndefinedVariable {
                    name: name_tok.text,
                    line: name_tok.line,
                    column: name_tok.column,
                });
            }
            Ok(Stmt::Expr(Expr::VariableReference(sym)))
        }
    }

    fn parse_call_args(&mut self, name: Symbol, line: u32, column: u32) -> Result<FunctionCall> {
        if !self.declared_functions.contains(&name) {
            return Err(ParseError::UnknownFunction {
                name: self.strings.resolve(name).to_string(),
                line,
                column,
            });
        }
        self.expect(TokenKind::LeftParen)?;
        let mut args = Vec::new();
        while self.current().kind != TokenKind::RightParen {
            args.push(self.parse_expression(0)?);
            if self.current().kind == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(FunctionCall {
            name,
            args,
            span: Span::new(line, column),
        })
    }

    // ---- expressions ----

    fn parse_expression(&mut self, min_priority: u8) -> Result<Expr> {
        let mut lhs = self.parse_primary()?;

        loop {
            let kind = self.current().kind.clone();
            if matches!(
                kind,
                TokenKind::NewLine
                    | TokenKind::Colon
                    | TokenKind::Comma
                    | TokenKind::RightParen
                    | TokenKind::Eof
            ) {
                break;
            }

            if kind.is_binary_operator() || kind.is_logic_operator() {
                let priority = kind.priority();
                if priority <= min_priority {
                    break;
                }
                let op_tok = self.advance();
                let rhs = self.parse_expression(priority)?;
                lhs = self.build_infix(op_tok, lhs, rhs)?;
                continue;
            }

            if kind == TokenKind::Question {
                let priority = kind.priority();
                if priority <= min_priority {
                    break;
                }
                self.advance();
                let true_expr = self.parse_expression(0)?;
                self.expect(TokenKind::Colon)?;
                let false_expr = self.parse_expression(0)?;
                lhs = Expr::Ternary(TernaryOperator {
                    condition: Box::new(lhs),
                    true_expr: Box::new(true_expr),
                    false_expr: Box::new(false_expr),
                });
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    fn build_infix(&self, op_tok: Token, lhs: Expr, rhs: Expr) -> Result<Expr> {
        let lhs = Box::new(lhs);
        let rhs = Box::new(rhs);
        let expr = match op_tok.kind {
            TokenKind::Plus => Expr::Binary(BinaryOperator {
                op: BinaryOp::Add,
                lhs,
                rhs,
            }),
            TokenKind::Minus => Expr::Binary(BinaryOperator {
                op: BinaryOp::Sub,
                lhs,
                rhs,
            }),
            TokenKind::Star => Expr::Binary(BinaryOperator {
                op: BinaryOp::Mul,
                lhs,
                rhs,
            }),
            TokenKind::Slash => Expr::Binary(BinaryOperator {
                op: BinaryOp::Div,
                lhs,
                rhs,
            }),
            TokenKind::KeywordAnd => Expr::Logic(LogicOperator {
                op: LogicOp::And,
                lhs,
                rhs,
            }),
            TokenKind::KeywordOr => Expr::Logic(LogicOperator {
                op: LogicOp::Or,
                lhs,
                rhs,
            }),
            TokenKind::Lt => Expr::Logic(LogicOperator {
                op: LogicOp::Lt,
                lhs,
                rhs,
            }),
            TokenKind::LtEq => Expr::Logic(LogicOperator {
                op: LogicOp::Le,
                lhs,
                rhs,
            }),
            TokenKind::Gt => Expr::Logic(LogicOperator {
                op: LogicOp::Gt,
                lhs,
                rhs,
            }),
            TokenKind::GtEq => Expr::Logic(LogicOperator {
                op: LogicOp::Ge,
                lhs,
                rhs,
            }),
            TokenKind::EqEq => Expr::Logic(LogicOperator {
                op: LogicOp::Eq,
                lhs,
                rhs,
            }),
            TokenKind::NotEq => Expr::Logic(LogicOperator {
                op: LogicOp::NotEq,
                lhs,
                rhs,
            }),
            other => {
                return Err(ParseError::UnexpectedToken {
                    found: format!("{other:?}"),
                    line: op_tok.line,
                    column: op_tok.column,
                })
            }
        };
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.current().kind.clone() {
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_expression(100)?;
                Ok(Expr::Unary(UnaryOperator {
                    op: UnaryOp::Negate,
                    expr: Box::new(operand),
                }))
            }
            TokenKind::Tilde => {
                self.advance();
                let operand = self.parse_expression(100)?;
                Ok(Expr::Unary(UnaryOperator {
                    op: UnaryOp::BitwiseComplement,
                    expr: Box::new(operand),
                }))
            }
            TokenKind::Bang => {
                self.advance();
                let operand = self.parse_expression(100)?;
                Ok(Expr::Unary(UnaryOperator {
                    op: UnaryOp::LogicalNegation,
                    expr: Box::new(operand),
                }))
            }
            TokenKind::LeftParen => {
                let open = self.advance();
                let inner = self.parse_expression(0)?;
                if self.current().kind != TokenKind::RightParen {
                    return Err(ParseError::UnbalancedParens {
                        line: open.line,
                        column: open.column,
                    });
                }
                self.advance();
                Ok(inner)
            }
            TokenKind::Literal => {
                let tok = self.advance();
                let value: i64 = tok.text.parse().map_err(|_| ParseError::IntegerOverflow {
                    text: tok.text.clone(),
                    line: tok.line,
                    column: tok.column,
                })?;
                if value > i32::MAX as i64 {
                    return Err(ParseError::IntegerOverflow {
                        text: tok.text,
                        line: tok.line,
                        column: tok.column,
                    });
                }
                Ok(Expr::Constant(value as i32))
            }
            TokenKind::Identifier => {
                let tok = self.advance();
                let sym = self.strings.intern(&tok.text);
                if self.current().kind == TokenKind::LeftParen {
                    let call = self.parse_call_args(sym, tok.line, tok.column)?;
                    Ok(Expr::Call(call))
                } else {
                    if !self.is_declared(sym) {
                        return Err(ParseError::UndefinedVariable {
                            name: tok.text,
                            line: tok.line,
                            column: tok.column,
                        });
                    }
                    Ok(Expr::VariableReference(sym))
                }
            }
            other => Err(ParseError::UnexpectedToken {
                found: format!("{other:?}"),
                line: self.current().line,
                column: self.current().column,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indentc_lex::Lexer;

    fn parse(source: &str) -> Result<Program> {
        let arena = bumpalo::Bump::new();
        let mut table = StringTable::new(&arena);
        let tokens = Lexer::tokenize(source).expect("lex ok");
        Parser::parse(tokens, &mut table)
    }

    #[test]
    fn synthesizes_main_for_bare_statements() {
        let program = parse("return 5\n").unwrap();
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].body.statements.len(), 1);
    }

    #[test]
    fn standard_precedence_multiplication_binds_tighter() {
        // 2 + 3 * 4 must parse as 2 + (3 * 4)
        let program = parse("return 2 + 3 * 4\n").unwrap();
        let Stmt::Return(Expr::Binary(add)) = &program.functions[0].body.statements[0] else {
            panic!("expected a binary return expression");
        };
        assert_eq!(add.op, BinaryOp::Add);
        let Expr::Binary(mul) = add.rhs.as_ref() else {
            panic!("rhs of + should be the * subtree");
        };
        assert_eq!(mul.op, BinaryOp::Mul);
    }

    #[test]
    fn left_associative_same_priority_chain() {
        // 1 - 2 - 3 must parse as (1 - 2) - 3
        let program = parse("return 1 - 2 - 3\n").unwrap();
        let Stmt::Return(Expr::Binary(outer)) = &program.functions[0].body.statements[0] else {
            panic!("expected binary return");
        };
        assert_eq!(outer.op, BinaryOp::Sub);
        assert!(matches!(outer.rhs.as_ref(), Expr::Constant(3)));
        let Expr::Binary(inner) = outer.lhs.as_ref() else {
            panic!("lhs of outer - should be the inner (1 - 2) subtree");
        };
        assert_eq!(inner.op, BinaryOp::Sub);
    }

    #[test]
    fn not_eq_lexes_and_parses_as_one_operator() {
        let program = parse("x = 1\nreturn x != 2\n").unwrap();
        let Stmt::Return(Expr::Logic(cmp)) = &program.functions[0].body.statements[1] else {
            panic!("expected logic comparison return");
        };
        assert_eq!(cmp.op, LogicOp::NotEq);
    }

    #[test]
    fn reassignment_of_declared_variable_is_binary_assign() {
        let program = parse("x = 1\nx = 2\nreturn x\n").unwrap();
        assert!(matches!(
            program.functions[0].body.statements[1],
            Stmt::Expr(Expr::Binary(BinaryOperator {
                op: BinaryOp::Assign,
                ..
            }))
        ));
    }

    #[test]
    fn undeclared_variable_reference_is_an_error() {
        let err = parse("return y\n").unwrap_err();
        assert!(matches!(err, ParseError::UndefinedVariable { .. }));
    }

    #[test]
    fn call_to_undeclared_function_is_an_error() {
        let err = parse("x = foo()\nreturn x\n").unwrap_err();
        assert!(matches!(err, ParseError::UnknownFunction { .. }));
    }

    #[test]
    fn function_params_accept_both_trailing_comma_forms() {
        let a = parse("def f(a, b):\n    return a\nreturn f(1, 2)\n").unwrap();
        let b = parse("def f(a, b,):\n    return a\nreturn f(1, 2,)\n").unwrap();
        assert_eq!(a.functions[1].params.len(), 2);
        assert_eq!(b.functions[1].params.len(), 2);
    }

    #[test]
    fn if_elif_else_are_grouped_by_matching_indentation() {
        let src = "x = 1\nif x:\n    return 1\nelif x:\n    return 2\nelse:\n    return 3\n";
        let program = parse(src).unwrap();
        let Stmt::Condition(cond) = &program.functions[0].body.statements[1] else {
            panic!("expected a condition statement");
        };
        assert_eq!(cond.clauses.len(), 2);
        assert!(cond.else_block.is_some());
    }

    #[test]
    fn bad_indentation_is_rejected() {
        let err = parse("if 1:\nreturn 1\n").unwrap_err();
        assert!(matches!(err, ParseError::BadIndentation { .. }));
    }

    #[test]
    fn blank_line_matching_block_indentation_is_skipped() {
        // A blank line carrying the same leading whitespace as the
        // surrounding block (e.g. a stray trailing-space line) must not be
        // mistaken for a statement.
        let src = "i = 0\nwhile i < 5:\n    i = i + 1\n    \n    i = i + 1\nreturn i\n";
        let program = parse(src).unwrap();
        let Stmt::While(w) = &program.functions[0].body.statements[1] else {
            panic!("expected a while statement");
        };
        assert_eq!(w.body.statements.len(), 2);
    }
}
