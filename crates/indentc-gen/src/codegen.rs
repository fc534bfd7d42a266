//! Tree-walking code generator: lowers a flattened [`Program`] into GNU-syntax
//! x86-64 assembly text.
//!
//! One [`CodeGen`] is built per compilation. Label numbering is a single
//! counter shared across the whole program (per spec: "a single
//! per-compilation monotonic counter"); every construct that needs one or
//! more labels draws the next id(s) and formats them under its own prefix, so
//! two different constructs can share a numeric id without their labels ever
//! colliding.

use indexmap::IndexMap;
use indentc_par::ast::*;
use indentc_util::{StringTable, Symbol};

use crate::emitter::Emitter;
use crate::error::{CodeGenError, Result};

pub struct CodeGen<'a, 'arena> {
    emitter: Emitter,
    strings: &'a StringTable<'arena>,
    next_label_id: u32,
    /// Name -> byte offset from `%rbp`, valid for the function currently
    /// being lowered. Insertion-ordered so the stack layout (and therefore
    /// the emitted offsets) doesn't depend on hashing order.
    locals: IndexMap<Symbol, i64>,
    stack_index: i64,
}

impl<'a, 'arena> CodeGen<'a, 'arena> {
    pub fn generate(program: &Program, strings: &'a StringTable<'arena>) -> Result<String> {
        let mut gen = CodeGen {
            emitter: Emitter::new(),
            strings,
            next_label_id: 0,
            locals: IndexMap::new(),
            stack_index: 0,
        };
        gen.emit_program(program)?;
        Ok(gen.emitter.into_output())
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_label_id;
        self.next_label_id += 1;
        id
    }

    fn emit_program(&mut self, program: &Program) -> Result<()> {
        self.emitter.instruction(".global", &["main"]);
        for function in &program.functions {
            self.emit_function(function)?;
        }
        Ok(())
    }

    fn emit_function(&mut self, function: &FunctionDefinition) -> Result<()> {
        self.locals = IndexMap::new();
        self.stack_index = 0;

        let name = self.strings.resolve(function.name);
        self.emitter.enter_function(name);
        self.emit_block(&function.body)?;
        // A `Return` anywhere in the body (including nested inside an
        // `if`/`while`) already emitted its own epilogue text via
        // `emit_epilogue`, without unwinding `depth`. Only append a second
        // one here when the body's last top-level statement isn't a bare
        // `Return` — e.g. it falls through from a `Condition`/`While`, or the
        // function has no `Return` at all — so a function whose last
        // statement is a plain `return` gets exactly one epilogue. Either
        // way, `depth` unwinds exactly once, right here.
        if matches!(function.body.statements.last(), Some(Stmt::Return(_))) {
            self.emitter.leave_function_scope();
        } else {
            self.emitter.exit_function();
        }
        Ok(())
    }

    fn emit_block(&mut self, block: &Block) -> Result<()> {
        for stmt in &block.statements {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Return(expr) => {
                self.emit_expr(expr)?;
                // Epilogue text only: a `return` nested inside an `if`/`while`
                // body isn't the function's true end, so the indentation
                // depth must not unwind here — `emit_function` does that
                // exactly once after the whole body is lowered.
                self.emitter.emit_epilogue();
            }
            Stmt::VarDecl(decl) => {
                self.emit_expr(&decl.init)?;
                self.emitter.push_stack("%rax");
                self.stack_index -= 8;
                self.locals.insert(decl.name, self.stack_index);
            }
            Stmt::Condition(cond) => self.emit_condition(cond)?,
            Stmt::While(w) => self.emit_while(w)?,
            Stmt::FunctionDef(_) => {
                return Err(CodeGenError::UnexpectedExprNode {
                    what: "nested FunctionDefinition survived flattening".to_string(),
                })
            }
            Stmt::Expr(expr) => {
                self.emit_expr(expr)?;
            }
        }
        Ok(())
    }

    fn emit_while(&mut self, w: &WhileStatement) -> Result<()> {
        let id = self.next_id();
        let start = format!("loop_start_{id}");
        let end = format!("loop_end_{id}");

        self.emitter.label(&start);
        self.emit_expr(&w.condition)?;
        self.emitter.instruction("cmpl", &["$0", "%eax"]);
        self.emitter.instruction("je", &[&end]);
        self.emit_block(&w.body)?;
        self.emitter.instruction("jmp", &[&start]);
        self.emitter.label(&end);
        Ok(())
    }

    fn emit_condition(&mut self, cond: &Condition) -> Result<()> {
        let post_id = self.next_id();
        let post_label = format!("post_cond_{post_id}");
        let mut pending_label: Option<String> = None;

        let last_index = cond.clauses.len() - 1;
        for (i, clause) in cond.clauses.iter().enumerate() {
            if let Some(label) = pending_label.take() {
                self.emitter.label(&label);
            }
            self.emit_expr(&clause.condition)?;
            self.emitter.instruction("cmpl", &["$0", "%eax"]);

            let is_last = i == last_index;
            if is_last && cond.else_block.is_none() {
                self.emitter.instruction("je", &[&post_label]);
            } else {
                let next_id = self.next_id();
                let next_label = format!("cond_{next_id}");
                self.emitter.instruction("je", &[&next_label]);
                pending_label = Some(next_label);
            }

            self.emit_block(&clause.body)?;
            self.emitter.instruction("jmp", &[&post_label]);
        }

        if let Some(else_block) = &cond.else_block {
            if let Some(label) = pending_label.take() {
                self.emitter.label(&label);
            }
            self.emit_block(else_block)?;
        }

        self.emitter.label(&post_label);
        Ok(())
    }

    /// Lowers `expr` so its value lands in `%eax`.
    fn emit_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Constant(value) => {
                self.emitter
                    .instruction("mov", &[&format!("${value}"), "%eax"]);
            }
            Expr::VariableReference(name) => {
                let offset = self.offset_of(*name)?;
                self.emitter.instruction("mov", &[&offset, "%eax"]);
            }
            Expr::Unary(u) => self.emit_unary(u)?,
            Expr::Binary(b) => self.emit_binary(b)?,
            Expr::Logic(l) => self.emit_logic(l)?,
            Expr::Ternary(t) => self.emit_ternary(t)?,
            Expr::Call(call) => self.emit_call(call)?,
        }
        Ok(())
    }

    fn offset_of(&self, name: Symbol) -> Result<String> {
        let offset = self.locals.get(&name).ok_or_else(|| CodeGenError::UnknownVariable {
            name: self.strings.resolve(name).to_string(),
        })?;
        Ok(format!("{offset}(%rbp)"))
    }

    fn emit_unary(&mut self, u: &UnaryOperator) -> Result<()> {
        self.emit_expr(&u.expr)?;
        match u.op {
            UnaryOp::Negate => self.emitter.instruction("neg", &["%eax"]),
            UnaryOp::BitwiseComplement => self.emitter.instruction("not", &["%eax"]),
            UnaryOp::LogicalNegation => {
                self.emitter.instruction("cmp", &["$0", "%eax"]);
                self.emitter.instruction("sete", &["%al"]);
                self.emitter.instruction("movzb", &["%al", "%eax"]);
            }
        }
        Ok(())
    }

    fn emit_binary(&mut self, b: &BinaryOperator) -> Result<()> {
        if b.op == BinaryOp::Assign {
            let name = match b.lhs.as_ref() {
                Expr::VariableReference(name) => *name,
                other => {
                    return Err(CodeGenError::UnexpectedExprNode {
                        what: format!("non-name assignment target {other:?}"),
                    })
                }
            };
            self.emit_expr(&b.rhs)?;
            let offset = self.offset_of(name)?;
            self.emitter.instruction("mov", &["%eax", &offset]);
            return Ok(());
        }

        // Commutative operators evaluate left-to-right; non-commutative ones
        // evaluate the right operand first so the dividend/minuend ends up
        // in %eax after the pop, per the shadow-stack discipline.
        match b.op {
            BinaryOp::Add | BinaryOp::Mul => {
                self.emit_expr(&b.lhs)?;
                self.emitter.push_stack("%rax");
                self.emit_expr(&b.rhs)?;
                self.emitter.pop_stack("%rcx");
                let mnemonic = if b.op == BinaryOp::Add { "add" } else { "imul" };
                self.emitter.instruction(mnemonic, &["%ecx", "%eax"]);
            }
            BinaryOp::Sub | BinaryOp::Div => {
                self.emit_expr(&b.rhs)?;
                self.emitter.push_stack("%rax");
                self.emit_expr(&b.lhs)?;
                self.emitter.pop_stack("%rcx");
                if b.op == BinaryOp::Sub {
                    self.emitter.instruction("sub", &["%ecx", "%eax"]);
                } else {
                    self.emitter.instruction("cdq", &[]);
                    self.emitter.instruction("idiv", &["%ecx"]);
                }
            }
            BinaryOp::Assign => unreachable!("handled above"),
        }
        Ok(())
    }

    fn emit_logic(&mut self, l: &LogicOperator) -> Result<()> {
        match l.op {
            LogicOp::And => self.emit_short_circuit(&l.lhs, &l.rhs, true)?,
            LogicOp::Or => self.emit_short_circuit(&l.lhs, &l.rhs, false)?,
            _ => self.emit_comparison(l)?,
        }
        Ok(())
    }

    fn emit_comparison(&mut self, l: &LogicOperator) -> Result<()> {
        self.emit_expr(&l.lhs)?;
        self.emitter.push_stack("%rax");
        self.emit_expr(&l.rhs)?;
        self.emitter.pop_stack("%rcx");
        // %rcx now holds the left operand, %eax the right; `cmp %eax,%ecx`
        // computes `%ecx - %eax` (left - right), so the signed `set*` below
        // test the comparison in the source's left-to-right order.
        self.emitter.instruction("cmp", &["%eax", "%ecx"]);
        self.emitter.instruction("mov", &["$0", "%eax"]);
        let set = match l.op {
            LogicOp::Eq => "sete",
            LogicOp::NotEq => "setne",
            LogicOp::Le => "setle",
            LogicOp::Ge => "setge",
            LogicOp::Lt => "setl",
            LogicOp::Gt => "setg",
            LogicOp::And | LogicOp::Or => unreachable!("handled by emit_short_circuit"),
        };
        self.emitter.instruction(set, &["%al"]);
        Ok(())
    }

    /// `and`/`or` short-circuit lowering; both sides normalize a truthy
    /// result to exactly `1` via `setne`.
    fn emit_short_circuit(&mut self, lhs: &Expr, rhs: &Expr, is_and: bool) -> Result<()> {
        let id = self.next_id();
        let clause = format!("_clause_{id}");
        let clause_end = format!("_clause_{id}_end");

        self.emit_expr(lhs)?;
        self.emitter.instruction("cmp", &["$0", "%eax"]);
        if is_and {
            self.emitter.instruction("jne", &[&clause]);
            self.emitter.instruction("jmp", &[&clause_end]);
        } else {
            self.emitter.instruction("je", &[&clause]);
            self.emitter.instruction("mov", &["$1", "%eax"]);
            self.emitter.instruction("jmp", &[&clause_end]);
        }

        self.emitter.label(&clause);
        self.emit_expr(rhs)?;
        self.emitter.instruction("cmp", &["$0", "%eax"]);
        self.emitter.instruction("mov", &["$0", "%eax"]);
        self.emitter.instruction("setne", &["%al"]);
        self.emitter.label(&clause_end);
        Ok(())
    }

    fn emit_ternary(&mut self, t: &TernaryOperator) -> Result<()> {
        let id = self.next_id();
        let false_label = format!("conditional_{id}");
        let end_label = format!("post_conditional_{id}");

        self.emit_expr(&t.condition)?;
        self.emitter.instruction("cmp", &["$0", "%eax"]);
        self.emitter.instruction("je", &[&false_label]);
        self.emit_expr(&t.true_expr)?;
        self.emitter.instruction("jmp", &[&end_label]);
        self.emitter.label(&false_label);
        self.emit_expr(&t.false_expr)?;
        self.emitter.label(&end_label);
        Ok(())
    }

    /// Zero-argument calls only: the source non-goals rule out argument
    /// passing at call sites (the grammar accepts parameters only in `def`
    /// declarations), so a nonempty argument list is a code-gen error rather
    /// than silently wired through a calling convention. Return value comes
    /// back in `%eax` per the System V integer return register, already
    /// where the caller wants it.
    fn emit_call(&mut self, call: &FunctionCall) -> Result<()> {
        if !call.args.is_empty() {
            return Err(CodeGenError::UnhandledOperator {
                what: format!(
                    "call to '{}' with {} argument(s): argument passing at call sites is unsupported",
                    self.strings.resolve(call.name),
                    call.args.len()
                ),
            });
        }
        let name = self.strings.resolve(call.name).to_string();
        self.emitter.instruction("call", &[&name]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indentc_lex::Lexer;
    use indentc_par::Parser;

    fn generate(source: &str) -> String {
        let arena = bumpalo::Bump::new();
        let mut table = StringTable::new(&arena);
        let tokens = Lexer::tokenize(source).unwrap();
        let program = Parser::parse(tokens, &mut table).unwrap();
        let program = crate::flatten::flatten(program);
        CodeGen::generate(&program, &table).unwrap()
    }

    #[test]
    fn emits_prologue_and_epilogue_around_a_constant_return() {
        let asm = generate("return 10\n");
        assert!(asm.contains(".global main\n"));
        assert!(asm.contains("main:\n"));
        assert!(asm.contains("push %rbp\n"));
        assert!(asm.contains("mov %rsp, %rbp\n"));
        assert!(asm.contains("mov $10, %eax\n"));
        assert!(asm.contains("mov %rbp, %rsp\n"));
        assert!(asm.contains("pop %rbp\n"));
        assert!(asm.contains("ret\n"));
    }

    #[test]
    fn trailing_return_emits_exactly_one_epilogue() {
        // A body that ends in a bare `return` must not also get the
        // function-level fallthrough epilogue appended after it.
        let asm = generate("return 10\n");
        assert_eq!(asm.matches("ret\n").count(), 1);
        assert_eq!(asm.matches("pop %rbp\n").count(), 1);
    }

    #[test]
    fn return_nested_in_if_body_keeps_indentation_and_gets_its_own_epilogue() {
        // spec.md §8 scenario 5: `if 1: return 7` then a trailing `return 9`.
        // Both returns need their own full epilogue, and the instructions
        // after the nested return (the `jmp`/label/second return) must stay
        // at the function's one indentation step, not unwind to column 0.
        let asm = generate("if 1:\n    return 7\nreturn 9\n");
        assert_eq!(asm.matches("ret\n").count(), 2);
        assert_eq!(asm.matches("pop %rbp\n").count(), 2);
        for line in asm.lines() {
            if line.ends_with(':') || line.is_empty() || line.starts_with(".global") {
                continue;
            }
            assert!(
                line.starts_with("    "),
                "expected one indent step, got {line:?}"
            );
        }
    }

    #[test]
    fn negative_constant_lowers_to_a_negative_immediate() {
        let asm = generate("return -5\n");
        assert!(asm.contains("mov $-5, %eax\n") || asm.contains("neg %eax\n"));
    }

    #[test]
    fn variable_declaration_pushes_and_records_offset() {
        let asm = generate("a = 1\nreturn a\n");
        assert!(asm.contains("push %rax\n"));
        assert!(asm.contains("mov -8(%rbp), %eax\n"));
    }

    #[test]
    fn subtraction_lowers_right_operand_first() {
        // 10 - 3: right (3) is lowered before left (10) so the pop leaves
        // the minuend (10) in %eax to subtract %ecx (3) from.
        let asm = generate("return 10 - 3\n");
        let rhs_idx = asm.find("$3").unwrap();
        let lhs_idx = asm.find("$10").unwrap();
        assert!(rhs_idx < lhs_idx);
        assert!(asm.contains("sub %ecx, %eax\n"));
    }

    #[test]
    fn division_emits_cdq_before_idiv() {
        let asm = generate("return 10 / 2\n");
        let cdq = asm.find("cdq").unwrap();
        let idiv = asm.find("idiv").unwrap();
        assert!(cdq < idiv);
    }

    #[test]
    fn while_loop_emits_matching_start_and_end_labels() {
        let asm = generate("i = 0\nwhile i < 5:\n    i = i + 1\nreturn i\n");
        assert!(asm.contains("loop_start_"));
        assert!(asm.contains("loop_end_"));
    }

    #[test]
    fn if_without_else_jumps_straight_to_post_cond() {
        let asm = generate("if 1:\n    return 7\nreturn 9\n");
        assert!(asm.contains("post_cond_"));
        assert!(!asm.contains("cond_0\n"));
    }

    #[test]
    fn ternary_emits_conditional_and_post_conditional_labels() {
        let asm = generate("return 5 > 3 ? 1 : 2\n");
        assert!(asm.contains("conditional_"));
        assert!(asm.contains("post_conditional_"));
        assert!(asm.contains("setg %al\n"));
    }

    #[test]
    fn logical_and_short_circuits_through_clause_labels() {
        let asm = generate("return 1 and 0\n");
        assert!(asm.contains("_clause_"));
        assert!(asm.contains("_clause_0_end"));
    }

    #[test]
    fn call_with_arguments_is_rejected() {
        let arena = bumpalo::Bump::new();
        let mut table = StringTable::new(&arena);
        let src = "def f(a):\n    return a\nreturn f(1)\n";
        let tokens = Lexer::tokenize(src).unwrap();
        let program = Parser::parse(tokens, &mut table).unwrap();
        let program = crate::flatten::flatten(program);
        let err = CodeGen::generate(&program, &table).unwrap_err();
        assert!(matches!(err, CodeGenError::UnhandledOperator { .. }));
    }

    #[test]
    fn zero_argument_call_emits_call_instruction() {
        let asm = generate("def f():\n    return 1\nreturn f()\n");
        assert!(asm.contains("call f\n"));
    }
}
