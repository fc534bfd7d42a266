//! Pre-order AST pretty-printer, used by the driver's `--dump-ast` mode.

use std::fmt::Write as _;

use indentc_util::StringTable;

use crate::ast::*;

pub fn dump_program(program: &Program, strings: &StringTable<'_>) -> String {
    let mut out = String::new();
    for function in &program.functions {
        dump_function(function, strings, 0, &mut out);
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn dump_function(f: &FunctionDefinition, strings: &StringTable<'_>, depth: usize, out: &mut String) {
    indent(out, depth);
    let params: Vec<&str> = f.params.iter().map(|p| strings.resolve(*p)).collect();
    let _ = writeln!(
        out,
        "FunctionDefinition {}({})",
        strings.resolve(f.name),
        params.join(", ")
    );
    dump_block(&f.body, strings, depth + 1, out);
}

fn dump_block(block: &Block, strings: &StringTable<'_>, depth: usize, out: &mut String) {
    for stmt in &block.statements {
        dump_stmt(stmt, strings, depth, out);
    }
}

fn dump_stmt(stmt: &Stmt, strings: &StringTable<'_>, depth: usize, out: &mut String) {
    match stmt {
        Stmt::Return(expr) => {
            indent(out, depth);
            out.push_str("Return\n");
            dump_expr(expr, strings, depth + 1, out);
        }
        Stmt::VarDecl(decl) => {
            indent(out, depth);
            let _ = writeln!(out, "VariableDeclaration {}", strings.resolve(decl.name));
            dump_expr(&decl.init, strings, depth + 1, out);
        }
        Stmt::Condition(cond) => {
            for (i, clause) in cond.clauses.iter().enumerate() {
                indent(out, depth);
                let _ = writeln!(out, "{}", if i == 0 { "If" } else { "Elif" });
                dump_expr(&clause.condition, strings, depth + 1, out);
                dump_block(&clause.body, strings, depth + 1, out);
            }
            if let Some(else_block) = &cond.else_block {
                indent(out, depth);
                out.push_str("Else\n");
                dump_block(else_block, strings, depth + 1, out);
            }
        }
        Stmt::While(w) => {
            indent(out, depth);
            out.push_str("While\n");
            dump_expr(&w.condition, strings, depth + 1, out);
            dump_block(&w.body, strings, depth + 1, out);
        }
        Stmt::FunctionDef(f) => dump_function(f, strings, depth, out),
        Stmt::Expr(expr) => dump_expr(expr, strings, depth, out),
    }
}

fn dump_expr(expr: &Expr, strings: &StringTable<'_>, depth: usize, out: &mut String) {
    indent(out, depth);
    match expr {
        Expr::Constant(value) => {
            let _ = writeln!(out, "Constant {value}");
        }
        Expr::VariableReference(sym) => {
            let _ = writeln!(out, "VariableReference {}", strings.resolve(*sym));
        }
        Expr::Unary(u) => {
            let _ = writeln!(out, "UnaryOperator {:?}", u.op);
            dump_expr(&u.expr, strings, depth + 1, out);
        }
        Expr::Binary(b) => {
            let _ = writeln!(out, "BinaryOperator {:?}", b.op);
            dump_expr(&b.lhs, strings, depth + 1, out);
            dump_expr(&b.rhs, strings, depth + 1, out);
        }
        Expr::Logic(l) => {
            let _ = writeln!(out, "LogicOperator {:?}", l.op);
            dump_expr(&l.lhs, strings, depth + 1, out);
            dump_expr(&l.rhs, strings, depth + 1, out);
        }
        Expr::Ternary(t) => {
            out.push_str("TernaryOperator\n");
            dump_expr(&t.condition, strings, depth + 1, out);
            dump_expr(&t.true_expr, strings, depth + 1, out);
            dump_expr(&t.false_expr, strings, depth + 1, out);
        }
        Expr::Call(call) => {
            let _ = writeln!(out, "FunctionCall {}", strings.resolve(call.name));
            for arg in &call.args {
                dump_expr(arg, strings, depth + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use indentc_lex::Lexer;

    #[test]
    fn dumps_a_simple_function_with_indentation() {
        let arena = bumpalo::Bump::new();
        let mut table = StringTable::new(&arena);
        let tokens = Lexer::tokenize("return 1 + 2\n").unwrap();
        let program = Parser::parse(tokens, &mut table).unwrap();
        let text = dump_program(&program, &table);
        assert!(text.starts_with("FunctionDefinition main()\n"));
        assert!(text.contains("  Return\n"));
        assert!(text.contains("    BinaryOperator Add\n"));
    }
}
