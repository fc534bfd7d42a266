//! Hoists nested `def`s out to the top level before code generation.
//!
//! The parser accepts nested function definitions syntactically (the source
//! this was distilled from never exercises them, and the language has no
//! closures or nested scopes to give a nested `def` different semantics from
//! a top-level one), so the generator treats every `def` as a top-level
//! assembly function: a nested `def` is removed from its enclosing block —
//! it does not execute inline where it's written — and appended to the
//! program's flat function list, recursively, so a `def` nested inside a
//! `def` nested inside a `def` still surfaces.

use indentc_par::ast::{Block, FunctionDefinition, Program, Stmt};

pub fn flatten(mut program: Program) -> Program {
    let mut hoisted = Vec::new();
    for function in &mut program.functions {
        flatten_block(&mut function.body, &mut hoisted);
    }

    let mut i = 0;
    while i < hoisted.len() {
        let mut nested = std::mem::replace(
            &mut hoisted[i],
            FunctionDefinition {
                name: hoisted[i].name,
                params: Vec::new(),
                body: Block {
                    statements: Vec::new(),
                },
                span: hoisted[i].span,
            },
        );
        flatten_block(&mut nested.body, &mut hoisted);
        hoisted[i] = nested;
        i += 1;
    }

    program.functions.extend(hoisted);
    program
}

fn flatten_block(block: &mut Block, hoisted: &mut Vec<FunctionDefinition>) {
    let mut kept = Vec::with_capacity(block.statements.len());
    for stmt in block.statements.drain(..) {
        match stmt {
            Stmt::FunctionDef(f) => hoisted.push(f),
            Stmt::Condition(mut cond) => {
                for clause in &mut cond.clauses {
                    flatten_block(&mut clause.body, hoisted);
                }
                if let Some(else_block) = &mut cond.else_block {
                    flatten_block(else_block, hoisted);
                }
                kept.push(Stmt::Condition(cond));
            }
            Stmt::While(mut w) => {
                flatten_block(&mut w.body, hoisted);
                kept.push(Stmt::While(w));
            }
            other => kept.push(other),
        }
    }
    block.statements = kept;
}

#[cfg(test)]
mod tests {
    use super::*;
    use indentc_lex::Lexer;
    use indentc_par::Parser;
    use indentc_util::StringTable;

    #[test]
    fn nested_def_is_hoisted_to_top_level() {
        let arena = bumpalo::Bump::new();
        let mut table = StringTable::new(&arena);
        let src = "def outer():\n    def inner():\n        return 1\n    return 2\nreturn outer()\n";
        let tokens = Lexer::tokenize(src).unwrap();
        let program = Parser::parse(tokens, &mut table).unwrap();
        let flattened = flatten(program);

        let names: Vec<&str> = flattened
            .functions
            .iter()
            .map(|f| table.resolve(f.name))
            .collect();
        assert!(names.contains(&"inner"));
        let outer = flattened
            .functions
            .iter()
            .find(|f| table.resolve(f.name) == "outer")
            .unwrap();
        assert_eq!(outer.body.statements.len(), 1);
    }
}
