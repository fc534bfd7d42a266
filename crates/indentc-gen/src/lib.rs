//! Code generation: lowers a parsed, flattened [`indentc_par::ast::Program`]
//! into GNU-syntax x86-64 assembly text.
//!
//! `flatten` hoists every nested `def` to the top level first (see its module
//! docs); `codegen` then walks the flat program with a shadow-stack discipline
//! for locals and intermediate expression results.

mod codegen;
mod emitter;
mod error;
pub mod flatten;

pub use codegen::CodeGen;
pub use emitter::Emitter;
pub use error::{CodeGenError, Result};

use indentc_par::ast::Program;
use indentc_util::StringTable;

/// Flattens and lowers `program` in one call; the entry point the driver
/// uses for `--compile` mode.
pub fn generate(program: Program, strings: &StringTable<'_>) -> Result<String> {
    let program = flatten::flatten(program);
    CodeGen::generate(&program, strings)
}
