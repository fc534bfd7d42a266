//! Shared primitives used by every stage of the compiler: interned names,
//! source positions, and re-exports of the fast-hashing collections the rest
//! of the workspace standardizes on.

mod span;
mod symbol;

pub use span::Span;
pub use symbol::{StringTable, Symbol};

pub use rustc_hash::{FxHashMap, FxHashSet};
