//! Interned identifier names.
//!
//! Variable and function names are looked up by equality constantly during
//! parsing (declared-name sets, function tables) and walked again during code
//! generation. Interning them once turns every later comparison into a `u32`
//! equality check instead of a string compare, and lets the AST carry a `Copy`
//! handle instead of cloning `String`s at every node.
//!
//! The table owns the backing storage in a [`bumpalo::Bump`] arena so that
//! `&'static str` slices handed out by [`StringTable::resolve`] stay valid for
//! the table's own lifetime without extra reference counting.

use rustc_hash::FxHashMap;

/// A handle to an interned string. Cheap to copy, compare, and hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    fn from_index(index: usize) -> Self {
        Symbol(index as u32)
    }

    fn as_index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Owns interned identifier text for one compilation.
///
/// A single `StringTable` is created per driver invocation and threaded
/// through the parser; nothing about it needs to be shared across threads
/// since the whole pipeline is single-threaded (see the crate-level
/// concurrency contract).
pub struct StringTable<'arena> {
    arena: &'arena bumpalo::Bump,
    index: FxHashMap<&'arena str, Symbol>,
    strings: Vec<&'arena str>,
}

impl<'arena> StringTable<'arena> {
    pub fn new(arena: &'arena bumpalo::Bump) -> Self {
        StringTable {
            arena,
            index: FxHashMap::default(),
            strings: Vec::new(),
        }
    }

    /// Interns `text`, returning the existing symbol if already known.
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(&sym) = self.index.get(text) {
            return sym;
        }
        let copied: &'arena str = self.arena.alloc_str(text);
        let sym = Symbol::from_index(self.strings.len());
        self.strings.push(copied);
        self.index.insert(copied, sym);
        sym
    }

    /// Resolves a symbol back to its text. Panics on a symbol from a
    /// different table — that would be a compiler-internal bug, not a user
    /// facing error, so it is not modeled as a `Result`.
    pub fn resolve(&self, symbol: Symbol) -> &'arena str {
        self.strings[symbol.as_index()]
    }
}
