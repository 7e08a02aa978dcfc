//! String interner backed by a bump arena.
//!
//! Interned strings are allocated out of a [`bumpalo::Bump`] owned by the
//! `Interner` itself. The arena never shrinks or frees individual strings;
//! everything is reclaimed at once when the `Interner` is dropped, which is
//! the right tradeoff for a compiler that runs once per invocation.

use rustc_hash::FxHashMap;

use super::Symbol;

/// Owns the backing arena and the string <-> symbol mapping.
pub struct Interner {
    arena: bumpalo::Bump,
    strings: Vec<&'static str>,
    map: FxHashMap<&'static str, Symbol>,
}

impl Interner {
    /// Create a new, empty interner.
    pub fn new() -> Self {
        Self {
            arena: bumpalo::Bump::new(),
            strings: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    /// Intern `string`, returning its `Symbol`.
    ///
    /// Returns the existing symbol if `string` was interned before.
    pub fn intern(&mut self, string: &str) -> Symbol {
        if let Some(&sym) = self.map.get(string) {
            return sym;
        }

        let allocated: &str = self.arena.alloc_str(string);
        // SAFETY: the arena's chunks are heap-allocated and outlive any move
        // of `self.arena`; they stay valid until the `Interner` is dropped,
        // and `allocated` is never handed out past that point.
        let allocated: &'static str = unsafe { std::mem::transmute(allocated) };

        let symbol = Symbol(self.strings.len() as u32);
        self.strings.push(allocated);
        self.map.insert(allocated, symbol);
        symbol
    }

    /// Resolve a symbol back to its text.
    ///
    /// # Panics
    ///
    /// Panics if `symbol` was not produced by this interner.
    pub fn resolve(&self, symbol: Symbol) -> &str {
        self.strings[symbol.0 as usize]
    }

    /// Number of distinct strings interned so far.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_interner_has_no_strings() {
        let interner = Interner::new();
        assert!(interner.is_empty());
        assert_eq!(interner.len(), 0);
    }

    #[test]
    fn interning_grows_table() {
        let mut interner = Interner::new();
        interner.intern("a");
        interner.intern("b");
        interner.intern("a");
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn unicode_round_trips() {
        let mut interner = Interner::new();
        let sym = interner.intern("café");
        assert_eq!(interner.resolve(sym), "café");
    }

    #[test]
    fn long_strings_round_trip() {
        let mut interner = Interner::new();
        let long = "x".repeat(5000);
        let sym = interner.intern(&long);
        assert_eq!(interner.resolve(sym), long.as_str());
    }
}
