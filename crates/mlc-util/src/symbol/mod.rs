//! Symbol module - string interning for identifiers, keywords, and literals.
//!
//! [`Symbol`] is a compact (4-byte) handle into an [`Interner`]. Interning
//! avoids repeated heap allocations for the same identifier and makes symbol
//! comparison an O(1) integer comparison instead of a string comparison.
//!
//! Unlike a global interner, an [`Interner`] is owned by whoever is running a
//! compilation (the driver's `Session`, or a REPL loop) - MiniLang has no
//! concurrency model, so there is no need for a process-wide, thread-safe
//! table.
//!
//! # Examples
//!
//! ```
//! use mlc_util::symbol::Interner;
//!
//! let mut interner = Interner::new();
//! let a = interner.intern("total");
//! let b = interner.intern("total");
//! let c = interner.intern("count");
//!
//! assert_eq!(a, b);
//! assert_ne!(a, c);
//! assert_eq!(interner.resolve(a), "total");
//! ```

mod interner;

pub use interner::Interner;

/// An interned string identifier.
///
/// `Symbol` is `Copy`, 4 bytes, and cheap to pass around AST/IR nodes. To
/// recover the text, resolve it against the [`Interner`] that produced it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(pub(crate) u32);

impl Symbol {
    /// Raw index into the owning interner's string table.
    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

impl crate::index_vec::Idx for Symbol {
    fn from_usize(idx: usize) -> Self {
        assert!(idx <= u32::MAX as usize);
        Symbol(idx as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_same_string_returns_same_symbol() {
        let mut interner = Interner::new();
        let a = interner.intern("hello");
        let b = interner.intern("hello");
        assert_eq!(a, b);
    }

    #[test]
    fn intern_different_strings_returns_different_symbols() {
        let mut interner = Interner::new();
        let a = interner.intern("hello");
        let b = interner.intern("world");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_round_trips() {
        let mut interner = Interner::new();
        let sym = interner.intern("factorial");
        assert_eq!(interner.resolve(sym), "factorial");
    }

    #[test]
    fn debug_shows_raw_index() {
        let mut interner = Interner::new();
        let sym = interner.intern("x");
        assert_eq!(format!("{:?}", sym), format!("Symbol({})", sym.as_u32()));
    }
}
