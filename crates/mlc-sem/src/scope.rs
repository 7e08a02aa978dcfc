//! A stack of lexical scopes mapping variable names to their declared type.

use indexmap::IndexMap;
use mlc_util::Symbol;

use crate::types::Type;

/// A chain of nested scopes; the last entry is the innermost.
pub struct ScopeStack {
    scopes: Vec<IndexMap<Symbol, Type>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            scopes: vec![IndexMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
        debug_assert!(!self.scopes.is_empty(), "popped the root scope");
    }

    /// Declares `name` with `ty` in the innermost scope. Returns `false` if
    /// `name` is already declared in that same scope (shadowing an outer
    /// scope is fine; redeclaring within one is not).
    pub fn declare(&mut self, name: Symbol, ty: Type) -> bool {
        let scope = self.scopes.last_mut().expect("at least one scope");
        if scope.contains_key(&name) {
            return false;
        }
        scope.insert(name, ty);
        true
    }

    /// Looks up `name` starting from the innermost scope outward.
    pub fn lookup(&self, name: Symbol) -> Option<&Type> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&name))
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlc_util::Interner;

    #[test]
    fn redeclaration_in_same_scope_fails() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut scopes = ScopeStack::new();
        assert!(scopes.declare(x, Type::Int));
        assert!(!scopes.declare(x, Type::Float));
    }

    #[test]
    fn shadowing_in_nested_scope_succeeds() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut scopes = ScopeStack::new();
        scopes.declare(x, Type::Int);
        scopes.push_scope();
        assert!(scopes.declare(x, Type::Float));
        assert_eq!(scopes.lookup(x), Some(&Type::Float));
        scopes.pop_scope();
        assert_eq!(scopes.lookup(x), Some(&Type::Int));
    }

    #[test]
    fn lookup_misses_after_scope_exit() {
        let mut interner = Interner::new();
        let y = interner.intern("y");
        let mut scopes = ScopeStack::new();
        scopes.push_scope();
        scopes.declare(y, Type::Bool);
        scopes.pop_scope();
        assert_eq!(scopes.lookup(y), None);
    }
}
