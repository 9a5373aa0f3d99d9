//! Per-function symbol table

use crate::frontend::ast::VarId;
use std::collections::HashMap;
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Flat scope covering one function body
///
/// Blocks do not open new scopes. Declaring a name that already exists pushes
/// onto that name's shadow chain, and lookups resolve to the most recent
/// declaration.
pub struct Scope {
    names: DefaultStringInterner,
    bindings: HashMap<DefaultSymbol, Vec<VarId>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            names: DefaultStringInterner::new(),
            bindings: HashMap::new(),
        }
    }

    pub fn declare(&mut self, name: &str, id: VarId) {
        let symbol = self.names.get_or_intern(name);
        self.bindings.entry(symbol).or_default().push(id);
    }

    pub fn lookup(&self, name: &str) -> Option<VarId> {
        let symbol = self.names.get(name)?;
        self.bindings.get(&symbol)?.last().copied()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_missing() {
        let scope = Scope::new();
        assert_eq!(scope.lookup("x"), None);
    }

    #[test]
    fn test_redeclaration_shadows() {
        let mut scope = Scope::new();
        scope.declare("x", VarId(0));
        scope.declare("y", VarId(1));
        scope.declare("x", VarId(2));

        assert_eq!(scope.lookup("x"), Some(VarId(2)));
        assert_eq!(scope.lookup("y"), Some(VarId(1)));

        scope.declare("y", VarId(3));
        assert_eq!(scope.lookup("y"), Some(VarId(3)));
        assert_eq!(scope.lookup("x"), Some(VarId(2)));
    }
}
