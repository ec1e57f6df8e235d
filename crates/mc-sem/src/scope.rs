//! Symbol table: an arena-indexed tree of lexical scopes (§3, §4.2).
//!
//! Grounded on the arena-of-ribs pattern: "current scope" is an index into
//! a flat [`IndexVec`], not a parent-pointer reference, so the tree has no
//! cyclic ownership and scopes can be walked or retained after the visitor
//! that created them has moved on.

use indexmap::IndexMap;
use mc_util::{define_idx, index_vec::Idx, IndexVec};

use crate::types::Type;

define_idx!(ScopeId);

#[derive(Clone, Debug, PartialEq)]
pub enum Symbol {
    Variable {
        name: String,
        ty: Type,
        line: u32,
        column: u32,
        is_constant: bool,
        is_initialized: bool,
    },
    Function {
        name: String,
        return_type: Type,
        params: Vec<(String, Type)>,
        line: u32,
        column: u32,
    },
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Variable { name, .. } => name,
            Symbol::Function { name, .. } => name,
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            Symbol::Variable { ty, .. } => *ty,
            Symbol::Function { return_type, .. } => *return_type,
        }
    }
}

struct ScopeNode {
    #[allow(dead_code)] // kept for debugging/introspection, mirrors the teacher's RibKind field
    name: String,
    bindings: IndexMap<String, Symbol>,
    parent: Option<ScopeId>,
}

pub struct SymbolTable {
    scopes: IndexVec<ScopeId, ScopeNode>,
    current: ScopeId,
}

impl SymbolTable {
    /// A fresh table with the pre-populated `"global"` root scope (§6.5).
    pub fn new() -> Self {
        let mut scopes = IndexVec::new();
        let root = scopes.push(ScopeNode {
            name: "global".to_string(),
            bindings: IndexMap::new(),
            parent: None,
        });
        let mut table = Self { scopes, current: root };

        table.define(Symbol::Function {
            name: "print".to_string(),
            return_type: Type::Void,
            params: vec![("s".to_string(), Type::String)],
            line: 0,
            column: 0,
        });
        table.define(Symbol::Function {
            name: "println".to_string(),
            return_type: Type::Void,
            params: vec![("s".to_string(), Type::String)],
            line: 0,
            column: 0,
        });
        table.define(Symbol::Function {
            name: "toString".to_string(),
            return_type: Type::String,
            params: vec![("n".to_string(), Type::I32)],
            line: 0,
            column: 0,
        });

        table
    }

    pub fn enter_scope(&mut self, name: impl Into<String>) -> ScopeId {
        let id = self.scopes.push(ScopeNode {
            name: name.into(),
            bindings: IndexMap::new(),
            parent: Some(self.current),
        });
        self.current = id;
        id
    }

    /// A no-op at the root scope, matching the invariant that scope
    /// lifetime is strictly nested and the root is never popped.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    /// Inserts into the current scope. Returns `false` (without modifying
    /// the table) iff the name is already bound in this scope — callers
    /// turn that into a `REDEFINED_SYMBOL` diagnostic.
    pub fn define(&mut self, symbol: Symbol) -> bool {
        let scope = &mut self.scopes[self.current];
        if scope.bindings.contains_key(symbol.name()) {
            return false;
        }
        scope.bindings.insert(symbol.name().to_string(), symbol);
        true
    }

    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        let mut id = self.current;
        loop {
            let scope = &self.scopes[id];
            if let Some(sym) = scope.bindings.get(name) {
                return Some(sym);
            }
            match scope.parent {
                Some(parent) => id = parent,
                None => return None,
            }
        }
    }

    pub fn resolve_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes[self.current].bindings.get(name)
    }

    /// Marks a variable initialized wherever in the scope chain it is
    /// bound (used after an assignment statement). No-op if `name` does
    /// not resolve to a `Variable`.
    pub fn mark_initialized(&mut self, name: &str) {
        let mut id = self.current;
        loop {
            let scope = &mut self.scopes[id];
            if let Some(Symbol::Variable { is_initialized, .. }) = scope.bindings.get_mut(name) {
                *is_initialized = true;
                return;
            }
            match scope.parent {
                Some(parent) => id = parent,
                None => return,
            }
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, ty: Type) -> Symbol {
        Symbol::Variable {
            name: name.to_string(),
            ty,
            line: 1,
            column: 1,
            is_constant: false,
            is_initialized: true,
        }
    }

    #[test]
    fn global_scope_has_the_three_builtins() {
        let table = SymbolTable::new();
        assert!(table.resolve("print").is_some());
        assert!(table.resolve("println").is_some());
        assert!(table.resolve("toString").is_some());
    }

    #[test]
    fn define_rejects_duplicate_name_in_same_scope() {
        let mut table = SymbolTable::new();
        assert!(table.define(var("x", Type::I32)));
        assert!(!table.define(var("x", Type::F32)));
    }

    #[test]
    fn resolve_walks_up_the_parent_chain() {
        let mut table = SymbolTable::new();
        table.define(var("outer", Type::I32));
        table.enter_scope("block");
        assert!(table.resolve("outer").is_some());
        assert!(table.resolve_local("outer").is_none());
    }

    #[test]
    fn shadowing_then_exit_restores_outer_symbol() {
        let mut table = SymbolTable::new();
        table.define(var("x", Type::I32));
        table.enter_scope("block");
        table.define(var("x", Type::F64));
        assert_eq!(table.resolve("x").unwrap().ty(), Type::F64);
        table.exit_scope();
        assert_eq!(table.resolve("x").unwrap().ty(), Type::I32);
    }

    #[test]
    fn exit_scope_on_root_is_a_no_op() {
        let mut table = SymbolTable::new();
        table.exit_scope();
        table.exit_scope();
        assert!(table.resolve("print").is_some());
    }

    #[test]
    fn mark_initialized_affects_resolve() {
        let mut table = SymbolTable::new();
        table.define(Symbol::Variable {
            name: "x".to_string(),
            ty: Type::I32,
            line: 1,
            column: 1,
            is_constant: false,
            is_initialized: false,
        });
        table.mark_initialized("x");
        let Symbol::Variable { is_initialized, .. } = table.resolve("x").unwrap() else { panic!() };
        assert!(is_initialized);
    }
}
