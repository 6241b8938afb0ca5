//! Scoped symbol tables.
//!
//! Scopes form a tree linked parent-wards: the program introduces the global
//! scope (pre-seeded with the I/O builtins by the analyzer), and every
//! procedure or function body opens a child scope. Lookup walks outward; a
//! name may shadow an outer binding but not collide within one scope.
//!
//! Names are compared case-insensitively: the map key is the lower-cased
//! name, while each [`Symbol`] keeps the original spelling for diagnostics
//! and TAC output.

use indexmap::IndexMap;

use pasc_par::PassMode;

use crate::types::Type;

/// Index of a scope in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

/// A named entity visible in some scope.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Original spelling, as declared.
    pub name: String,
    pub kind: SymbolKind,
}

/// What a symbol is, with its category-specific payload.
#[derive(Debug, Clone)]
pub enum SymbolKind {
    /// A declared variable.
    Variable(Type),
    /// A formal parameter with its pass mode.
    Param(Type, PassMode),
    /// A declared procedure.
    Procedure(Signature),
    /// A declared function, or the function's own return slot inside its
    /// body scope (both carry the full signature so recursive calls check).
    Function(Signature),
    /// One of the seeded I/O builtins.
    Builtin(Builtin),
    /// A `for` control variable, re-bound for the duration of the loop body.
    /// Always integer; assignment to it is rejected.
    LoopIndex,
}

/// The ordered formal list of a callable, plus the return type for
/// functions.
#[derive(Debug, Clone)]
pub struct Signature {
    pub formals: Vec<(Type, PassMode)>,
    pub ret: Option<Type>,
}

/// The seeded I/O builtins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Write,
    Writeln,
    Read,
    Readln,
}

/// A single scope: insertion-ordered bindings plus a parent link.
#[derive(Debug)]
struct Scope {
    symbols: IndexMap<String, Symbol>,
    parent: Option<ScopeId>,
}

/// The scope tree, with a cursor at the scope currently being analyzed.
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeTree {
    /// Create a tree containing only the (empty) global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                symbols: IndexMap::new(),
                parent: None,
            }],
            current: ScopeId(0),
        }
    }

    /// Open a child of the current scope and move into it.
    pub fn enter_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            symbols: IndexMap::new(),
            parent: Some(self.current),
        });
        self.current = id;
        id
    }

    /// Move back to the parent scope. The child stays allocated; symbols
    /// live as long as the tree.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.0].parent {
            self.current = parent;
        }
    }

    /// Bind `symbol` in the current scope.
    ///
    /// Fails when the (case-folded) name is already bound in this scope;
    /// shadowing an outer binding is fine.
    pub fn declare(&mut self, symbol: Symbol) -> Result<(), ()> {
        let key = symbol.name.to_ascii_lowercase();
        let scope = &mut self.scopes[self.current.0];
        if scope.symbols.contains_key(&key) {
            return Err(());
        }
        scope.symbols.insert(key, symbol);
        Ok(())
    }

    /// Resolve `name` starting at the current scope and walking outward.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        let key = name.to_ascii_lowercase();
        let mut scope_id = self.current;
        loop {
            let scope = &self.scopes[scope_id.0];
            if let Some(symbol) = scope.symbols.get(&key) {
                return Some(symbol);
            }
            scope_id = scope.parent?;
        }
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
