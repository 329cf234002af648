use std::collections::HashMap;

use la_arena::{Arena, Idx};
use smallvec::SmallVec;

use crate::errors::SymbolError;
use crate::ir::{FnId, VarId};
use crate::types::Type;

pub type ScopeId = Idx<Scope>;

pub type Overloads = SmallVec<[FnId; 4]>;

#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Variable(VarId),
    Functions(Overloads),
    Type(Type),
    EnumValue(i64),
}

#[derive(Debug, Default)]
pub struct Scope {
    parent: Option<ScopeId>,
    symbols: HashMap<String, Symbol>,
}

#[derive(Debug)]
pub struct SymbolTable {
    scopes: Arena<Scope>,
    root: ScopeId,
    current: ScopeId,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut scopes = Arena::new();
        let root = scopes.alloc(Scope::default());
        Self {
            scopes,
            root,
            current: root,
        }
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    pub fn push_scope(&mut self) -> ScopeId {
        let scope = self.scopes.alloc(Scope {
            parent: Some(self.current),
            symbols: HashMap::new(),
        });
        self.current = scope;
        scope
    }

    /// Returns to the enclosing scope. Popping the root is a no-op.
    pub fn pop_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    /// Adds a non-function symbol to the current scope.
    ///
    /// A variable may take over the name of a struct type declared in the
    /// same scope (`struct foo { ... } foo;`); any other collision fails.
    pub fn declare(&mut self, name: &str, symbol: Symbol) -> Result<(), SymbolError> {
        let scope = &mut self.scopes[self.current];
        let free = match scope.symbols.get(name) {
            None => true,
            Some(Symbol::Type(Type::Struct(_))) => matches!(symbol, Symbol::Variable(_)),
            Some(_) => false,
        };
        if !free {
            return Err(SymbolError::AlreadyDefined(name.to_string()));
        }
        scope.symbols.insert(name.to_string(), symbol);
        Ok(())
    }

    /// Adds `function` to the overload set of `name` in the current scope.
    pub fn declare_function(&mut self, name: &str, function: FnId) -> Result<(), SymbolError> {
        let scope = &mut self.scopes[self.current];
        match scope.symbols.get_mut(name) {
            None => {
                let mut overloads = Overloads::new();
                overloads.push(function);
                scope
                    .symbols
                    .insert(name.to_string(), Symbol::Functions(overloads));
                Ok(())
            }
            Some(Symbol::Functions(overloads)) => {
                overloads.push(function);
                Ok(())
            }
            Some(_) => Err(SymbolError::AlreadyDefined(name.to_string())),
        }
    }

    /// Innermost visible symbol named `name`.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scope_chain()
            .find_map(|scope| self.scopes[scope].symbols.get(name))
    }

    /// Every visible overload of `name`, innermost scope first.
    pub fn overloads(&self, name: &str) -> Overloads {
        let mut all = Overloads::new();
        for scope in self.scope_chain() {
            if let Some(Symbol::Functions(overloads)) = self.scopes[scope].symbols.get(name) {
                all.extend(overloads.iter().copied());
            }
        }
        all
    }

    fn scope_chain(&self) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(self.current), move |scope| {
            self.scopes[*scope].parent
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, StructType, INT};
    use crate::ir::{FunctionDecl, Variable};
    use std::sync::Arc;

    fn ids() -> (VarId, VarId, FnId, FnId) {
        let mut vars: Arena<Variable> = Arena::new();
        let mut fns: Arena<FunctionDecl> = Arena::new();
        let a = vars.alloc(Variable::local("a", INT, 1));
        let b = vars.alloc(Variable::local("b", INT, 1));
        let f = fns.alloc(FunctionDecl::new("f", Type::Void, 1));
        let g = fns.alloc(FunctionDecl::new("f", INT, 1));
        (a, b, f, g)
    }

    #[test]
    fn redeclaring_in_same_scope_fails_but_shadowing_works() {
        let (a, b, _, _) = ids();
        let mut table = SymbolTable::new();
        table.declare("x", Symbol::Variable(a)).expect("first declaration");
        assert_eq!(
            table.declare("x", Symbol::Variable(b)),
            Err(SymbolError::AlreadyDefined("x".to_string()))
        );
        table.push_scope();
        table.declare("x", Symbol::Variable(b)).expect("shadowing");
        assert_eq!(table.lookup("x"), Some(&Symbol::Variable(b)));
        table.pop_scope();
        assert_eq!(table.lookup("x"), Some(&Symbol::Variable(a)));
    }

    #[test]
    fn variable_replaces_struct_of_same_name() {
        let (a, _, _, _) = ids();
        let mut table = SymbolTable::new();
        let foo = Type::Struct(Arc::new(StructType {
            name: "foo".to_string(),
            fields: vec![Field {
                modifiers: Default::default(),
                name: "x".to_string(),
                ty: INT,
            }],
            is_interface_block: false,
        }));
        table.declare("foo", Symbol::Type(foo)).expect("struct");
        table.declare("foo", Symbol::Variable(a)).expect("variable");
        assert_eq!(table.lookup("foo"), Some(&Symbol::Variable(a)));
    }

    #[test]
    fn overloads_gather_across_scopes() {
        let (_, _, f, g) = ids();
        let mut table = SymbolTable::new();
        table.declare_function("f", f).expect("root overload");
        table.push_scope();
        table.declare_function("f", g).expect("inner overload");
        assert_eq!(table.overloads("f").as_slice(), &[g, f]);
    }
}
