//! Binding store: the scope stack of a module
//!
//! Lookup walks from the innermost scope outwards and the first match
//! wins. Imported modules are inserted at the bottom so local names always
//! shadow them.

mod namespace;
mod scope;

pub use namespace::{Namespace, Namespaces};
pub use scope::{Binding, BindingKind, Scope, ScopeRef};

use std::rc::Rc;

use crate::ast::Identifier;
use crate::block::Block;
use crate::value::Value;

/// A variable found on the stack, with the facts the mutability policy
/// needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableLookup {
    /// Current value
    pub value: Value,

    /// Mutability class of the binding
    pub kind: BindingKind,

    /// Owning scope came from an import
    pub foreign: bool,

    /// Owning scope forbids reassignment
    pub immutable: bool,

    /// Owning scope is not the innermost one
    pub outer: bool,

    /// Index of the owning scope, bottom is `0`
    pub depth: usize,
}

/// A block found on the stack.
#[derive(Debug, Clone)]
pub struct BlockLookup {
    /// The declaration
    pub block: Rc<Block>,

    /// Owning scope came from an import
    pub foreign: bool,

    /// Owning scope is not the innermost one
    pub outer: bool,
}

/// Verdict of [`ScopeStack::is_updatable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReport {
    /// Assignment may proceed
    Ok,
    /// No such binding
    NotFound,
    /// Const binding or immutable scope
    Immutable,
    /// Binding belongs to an imported module
    Foreign,
}

/// The runtime scope stack.
///
/// Never empty: the root scope can not be popped.
///
/// # Example
///
/// ```
/// use bir::environment::{BindingKind, ScopeStack};
/// use bir::ast::Identifier;
/// use bir::Value;
///
/// let mut scopes = ScopeStack::new();
/// scopes.add_variable(Identifier::synthetic("x"), Value(1), BindingKind::Mutable);
///
/// scopes.push_fresh();
/// scopes.add_variable(Identifier::synthetic("x"), Value(10), BindingKind::Mutable);
/// assert_eq!(scopes.find_variable("x").map(|v| v.value), Some(Value(10)));
///
/// scopes.pop_scope();
/// assert_eq!(scopes.find_variable("x").map(|v| v.value), Some(Value(1)));
/// ```
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<ScopeRef>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// Create a stack holding one empty root scope.
    pub fn new() -> Self {
        Self::with_root(Scope::new().into_ref())
    }

    /// Create a stack over an existing root scope.
    pub fn with_root(root: ScopeRef) -> Self {
        Self { scopes: vec![root] }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Scope Entry/Exit
    // ═══════════════════════════════════════════════════════════════════

    /// Push a scope and return its index.
    pub fn push_scope(&mut self, scope: ScopeRef) -> usize {
        self.scopes.push(scope);
        self.scopes.len() - 1
    }

    /// Push an empty scope and return its index.
    pub fn push_fresh(&mut self) -> usize {
        self.push_scope(Scope::new().into_ref())
    }

    /// Pop the innermost scope, handing it back to the caller.
    ///
    /// Returns `None` instead of popping the root scope.
    pub fn pop_scope(&mut self) -> Option<ScopeRef> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    /// Insert a scope below every other scope.
    pub fn insert_scope_at_bottom(&mut self, scope: ScopeRef) {
        self.scopes.insert(0, scope);
    }

    /// The innermost scope.
    pub fn current(&self) -> &ScopeRef {
        &self.scopes[self.scopes.len() - 1]
    }

    /// The scope at `index`, bottom is `0`.
    pub fn get(&self, index: usize) -> Option<&ScopeRef> {
        self.scopes.get(index)
    }

    /// Number of scopes on the stack.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    fn top_index(&self) -> usize {
        self.scopes.len() - 1
    }

    // ═══════════════════════════════════════════════════════════════════
    // Variables
    // ═══════════════════════════════════════════════════════════════════

    /// Bind a variable in the innermost scope.
    pub fn add_variable(&mut self, identifier: Identifier, value: Value, kind: BindingKind) {
        self.current()
            .borrow_mut()
            .insert(Binding::new(identifier, value, kind));
    }

    /// Whether any scope binds `name`.
    pub fn variable_exists(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.borrow().contains(name))
    }

    /// Find the innermost binding of `name`.
    pub fn find_variable(&self, name: &str) -> Option<VariableLookup> {
        let top = self.top_index();
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(depth, scope)| {
                let scope = scope.borrow();
                scope.get(name).map(|binding| VariableLookup {
                    value: binding.value,
                    kind: binding.kind,
                    foreign: scope.foreign,
                    immutable: scope.immutable,
                    outer: depth != top,
                    depth,
                })
            })
    }

    /// Whether `name` may be declared in the innermost scope.
    ///
    /// Shadowing an outer binding is allowed; a second declaration in the
    /// same scope is not.
    pub fn can_declare(&self, name: &str) -> bool {
        match self.find_variable(name) {
            Some(lookup) => lookup.outer,
            None => true,
        }
    }

    /// Classify an assignment to `name`.
    ///
    /// Order matters: a const or immutable binding in an outer scope skips
    /// the `Immutable` verdict but is still subject to the foreign check.
    pub fn is_updatable(&self, name: &str) -> UpdateReport {
        let Some(lookup) = self.find_variable(name) else {
            return UpdateReport::NotFound;
        };

        if (lookup.immutable || lookup.kind == BindingKind::Const) && !lookup.outer {
            return UpdateReport::Immutable;
        }
        if lookup.foreign {
            return UpdateReport::Foreign;
        }
        UpdateReport::Ok
    }

    /// Overwrite the innermost binding of `name`.
    ///
    /// Returns `false` if there is no such binding. Callers check
    /// [`is_updatable`](Self::is_updatable) first.
    pub fn update_variable(&mut self, name: &str, value: Value) -> bool {
        self.scopes
            .iter()
            .rev()
            .any(|scope| scope.borrow_mut().set(name, value))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Blocks
    // ═══════════════════════════════════════════════════════════════════

    /// Declare a block in the innermost scope.
    pub fn add_block(&mut self, block: Rc<Block>) {
        self.current().borrow_mut().insert_block(block);
    }

    /// Whether any scope declares a block called `name`.
    pub fn block_exists(&self, name: &str) -> bool {
        self.scopes
            .iter()
            .any(|scope| scope.borrow().block(name).is_some())
    }

    /// Find the innermost block called `name`.
    pub fn find_block(&self, name: &str) -> Option<BlockLookup> {
        let top = self.top_index();
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(depth, scope)| {
                let scope = scope.borrow();
                scope.block(name).map(|block| BlockLookup {
                    block: Rc::clone(block),
                    foreign: scope.foreign,
                    outer: depth != top,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockKind, ModuleId};

    fn var(name: &str) -> Identifier {
        Identifier::synthetic(name)
    }

    #[test]
    fn test_root_is_never_popped() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.pop_scope().is_none());
        assert_eq!(scopes.len(), 1);
    }

    #[test]
    fn test_pop_returns_scope() {
        let mut scopes = ScopeStack::new();
        scopes.push_fresh();
        scopes.add_variable(var("x"), Value(5), BindingKind::Mutable);
        let popped = scopes.pop_scope().unwrap();
        assert!(popped.borrow().contains("x"));
        assert!(!scopes.variable_exists("x"));
    }

    #[test]
    fn test_shadowing_is_allowed_but_redeclaration_is_not() {
        let mut scopes = ScopeStack::new();
        scopes.add_variable(var("x"), Value(1), BindingKind::Mutable);
        assert!(!scopes.can_declare("x"));

        scopes.push_fresh();
        assert!(scopes.can_declare("x"));
        scopes.add_variable(var("x"), Value(2), BindingKind::Mutable);
        assert!(!scopes.can_declare("x"));
    }

    #[test]
    fn test_lookup_facts() {
        let mut scopes = ScopeStack::new();
        scopes.add_variable(var("x"), Value(1), BindingKind::Const);
        scopes.push_fresh();

        let lookup = scopes.find_variable("x").unwrap();
        assert_eq!(lookup.value, Value(1));
        assert_eq!(lookup.kind, BindingKind::Const);
        assert!(lookup.outer);
        assert!(!lookup.foreign);
        assert_eq!(lookup.depth, 0);
    }

    #[test]
    fn test_const_in_current_scope_is_immutable() {
        let mut scopes = ScopeStack::new();
        scopes.add_variable(var("x"), Value(1), BindingKind::Const);
        assert_eq!(scopes.is_updatable("x"), UpdateReport::Immutable);
    }

    #[test]
    fn test_outer_const_is_updatable() {
        let mut scopes = ScopeStack::new();
        scopes.add_variable(var("x"), Value(1), BindingKind::Const);
        scopes.push_fresh();
        assert_eq!(scopes.is_updatable("x"), UpdateReport::Ok);
        assert!(scopes.update_variable("x", Value(2)));
        scopes.pop_scope();
        assert_eq!(scopes.find_variable("x").map(|v| v.value), Some(Value(2)));
    }

    #[test]
    fn test_foreign_layer_is_not_updatable() {
        let mut exported = Scope::new();
        exported.insert(Binding::new(var("pi"), Value(3), BindingKind::Mutable));

        let mut scopes = ScopeStack::new();
        scopes.insert_scope_at_bottom(exported.exported().into_ref());
        assert_eq!(scopes.is_updatable("pi"), UpdateReport::Foreign);
        assert_eq!(scopes.find_variable("pi").map(|v| v.value), Some(Value(3)));
    }

    #[test]
    fn test_missing_variable() {
        let scopes = ScopeStack::new();
        assert_eq!(scopes.is_updatable("nope"), UpdateReport::NotFound);
        let mut scopes = scopes;
        assert!(!scopes.update_variable("nope", Value(1)));
    }

    #[test]
    fn test_local_shadows_import() {
        let mut exported = Scope::new();
        exported.insert(Binding::constant("x", Value(100)));

        let mut scopes = ScopeStack::new();
        scopes.add_variable(var("x"), Value(1), BindingKind::Mutable);
        scopes.insert_scope_at_bottom(exported.exported().into_ref());

        let lookup = scopes.find_variable("x").unwrap();
        assert_eq!(lookup.value, Value(1));
        assert!(!lookup.foreign);
        assert_eq!(scopes.is_updatable("x"), UpdateReport::Ok);
    }

    #[test]
    fn test_update_hits_innermost() {
        let mut scopes = ScopeStack::new();
        scopes.add_variable(var("x"), Value(1), BindingKind::Mutable);
        scopes.push_fresh();
        scopes.add_variable(var("x"), Value(2), BindingKind::Mutable);
        scopes.update_variable("x", Value(3));
        scopes.pop_scope();
        assert_eq!(scopes.find_variable("x").map(|v| v.value), Some(Value(1)));
    }

    #[test]
    fn test_blocks() {
        let block = Rc::new(Block::new(
            var("main"),
            ModuleId::new(1),
            BlockKind::Plain {
                arguments: Vec::new(),
                verbs: Vec::new(),
                program: Rc::from(Vec::new()),
            },
            Scope::new().into_ref(),
        ));

        let mut scopes = ScopeStack::new();
        scopes.add_block(block);
        scopes.push_fresh();

        assert!(scopes.block_exists("main"));
        let lookup = scopes.find_block("main").unwrap();
        assert!(lookup.outer);
        assert!(!lookup.foreign);
        assert!(scopes.find_block("other").is_none());
    }
}
