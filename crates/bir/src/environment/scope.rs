//! A single scope: bindings, blocks and the two scope-wide flags

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::Identifier;
use crate::block::Block;
use crate::value::Value;

/// Shared handle to a scope.
///
/// Block instances are aliased by implementing blocks and pushed onto the
/// scope stack for the duration of a call, so every holder sees the same
/// storage.
pub type ScopeRef = Rc<RefCell<Scope>>;

/// Whether a binding may be reassigned from its own scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `let`
    Mutable,
    /// `const`, parameters, loop placeholders, populated values
    Const,
}

/// A single variable binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The binding's name, with the position of its declaration
    pub identifier: Identifier,

    /// The bound value
    pub value: Value,

    /// Mutability class
    pub kind: BindingKind,
}

impl Binding {
    /// Create a binding.
    pub fn new(identifier: Identifier, value: Value, kind: BindingKind) -> Self {
        Self {
            identifier,
            value,
            kind,
        }
    }

    /// Create a const binding with no source position.
    pub fn constant(name: impl Into<String>, value: Value) -> Self {
        Self::new(Identifier::synthetic(name), value, BindingKind::Const)
    }

    /// The binding's name.
    pub fn name(&self) -> &str {
        self.identifier.name()
    }
}

/// An ordered frame of bindings plus the blocks declared alongside them.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// No binding of this scope may be reassigned
    pub immutable: bool,

    /// Imported from another module
    pub foreign: bool,

    frame: IndexMap<String, Binding>,
    blocks: IndexMap<String, Rc<Block>>,
}

impl Scope {
    /// Create an empty, mutable, local scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the scope in a shared handle.
    pub fn into_ref(self) -> ScopeRef {
        Rc::new(RefCell::new(self))
    }

    /// Copy of this scope's bindings and blocks as an import layer.
    pub fn exported(&self) -> Scope {
        Scope {
            immutable: true,
            foreign: true,
            frame: self.frame.clone(),
            blocks: self.blocks.clone(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Bindings
    // ═══════════════════════════════════════════════════════════════════

    /// Insert a binding, replacing any binding of the same name.
    pub fn insert(&mut self, binding: Binding) {
        self.frame.insert(binding.name().to_string(), binding);
    }

    /// Look up a binding.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.frame.get(name)
    }

    /// Overwrite the value of an existing binding.
    ///
    /// Returns `false` if there is no such binding.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.frame.get_mut(name) {
            Some(binding) => {
                binding.value = value;
                true
            }
            None => false,
        }
    }

    /// Whether a binding with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.frame.contains_key(name)
    }

    /// Bindings in insertion order.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.frame.values()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    /// Whether the scope has no bindings.
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Blocks
    // ═══════════════════════════════════════════════════════════════════

    /// Declare a block in this scope.
    pub fn insert_block(&mut self, block: Rc<Block>) {
        self.blocks.insert(block.name().to_string(), block);
    }

    /// Look up a block declared in this scope.
    pub fn block(&self, name: &str) -> Option<&Rc<Block>> {
        self.blocks.get(name)
    }
}
