//! Resolved block declarations
//!
//! A block is plain (a statement body), native (a host function) or
//! implementing (an alias of another block that shares its instance).
//! Every block owns an instance scope that persists across calls; an
//! implementing block holds the same handle as its target.

use std::fmt;
use std::rc::Rc;

use crate::ast::{Body, Identifier};
use crate::environment::ScopeRef;
use crate::native::NativeFn;

/// Identity of a module instance, used to route foreign block calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(u64);

impl ModuleId {
    /// Wrap a raw id. Ids are handed out by [`crate::Host`].
    pub(crate) const fn new(raw: u64) -> Self {
        ModuleId(raw)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What running a block means.
#[derive(Debug, Clone)]
pub enum BlockKind {
    /// Tree-walked body
    Plain {
        /// Positional parameters
        arguments: Vec<Identifier>,
        /// Named special parameters
        verbs: Vec<Identifier>,
        /// Statements run per call
        program: Body,
    },

    /// Host function
    Native(NativeFn),

    /// Alias of another block's behavior and instance
    Implementing {
        /// The implemented block
        target: Rc<Block>,
    },
}

/// A declared block.
#[derive(Debug, Clone)]
pub struct Block {
    name: Identifier,
    owner: ModuleId,
    kind: BlockKind,
    instance: ScopeRef,
}

impl Block {
    /// Create a block.
    pub fn new(name: Identifier, owner: ModuleId, kind: BlockKind, instance: ScopeRef) -> Self {
        Self {
            name,
            owner,
            kind,
            instance,
        }
    }

    /// The block's name.
    pub fn name(&self) -> &str {
        self.name.name()
    }

    /// Module that declared the block.
    pub fn owner(&self) -> ModuleId {
        self.owner
    }

    /// Plain, native or implementing.
    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    /// Persistent storage shared by every call.
    pub fn instance(&self) -> &ScopeRef {
        &self.instance
    }
}
