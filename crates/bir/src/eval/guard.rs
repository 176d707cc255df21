//! RAII guard for scope and frame cleanup

use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::callstack::CallFrame;
use crate::environment::ScopeRef;
use crate::module::Module;

/// Guard that pops everything pushed through it when dropped.
///
/// The guard derefs to the module, so evaluation continues through it.
/// Results are computed while the guard is alive and the pops run
/// whether they are `Ok` or `Err`.
pub(crate) struct FrameGuard<'a> {
    module: &'a mut Module,
    scopes: usize,
    frame: bool,
}

impl<'a> FrameGuard<'a> {
    /// Guard over `module` that has pushed nothing yet.
    pub(crate) fn new(module: &'a mut Module) -> Self {
        Self {
            module,
            scopes: 0,
            frame: false,
        }
    }

    /// Push a scope and return its index.
    pub(crate) fn push_scope(&mut self, scope: ScopeRef) -> usize {
        self.scopes += 1;
        self.module.scopes.push_scope(scope)
    }

    /// Push an empty scope and return its index.
    pub(crate) fn push_fresh(&mut self) -> usize {
        self.scopes += 1;
        self.module.scopes.push_fresh()
    }

    /// Push the guarded frame. A guard holds at most one frame.
    pub(crate) fn push_frame(&mut self, frame: CallFrame) {
        debug_assert!(!self.frame, "frame guard already holds a frame");
        trace!(label = %frame.label, depth = self.module.callstack.depth(), "frame pushed");
        self.frame = true;
        self.module.callstack.push(frame);
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        if self.frame {
            if let Some(frame) = self.module.callstack.pop() {
                trace!(label = %frame.label, "frame popped");
            }
        }
        for _ in 0..self.scopes {
            self.module.scopes.pop_scope();
        }
    }
}

impl Deref for FrameGuard<'_> {
    type Target = Module;

    fn deref(&self) -> &Self::Target {
        self.module
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.module
    }
}
