//! Loop evaluation
//!
//! Loop bodies never end the enclosing list: their values are discarded.
//! There is no `break` or `continue`.

use std::rc::Rc;

use super::{resolve_stack, Evaluate, FrameGuard};
use crate::ast::{ForStatement, Identifier, WhileStatement};
use crate::callstack::{CallFrame, FrameKind};
use crate::environment::BindingKind;
use crate::error::Result;
use crate::module::Module;
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════════════
// for
// ═══════════════════════════════════════════════════════════════════════

/// Run the body `count` times, each iteration in a scope binding the
/// placeholder as a const `0..count`.
pub(super) fn run_for(module: &mut Module, stmt: &ForStatement) -> Result<()> {
    let count = stmt.statement.eval(module)?.get();

    for i in 0..count.max(0) {
        let mut guard = FrameGuard::new(module);
        let scope_index = guard.push_fresh();
        guard.scopes.add_variable(
            Identifier {
                value: stmt.placeholder.clone(),
                negative: false,
                position: stmt.position,
            },
            Value(i),
            BindingKind::Const,
        );

        let frame = CallFrame::control(
            FrameKind::For,
            guard.filename(),
            stmt.position,
            scope_index,
            Rc::clone(&stmt.body),
        );
        guard.push_frame(frame);
        resolve_stack(&mut guard, &stmt.body)?;
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
// while
// ═══════════════════════════════════════════════════════════════════════

/// Run the body while the condition is truthy, re-evaluating it before
/// every iteration.
pub(super) fn run_while(module: &mut Module, stmt: &WhileStatement) -> Result<()> {
    while stmt.statement.eval(module)?.is_truthy() {
        let mut guard = FrameGuard::new(module);
        let scope_index = guard.push_fresh();
        let frame = CallFrame::control(
            FrameKind::While,
            guard.filename(),
            stmt.position,
            scope_index,
            Rc::clone(&stmt.body),
        );
        guard.push_frame(frame);
        resolve_stack(&mut guard, &stmt.body)?;
    }
    Ok(())
}
