//! Statement evaluation

use std::rc::Rc;

use crate::ast::{Body, Position, Statement};
use crate::callstack::{CallFrame, FrameKind};
use crate::error::{ErrorKind, Result};
use crate::module::Module;
use crate::value::Value;

use super::control::Flow;
use super::{assign, if_expr, item, local, loops, namespace, switch};
use super::{Evaluate, FrameGuard};

/// Run a statement list in the current frame.
///
/// Returns the value of the first terminating statement, or
/// [`Value::NONE`] when the list runs off its end.
///
/// # Errors
///
/// Returns the first fatal error raised by a statement.
pub fn resolve_stack(module: &mut Module, body: &[Statement]) -> Result<Value> {
    for statement in body {
        if let Flow::Yield(value) = eval_stmt(module, statement)? {
            return Ok(value);
        }
    }
    Ok(Value::NONE)
}

fn eval_stmt(module: &mut Module, statement: &Statement) -> Result<Flow> {
    match statement {
        Statement::VariableDeclaration(decl) => {
            local::declare_variable(module, decl)?;
            Ok(Flow::Next)
        }

        Statement::Return(stmt) => {
            let value = stmt.expression.eval(module)?;
            if module.callstack.is_top_level() {
                return Err(module.error(ErrorKind::TopLevelReturn, stmt.position));
            }
            Ok(Flow::Yield(value))
        }

        Statement::Throw(stmt) => {
            let value = stmt.expression.eval(module)?;
            let kind = if module.callstack.is_top_level() {
                ErrorKind::TopLevelThrow
            } else {
                ErrorKind::Thrown { value }
            };
            Err(module.error(kind, stmt.position))
        }

        Statement::BlockDeclaration(decl) => {
            item::declare_block(module, decl)?;
            Ok(Flow::Next)
        }

        Statement::QuantityModifier(stmt) => {
            assign::modify(module, stmt)?;
            Ok(Flow::Next)
        }

        Statement::Assign(stmt) => {
            assign::assign(module, stmt)?;
            Ok(Flow::Next)
        }

        Statement::BlockCall(call) => call.eval(module).map(Flow::Yield),

        Statement::ScopeMutater(mutater) => {
            mutater.eval(module)?;
            Ok(Flow::Next)
        }

        Statement::For(stmt) => {
            loops::run_for(module, stmt)?;
            Ok(Flow::Next)
        }

        Statement::While(stmt) => {
            loops::run_while(module, stmt)?;
            Ok(Flow::Next)
        }

        Statement::If(stmt) => if_expr::run_if(module, stmt).map(Flow::Yield),

        Statement::Switch(stmt) => switch::run_switch(module, stmt).map(Flow::Yield),

        Statement::NamespaceDeclaration(decl) => {
            namespace::declare_namespace(module, decl)?;
            Ok(Flow::Next)
        }

        Statement::NamespaceIndex(index) => {
            index.eval(module)?;
            Ok(Flow::Next)
        }

        Statement::Comment(_) => Ok(Flow::Next),
    }
}

/// Run a control-flow body in its own scope and frame.
pub(super) fn run_body(
    module: &mut Module,
    kind: FrameKind,
    position: Position,
    body: &Body,
) -> Result<Value> {
    let mut guard = FrameGuard::new(module);
    let scope_index = guard.push_fresh();
    let frame = CallFrame::control(kind, guard.filename(), position, scope_index, Rc::clone(body));
    guard.push_frame(frame);
    resolve_stack(&mut guard, body)
}
