//! Block invocation
//!
//! A call happens in two steps. Preparing evaluates the call site's
//! verbs and arguments in the caller's module; executing runs the body in
//! the module that owns the block. For local blocks both are the same
//! module. For foreign blocks the caller lends its innermost scope to the
//! owner for the duration of the call.

use std::rc::Rc;

use tracing::trace;

use super::{resolve_stack, Evaluate, FrameGuard};
use crate::ast::{empty_body, BlockCall, Body, Expression, Identifier, Position};
use crate::block::{Block, BlockKind};
use crate::callstack::{CallFrame, FrameKind};
use crate::environment::{Binding, BindingKind, Scope};
use crate::error::{ErrorKind, Result};
use crate::module::Module;
use crate::native::{NativeFn, NativeStatus};
use crate::stack::ensure_sufficient_stack;
use crate::value::Value;

/// A call whose call-site expressions have been evaluated.
enum Prepared {
    /// Parameter bindings for a tree-walked body
    Plain { program: Body, bindings: Vec<Binding> },

    /// Evaluated operands for a host function
    Native {
        function: NativeFn,
        verbs: Vec<Value>,
        arguments: Vec<Value>,
    },
}

impl Evaluate for BlockCall {
    fn eval(&self, module: &mut Module) -> Result<Value> {
        let block = module
            .scopes
            .find_block(self.name.name())
            .ok_or_else(|| {
                module.error(
                    ErrorKind::BlockNotFound {
                        name: self.name.value.clone(),
                    },
                    self.position,
                )
            })?
            .block;

        if block.owner() != module.id {
            return call_foreign(module, &block, self);
        }

        let prepared = prepare_call(module, &block, self)?;
        execute_call(module, &block, self, prepared)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Preparing
// ═══════════════════════════════════════════════════════════════════════

fn prepare_call(module: &mut Module, block: &Block, call: &BlockCall) -> Result<Prepared> {
    match block.kind() {
        BlockKind::Plain {
            arguments,
            verbs,
            program,
        } => {
            let mut bindings = bind_parameters(module, call, "argument", arguments, &call.arguments)?;
            bindings.extend(bind_parameters(module, call, "verb", verbs, &call.verbs)?);
            Ok(Prepared::Plain {
                program: Rc::clone(program),
                bindings,
            })
        }

        BlockKind::Native(function) => {
            let verbs = eval_all(module, &call.verbs)?;
            let arguments = eval_all(module, &call.arguments)?;
            Ok(Prepared::Native {
                function: function.clone(),
                verbs,
                arguments,
            })
        }

        // Implemented blocks lend their parameter list.
        BlockKind::Implementing { target } => prepare_call(module, target, call),
    }
}

fn eval_all(module: &mut Module, expressions: &[Expression]) -> Result<Vec<Value>> {
    expressions.iter().map(|e| e.eval(module)).collect()
}

/// Pair declared parameters with call-site expressions.
///
/// On a count mismatch nothing is evaluated: a warning is reported and
/// every declared parameter is bound to [`Value::NONE`].
fn bind_parameters(
    module: &mut Module,
    call: &BlockCall,
    what: &str,
    declared: &[Identifier],
    given: &[Expression],
) -> Result<Vec<Binding>> {
    if declared.len() != given.len() {
        module.warn(
            format!(
                "Expected {} {}(s), found {} while calling '{}'",
                declared.len(),
                what,
                given.len(),
                call.name.name()
            ),
            call.position,
        );
        return Ok(declared
            .iter()
            .map(|param| Binding::new(param.clone(), Value::NONE, BindingKind::Const))
            .collect());
    }

    declared
        .iter()
        .zip(given)
        .map(|(param, expression)| {
            let value = expression.eval(module)?;
            Ok(Binding::new(param.clone(), value, BindingKind::Const))
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Executing
// ═══════════════════════════════════════════════════════════════════════

fn execute_call(
    module: &mut Module,
    block: &Block,
    call: &BlockCall,
    prepared: Prepared,
) -> Result<Value> {
    module.callstack.check_depth(call.position)?;
    trace!(block = block.name(), depth = module.callstack.depth(), "invoking block");

    match prepared {
        Prepared::Plain { program, bindings } => {
            ensure_sufficient_stack(|| invoke(module, block, program, bindings, call.position))
        }
        Prepared::Native {
            function,
            verbs,
            arguments,
        } => call_native(module, block.name(), &function, call.position, &verbs, &arguments),
    }
}

/// Run a plain body over the block's instance.
///
/// Parameters and body locals live in a fresh call scope above the
/// instance, so recursive calls never clobber each other. The frame
/// records the instance's index for scope mutaters.
fn invoke(
    module: &mut Module,
    block: &Block,
    program: Body,
    bindings: Vec<Binding>,
    position: Position,
) -> Result<Value> {
    let mut call_scope = Scope::new();
    for binding in bindings {
        call_scope.insert(binding);
    }

    let mut guard = FrameGuard::new(module);
    let scope_index = guard.push_scope(Rc::clone(block.instance()));
    guard.push_scope(call_scope.into_ref());
    guard.push_frame(CallFrame::new(
        block.name(),
        FrameKind::Block,
        position,
        scope_index,
        Rc::clone(&program),
    ));
    resolve_stack(&mut guard, &program)
}

fn call_native(
    module: &mut Module,
    name: &str,
    function: &NativeFn,
    position: Position,
    verbs: &[Value],
    arguments: &[Value],
) -> Result<Value> {
    let scope_index = module.scopes.len() - 1;

    let mut guard = FrameGuard::new(module);
    guard.push_frame(CallFrame::new(
        format!("{}:native", name),
        FrameKind::Native,
        position,
        scope_index,
        empty_body(),
    ));

    let ret = function.call(verbs, arguments);
    match ret.status {
        NativeStatus::Ok => Ok(ret.value),
        NativeStatus::Warn(message) => {
            guard.warn(message, position);
            Ok(ret.value)
        }
        NativeStatus::Error(message) => Err(guard.error(
            ErrorKind::Native {
                name: name.to_string(),
                message,
            },
            position,
        )),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Cross-module calls
// ═══════════════════════════════════════════════════════════════════════

/// Call a block owned by an imported module.
///
/// Parameters are evaluated here; the body runs on the owner's stacks and
/// against the owner's depth budget, with the caller's innermost scope
/// lent on top. The lent scope is removed exactly once on every path.
fn call_foreign(module: &mut Module, block: &Rc<Block>, call: &BlockCall) -> Result<Value> {
    let owner_id = block.owner();
    let Some(owner_index) = module.uses.iter().position(|used| used.id == owner_id) else {
        return Err(module.error(
            ErrorKind::BlockNotFound {
                name: call.name.value.clone(),
            },
            call.position,
        ));
    };

    let prepared = prepare_call(module, block, call)?;
    let lent = Rc::clone(module.scopes.current());
    trace!(block = block.name(), owner = %owner_id, "foreign call");

    let owner = &mut module.uses[owner_index];
    let mut guard = FrameGuard::new(owner);
    guard.push_scope(lent);
    execute_call(&mut guard, block, call, prepared)
}
