//! Tree-walking evaluator
//!
//! Expressions implement [`Evaluate`]; statements are dispatched by
//! [`resolve_stack`], which runs one statement list in the current frame.
//! Every scope and frame an evaluator pushes goes through a
//! [`FrameGuard`], so the module's stacks are balanced again on every exit
//! path, errors included.

mod assign;
mod binary;
mod call;
mod control;
mod guard;
mod if_expr;
mod item;
mod literal;
mod local;
mod loops;
mod mutater;
mod namespace;
mod path;
mod stmt;
mod switch;

pub(crate) use guard::FrameGuard;
pub use binary::{apply_arithmetic, apply_condition};
pub use stmt::resolve_stack;

use crate::ast::Expression;
use crate::error::Result;
use crate::module::Module;
use crate::value::Value;

/// Trait for evaluating expression nodes to values.
///
/// This is the core abstraction of the interpreter: each expression node
/// type implements it against the module it runs in.
pub trait Evaluate {
    /// Evaluate this node in `module`.
    fn eval(&self, module: &mut Module) -> Result<Value>;
}

// ═══════════════════════════════════════════════════════════════════════
// Main Expression Dispatcher
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for Expression {
    fn eval(&self, module: &mut Module) -> Result<Value> {
        match self {
            Expression::Primitive(literal) => literal.eval(module),
            Expression::BlockCall(call) => call.eval(module),
            Expression::Arithmetic(arithmetic) => arithmetic.eval(module),
            Expression::Condition(condition) => condition.eval(module),
            Expression::Reference(reference) => reference.eval(module),
            Expression::ScopeMutater(mutater) => mutater.eval(module),
            Expression::NamespaceIndex(index) => index.eval(module),
        }
    }
}
