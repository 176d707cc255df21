//! Assignment and quantity modifier evaluation

use super::Evaluate;
use crate::ast::{Assign, Identifier, ModifierKind, Position, QuantityModifier};
use crate::environment::UpdateReport;
use crate::error::{ErrorKind, Result};
use crate::module::Module;
use crate::value::Value;

/// `x = e`
pub(super) fn assign(module: &mut Module, stmt: &Assign) -> Result<()> {
    let value = stmt.right.eval(module)?;
    store(module, &stmt.left, value, stmt.position)
}

/// `x++`, `x += e`, ...
pub(super) fn modify(module: &mut Module, stmt: &QuantityModifier) -> Result<()> {
    let current = stmt.statement.eval(module)?.get();

    let next = match stmt.kind {
        ModifierKind::Increment => current.wrapping_add(1),
        ModifierKind::Decrement => current.wrapping_sub(1),
        ModifierKind::Add => current.wrapping_add(operand(module, stmt)?),
        ModifierKind::Subtract => current.wrapping_sub(operand(module, stmt)?),
        ModifierKind::Multiply => current.wrapping_mul(operand(module, stmt)?),
        ModifierKind::Divide => {
            let divisor = operand(module, stmt)?;
            if divisor == 0 {
                return Err(module.error(ErrorKind::DivisionByZero, stmt.position));
            }
            current.wrapping_div(divisor)
        }
    };

    store(module, &stmt.statement, Value(next), stmt.position)
}

fn operand(module: &mut Module, stmt: &QuantityModifier) -> Result<i64> {
    match &stmt.right {
        Some(right) => Ok(right.eval(module)?.get()),
        None => Ok(0),
    }
}

fn store(module: &mut Module, target: &Identifier, value: Value, position: Position) -> Result<()> {
    let name = target.value.clone();

    let kind = match module.scopes.is_updatable(&name) {
        UpdateReport::Ok => {
            module.scopes.update_variable(&name, value);
            return Ok(());
        }
        UpdateReport::NotFound => ErrorKind::AssignUndefined { name },
        UpdateReport::Immutable => ErrorKind::AssignImmutable { name },
        UpdateReport::Foreign => ErrorKind::AssignForeign { name },
    };
    Err(module.error(kind, position))
}
