//! `if`/`elif`/`else` evaluation

use super::stmt::run_body;
use super::Evaluate;
use crate::ast::IfStatement;
use crate::callstack::FrameKind;
use crate::error::Result;
use crate::module::Module;
use crate::value::Value;

/// Run the selected branch and yield its value.
///
/// When the main condition fails every `elif` condition is evaluated and
/// the last truthy one wins. With no branch selected and no `else`, the
/// value is [`Value::NONE`].
pub(super) fn run_if(module: &mut Module, stmt: &IfStatement) -> Result<Value> {
    if stmt.condition.eval(module)?.is_truthy() {
        return run_body(module, FrameKind::If, stmt.position, &stmt.body);
    }

    let mut selected = None;
    for elif in &stmt.elifs {
        if elif.condition.eval(module)?.is_truthy() {
            selected = Some(&elif.body);
        }
    }

    match (selected, &stmt.otherwise) {
        (Some(body), _) => run_body(module, FrameKind::Elif, stmt.position, body),
        (None, Some(body)) => run_body(module, FrameKind::Else, stmt.position, body),
        (None, None) => Ok(Value::NONE),
    }
}
