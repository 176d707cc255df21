//! `switch` evaluation

use super::stmt::run_body;
use super::Evaluate;
use crate::ast::SwitchStatement;
use crate::callstack::FrameKind;
use crate::error::Result;
use crate::module::Module;
use crate::value::Value;

/// Run the selected arm and yield its value.
///
/// Every case value is evaluated; the last one equal to the condition
/// wins. Otherwise `default` runs if present, else the value is
/// [`Value::NONE`].
pub(super) fn run_switch(module: &mut Module, stmt: &SwitchStatement) -> Result<Value> {
    let condition = stmt.condition.eval(module)?;

    let mut selected = None;
    for case in &stmt.cases {
        if case.case.eval(module)? == condition {
            selected = Some(&case.body);
        }
    }

    match (selected, &stmt.default) {
        (Some(body), _) => run_body(module, FrameKind::SwitchCase, stmt.position, body),
        (None, Some(default)) => {
            run_body(module, FrameKind::SwitchDefault, stmt.position, &default.body)
        }
        (None, None) => Ok(Value::NONE),
    }
}
