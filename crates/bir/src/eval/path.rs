//! Variable reference evaluation

use super::Evaluate;
use crate::ast::Identifier;
use crate::error::{ErrorKind, Result};
use crate::module::Module;
use crate::value::Value;

impl Evaluate for Identifier {
    fn eval(&self, module: &mut Module) -> Result<Value> {
        let lookup = module.scopes.find_variable(self.name()).ok_or_else(|| {
            module.error(
                ErrorKind::UndefinedVariable {
                    name: self.value.clone(),
                },
                self.position,
            )
        })?;

        Ok(if self.negative {
            Value(lookup.value.get().wrapping_neg())
        } else {
            lookup.value
        })
    }
}
