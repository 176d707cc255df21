//! Scope mutaters: `[Write i, v]`, `[Read i]` and `[Delete i]`
//!
//! Mutaters address the storage scope of the nearest enclosing block
//! invocation, which is the block's shared instance. Control-flow frames
//! in between are skipped.

use super::Evaluate;
use crate::ast::{Identifier, ScopeMutater};
use crate::environment::{Binding, BindingKind};
use crate::error::{ErrorKind, Result};
use crate::module::Module;
use crate::value::Value;

/// Key a mutater index is stored under.
fn slot(index: Value) -> String {
    format!("value_{}", index)
}

impl Evaluate for ScopeMutater {
    fn eval(&self, module: &mut Module) -> Result<Value> {
        let name = self.mutater.name();
        if module.callstack.is_top_level() {
            return Err(module.error(ErrorKind::TopLevelScopeMutater, self.position));
        }

        let Some(scope_index) = module.callstack.nearest_invocation().map(|f| f.scope_index) else {
            return Err(module.error(
                ErrorKind::MutaterOutsideBlock {
                    mutater: name.to_string(),
                },
                self.position,
            ));
        };

        match name {
            "Write" => {
                self.expect_arity(module, 2)?;
                let index = self.arguments[0].eval(module)?;
                let value = self.arguments[1].eval(module)?;

                if let Some(scope) = module.scopes.get(scope_index) {
                    scope.borrow_mut().insert(Binding::new(
                        Identifier::synthetic(slot(index)),
                        value,
                        BindingKind::Mutable,
                    ));
                }
                Ok(value)
            }

            "Read" => {
                self.expect_arity(module, 1)?;
                let index = self.arguments[0].eval(module)?;

                let stored = module
                    .scopes
                    .get(scope_index)
                    .and_then(|scope| scope.borrow().get(&slot(index)).map(|b| b.value));
                stored.ok_or_else(|| module.error(ErrorKind::NoSuchIndex { index }, self.position))
            }

            "Delete" => {
                self.expect_arity(module, 1)?;
                let index = self.arguments[0].eval(module)?;
                module.warn(
                    format!("Delete is not implemented; index {} was kept", index),
                    self.position,
                );
                Ok(Value(0))
            }

            _ => Err(module.error(
                ErrorKind::UnknownMutater {
                    mutater: name.to_string(),
                },
                self.position,
            )),
        }
    }
}

impl ScopeMutater {
    fn expect_arity(&self, module: &Module, expected: usize) -> Result<()> {
        if self.arguments.len() == expected {
            return Ok(());
        }
        Err(module.error(
            ErrorKind::MutaterArity {
                mutater: self.mutater.name().to_string(),
                expected,
                found: self.arguments.len(),
            },
            self.position,
        ))
    }
}
