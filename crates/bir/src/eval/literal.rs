//! Literal evaluation

use super::Evaluate;
use crate::ast::{Expression, Literal};
use crate::error::{ErrorKind, Result};
use crate::module::Module;
use crate::value::Value;

impl Evaluate for Literal {
    fn eval(&self, module: &mut Module) -> Result<Value> {
        match self {
            Literal::Int { value, .. } => Ok(Value(*value)),
            Literal::String { .. } | Literal::Array { .. } => Err(module.error(
                ErrorKind::UnsupportedLiteral {
                    kind: self.type_name(),
                },
                self.position(),
            )),
        }
    }
}

/// Values a `populate` literal seeds into an instance.
///
/// Strings yield their characters' code points; arrays yield their
/// evaluated elements.
pub(super) fn seed_values(module: &mut Module, populate: &Expression) -> Result<Vec<Value>> {
    match populate {
        Expression::Primitive(Literal::String { value, .. }) => {
            Ok(value.chars().map(Value::from).collect())
        }
        Expression::Primitive(Literal::Array { values, .. }) => {
            values.iter().map(|element| element.eval(module)).collect()
        }
        Expression::Primitive(literal) => Err(module.error(
            ErrorKind::UnsupportedLiteral {
                kind: literal.type_name(),
            },
            literal.position(),
        )),
        other => Err(module.error(
            ErrorKind::UnsupportedLiteral { kind: "expression" },
            other.position(),
        )),
    }
}
