//! Arithmetic and condition evaluation
//!
//! Integer operations wrap on overflow. `exponent` and `root` go through
//! `f64` and truncate toward zero.

use super::Evaluate;
use crate::ast::{Arithmetic, ArithmeticOp, Condition, ConditionOp};
use crate::error::{ErrorKind, Result};
use crate::module::Module;
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════════════
// Arithmetic
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for Arithmetic {
    fn eval(&self, module: &mut Module) -> Result<Value> {
        let left = self.left.eval(module)?;
        let right = self.right.eval(module)?;
        apply_arithmetic(self.op, left, right).map_err(|kind| module.error(kind, self.position))
    }
}

/// Apply an arithmetic operator. `log10` ignores `right`.
pub fn apply_arithmetic(
    op: ArithmeticOp,
    left: Value,
    right: Value,
) -> std::result::Result<Value, ErrorKind> {
    let (l, r) = (left.get(), right.get());

    let result = match op {
        ArithmeticOp::Addition => l.wrapping_add(r),
        ArithmeticOp::Subtraction => l.wrapping_sub(r),
        ArithmeticOp::Multiplication => l.wrapping_mul(r),
        ArithmeticOp::Division => {
            if r == 0 {
                return Err(ErrorKind::DivisionByZero);
            }
            l.wrapping_div(r)
        }
        ArithmeticOp::Modulus => {
            if r == 0 {
                return Err(ErrorKind::DivisionByZero);
            }
            l.wrapping_rem(r)
        }
        ArithmeticOp::Exponent => (l as f64).powf(r as f64) as i64,
        ArithmeticOp::Root => {
            if r == 0 {
                return Err(ErrorKind::ZeroRoot);
            }
            (l as f64).powf(1.0 / r as f64) as i64
        }
        ArithmeticOp::Log10 => {
            if l <= 0 {
                return Err(ErrorKind::InvalidLogarithm { value: left });
            }
            i64::from(l.ilog10())
        }
    };

    Ok(Value(result))
}

// ═══════════════════════════════════════════════════════════════════════
// Conditions
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for Condition {
    fn eval(&self, module: &mut Module) -> Result<Value> {
        let left = self.left.eval(module)?;
        let right = self.right.eval(module)?;
        Ok(apply_condition(self.op, left, right))
    }
}

/// Apply a comparison or logical operator; the result is `0` or `1`.
///
/// Both operands are always evaluated by the caller; there is no
/// short-circuiting.
pub fn apply_condition(op: ConditionOp, left: Value, right: Value) -> Value {
    let (l, r) = (left.get(), right.get());
    let (a, b) = (left.is_truthy(), right.is_truthy());

    Value::from_bool(match op {
        ConditionOp::Equals => l == r,
        ConditionOp::NotEquals => l != r,
        ConditionOp::LessThan => l < r,
        ConditionOp::LessThanEquals => l <= r,
        ConditionOp::NotLessThan => !(l < r),
        ConditionOp::NotLessThanEquals => !(l <= r),
        ConditionOp::GreaterThan => l > r,
        ConditionOp::GreaterThanEquals => l >= r,
        ConditionOp::NotGreaterThan => !(l > r),
        ConditionOp::NotGreaterThanEquals => !(l >= r),
        ConditionOp::And => a && b,
        ConditionOp::Or => a || b,
        ConditionOp::Nand => !(a && b),
        ConditionOp::Nor => !(a || b),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arith(op: ArithmeticOp, l: i64, r: i64) -> std::result::Result<i64, ErrorKind> {
        apply_arithmetic(op, Value(l), Value(r)).map(Value::get)
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(arith(ArithmeticOp::Addition, 2, 3), Ok(5));
        assert_eq!(arith(ArithmeticOp::Subtraction, 2, 3), Ok(-1));
        assert_eq!(arith(ArithmeticOp::Multiplication, -4, 3), Ok(-12));
        assert_eq!(arith(ArithmeticOp::Division, 7, 2), Ok(3));
        assert_eq!(arith(ArithmeticOp::Modulus, 7, 4), Ok(3));
    }

    #[test]
    fn test_overflow_wraps() {
        assert_eq!(arith(ArithmeticOp::Addition, i64::MAX, 1), Ok(i64::MIN));
        assert_eq!(arith(ArithmeticOp::Division, i64::MIN, -1), Ok(i64::MIN));
    }

    #[test]
    fn test_float_backed_operators() {
        assert_eq!(arith(ArithmeticOp::Exponent, 2, 10), Ok(1024));
        assert_eq!(arith(ArithmeticOp::Exponent, 2, -1), Ok(0));
        assert_eq!(arith(ArithmeticOp::Root, 100, 2), Ok(10));
        assert_eq!(arith(ArithmeticOp::Root, 16, 2), Ok(4));
        assert_eq!(arith(ArithmeticOp::Log10, 1000, 0), Ok(3));
        assert_eq!(arith(ArithmeticOp::Log10, 999, 0), Ok(2));
    }

    #[test]
    fn test_arithmetic_failures() {
        assert_eq!(arith(ArithmeticOp::Division, 1, 0), Err(ErrorKind::DivisionByZero));
        assert_eq!(arith(ArithmeticOp::Modulus, 1, 0), Err(ErrorKind::DivisionByZero));
        assert_eq!(arith(ArithmeticOp::Root, 8, 0), Err(ErrorKind::ZeroRoot));
        assert_eq!(
            arith(ArithmeticOp::Log10, 0, 0),
            Err(ErrorKind::InvalidLogarithm { value: Value(0) })
        );
    }

    #[test]
    fn test_comparisons() {
        let cmp = |op, l, r| apply_condition(op, Value(l), Value(r)).get();
        assert_eq!(cmp(ConditionOp::Equals, 1, 1), 1);
        assert_eq!(cmp(ConditionOp::NotEquals, 1, 1), 0);
        assert_eq!(cmp(ConditionOp::LessThan, 1, 2), 1);
        assert_eq!(cmp(ConditionOp::NotLessThan, 1, 2), 0);
        assert_eq!(cmp(ConditionOp::LessThanEquals, 2, 2), 1);
        assert_eq!(cmp(ConditionOp::NotLessThanEquals, 2, 2), 0);
        assert_eq!(cmp(ConditionOp::GreaterThan, 3, 2), 1);
        assert_eq!(cmp(ConditionOp::NotGreaterThan, 3, 2), 0);
        assert_eq!(cmp(ConditionOp::GreaterThanEquals, 1, 2), 0);
        assert_eq!(cmp(ConditionOp::NotGreaterThanEquals, 1, 2), 1);
    }

    #[test]
    fn test_logic_uses_exact_truthiness() {
        let logic = |op, l, r| apply_condition(op, Value(l), Value(r)).get();
        assert_eq!(logic(ConditionOp::And, 1, 1), 1);
        assert_eq!(logic(ConditionOp::And, 1, 2), 0);
        assert_eq!(logic(ConditionOp::Or, 0, 1), 1);
        assert_eq!(logic(ConditionOp::Nand, 1, 1), 0);
        assert_eq!(logic(ConditionOp::Nor, 0, 0), 1);
    }
}
