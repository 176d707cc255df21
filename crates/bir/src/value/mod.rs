//! Runtime value representation
//!
//! Bir has exactly one primitive: a 64-bit signed integer. Booleans are
//! the integers `0` and `1`, and "no value" is the out-of-range sentinel
//! `-1` returned by statement lists that run off their end.

mod display;
mod impls;

/// The single runtime value of the language.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Value(pub i64);

impl Value {
    /// Sentinel yielded by lists that finish without a terminal statement,
    /// by unmatched `if`/`switch` statements and by degraded parameters.
    pub const NONE: Value = Value(-1);

    /// Boolean true.
    pub const TRUE: Value = Value(1);

    /// Boolean false.
    pub const FALSE: Value = Value(0);

    /// Create a value from a raw integer.
    pub const fn new(raw: i64) -> Self {
        Value(raw)
    }

    /// Encode a boolean as `0`/`1`.
    pub const fn from_bool(condition: bool) -> Self {
        if condition {
            Value::TRUE
        } else {
            Value::FALSE
        }
    }

    /// The raw integer.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Conditions are truthy only when they are exactly `1`.
    pub const fn is_truthy(self) -> bool {
        self.0 == 1
    }

    /// Check for the `-1` sentinel.
    pub const fn is_none(self) -> bool {
        self.0 == Value::NONE.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness_is_exactly_one() {
        assert!(Value::TRUE.is_truthy());
        assert!(!Value::FALSE.is_truthy());
        assert!(!Value(2).is_truthy());
        assert!(!Value::NONE.is_truthy());
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(Value::from_bool(true), Value(1));
        assert_eq!(Value::from_bool(false), Value(0));
    }

    #[test]
    fn test_none_sentinel() {
        assert!(Value(-1).is_none());
        assert!(!Value(0).is_none());
        assert_eq!(Value::default(), Value(0));
    }
}
