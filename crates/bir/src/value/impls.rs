//! Value conversions

use super::Value;

impl From<i64> for Value {
    fn from(raw: i64) -> Self {
        Value(raw)
    }
}

impl From<bool> for Value {
    fn from(condition: bool) -> Self {
        Value::from_bool(condition)
    }
}

impl From<u8> for Value {
    fn from(byte: u8) -> Self {
        Value(i64::from(byte))
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value(i64::from(u32::from(c)))
    }
}

impl From<Value> for i64 {
    fn from(value: Value) -> Self {
        value.0
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_is_code_point() {
        assert_eq!(Value::from('a'), Value(97));
        assert_eq!(Value::from('é'), Value(233));
    }

    #[test]
    fn test_compare_with_raw() {
        assert_eq!(Value(5), 5);
        assert_eq!(i64::from(Value(7)), 7);
    }
}
