//! KOML value representation.
//!
//! Every symbol holds exactly one [`Value`]. Arrays are homogeneous: the
//! element type is carried by the [`Array`] variant itself, so an array can
//! never hold a mix of element kinds.

use serde::Serialize;
use std::collections::TryReserveError;
use std::fmt;

/// The declared type of a symbol, or the element type of an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Integer,
    Float,
    String,
    Boolean,
    Array,
}

impl ValueType {
    /// Map a declaration tag byte (`i`, `f`, `s`, `b`, `a`) to its type.
    pub fn from_tag(tag: u8) -> Option<ValueType> {
        match tag {
            b'i' => Some(ValueType::Integer),
            b'f' => Some(ValueType::Float),
            b's' => Some(ValueType::String),
            b'b' => Some(ValueType::Boolean),
            b'a' => Some(ValueType::Array),
            _ => None,
        }
    }

    /// The declaration tag for this type.
    pub fn tag(self) -> char {
        match self {
            ValueType::Integer => 'i',
            ValueType::Float => 'f',
            ValueType::String => 's',
            ValueType::Boolean => 'b',
            ValueType::Array => 'a',
        }
    }

    /// Short lowercase name, as used in debug listings.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Integer => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Array => "array",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Float)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A loaded KOML value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i32),
    Float(f32),
    String(String),
    Boolean(bool),
    Array(Array),
}

impl Value {
    /// Get the KOML type of this value
    pub fn typ(&self) -> ValueType {
        match self {
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Array(_) => ValueType::Array,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Storage width of the value: 4 for numbers, 1 for booleans, the byte
    /// length for strings and 0 for arrays (see [`Array::stride`]).
    pub fn stride(&self) -> usize {
        match self {
            Value::Integer(_) | Value::Float(_) => 4,
            Value::String(s) => s.len(),
            Value::Boolean(_) => 1,
            Value::Array(_) => 0,
        }
    }

    /// Copy this value into a slot of type `target`, applying the reference
    /// coercion rules.
    ///
    /// Integers and floats convert into each other (floats truncate toward
    /// zero). Strings and booleans only match themselves. Arrays are handled
    /// by [`Array::coerce`], since the target element type matters there.
    pub fn coerce(&self, target: ValueType) -> Option<Value> {
        match (target, self) {
            (ValueType::Integer, Value::Integer(v)) => Some(Value::Integer(*v)),
            (ValueType::Integer, Value::Float(v)) => Some(Value::Integer(*v as i32)),
            (ValueType::Float, Value::Float(v)) => Some(Value::Float(*v)),
            (ValueType::Float, Value::Integer(v)) => Some(Value::Float(*v as f32)),
            (ValueType::String, Value::String(v)) => Some(Value::String(v.clone())),
            (ValueType::Boolean, Value::Boolean(v)) => Some(Value::Boolean(*v)),
            _ => None,
        }
    }
}

/// Renders the value as a KOML literal (the right-hand side of a declaration).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => f.write_str(&format_float(*v)),
            Value::String(v) => write!(f, "\"{}\"", v),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Array(v) => write!(f, "{}", v),
        }
    }
}

/// Format a float so that it reads back as a KOML float literal.
///
/// Rust's `Display` for floats never uses exponent notation and prints the
/// shortest digits that round-trip; a `.0` is appended to whole numbers.
pub(crate) fn format_float(value: f32) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Error returned when an element cannot be appended to an [`Array`].
#[derive(Debug, thiserror::Error)]
pub enum ArrayError {
    #[error("cannot store {actual} element in {expected} array")]
    TypeMismatch { expected: ValueType, actual: ValueType },
    #[error("failed to grow array storage: {0}")]
    Allocation(#[from] TryReserveError),
}

/// A homogeneous array value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Array {
    Integer(Vec<i32>),
    Float(Vec<f32>),
    String(Vec<String>),
    Boolean(Vec<bool>),
}

impl Array {
    /// Create an empty array of the given element type.
    ///
    /// Returns `None` for [`ValueType::Array`]: arrays of arrays do not exist.
    pub fn new(element_type: ValueType) -> Option<Array> {
        match element_type {
            ValueType::Integer => Some(Array::Integer(Vec::new())),
            ValueType::Float => Some(Array::Float(Vec::new())),
            ValueType::String => Some(Array::String(Vec::new())),
            ValueType::Boolean => Some(Array::Boolean(Vec::new())),
            ValueType::Array => None,
        }
    }

    pub fn element_type(&self) -> ValueType {
        match self {
            Array::Integer(_) => ValueType::Integer,
            Array::Float(_) => ValueType::Float,
            Array::String(_) => ValueType::String,
            Array::Boolean(_) => ValueType::Boolean,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Array::Integer(v) => v.len(),
            Array::Float(v) => v.len(),
            Array::String(v) => v.len(),
            Array::Boolean(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a copy of the element at `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Array::Integer(v) => v.get(index).map(|x| Value::Integer(*x)),
            Array::Float(v) => v.get(index).map(|x| Value::Float(*x)),
            Array::String(v) => v.get(index).map(|x| Value::String(x.clone())),
            Array::Boolean(v) => v.get(index).map(|x| Value::Boolean(*x)),
        }
    }

    /// Iterate over copies of the elements, in order.
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Byte length of a string element, or the fixed width of any other
    /// element kind.
    pub fn stride(&self, index: usize) -> Option<usize> {
        self.get(index).map(|v| v.stride())
    }

    /// Per-element strides, in element order.
    pub fn strides(&self) -> Vec<usize> {
        self.iter().map(|v| v.stride()).collect()
    }

    /// Append one element, growing storage by amortized reservation.
    pub fn push(&mut self, value: Value) -> Result<(), ArrayError> {
        let expected = self.element_type();
        match (self, value) {
            (Array::Integer(v), Value::Integer(x)) => {
                v.try_reserve(1)?;
                v.push(x);
            }
            (Array::Float(v), Value::Float(x)) => {
                v.try_reserve(1)?;
                v.push(x);
            }
            (Array::String(v), Value::String(x)) => {
                v.try_reserve(1)?;
                v.push(x);
            }
            (Array::Boolean(v), Value::Boolean(x)) => {
                v.try_reserve(1)?;
                v.push(x);
            }
            (_, other) => {
                return Err(ArrayError::TypeMismatch {
                    expected,
                    actual: other.typ(),
                })
            }
        }
        Ok(())
    }

    /// Deep-copy this array into one with `element_type` elements.
    ///
    /// Integer and float arrays convert element by element (floats truncate
    /// toward zero); string and boolean arrays must match exactly.
    pub fn coerce(&self, element_type: ValueType) -> Option<Array> {
        match (element_type, self) {
            (ValueType::Integer, Array::Integer(v)) => Some(Array::Integer(v.clone())),
            (ValueType::Integer, Array::Float(v)) => Some(Array::Integer(v.iter().map(|x| *x as i32).collect())),
            (ValueType::Float, Array::Float(v)) => Some(Array::Float(v.clone())),
            (ValueType::Float, Array::Integer(v)) => Some(Array::Float(v.iter().map(|x| *x as f32).collect())),
            (ValueType::String, Array::String(v)) => Some(Array::String(v.clone())),
            (ValueType::Boolean, Array::Boolean(v)) => Some(Array::Boolean(v.clone())),
            _ => None,
        }
    }
}

/// Renders the elements as a KOML array body: `1, 2, 3`.
impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for typ in [
            ValueType::Integer,
            ValueType::Float,
            ValueType::String,
            ValueType::Boolean,
            ValueType::Array,
        ] {
            assert_eq!(ValueType::from_tag(typ.tag() as u8), Some(typ));
        }
        assert_eq!(ValueType::from_tag(b'x'), None);
    }

    #[test]
    fn value_type_matches_variant() {
        assert_eq!(Value::Integer(1).typ(), ValueType::Integer);
        assert_eq!(Value::Float(1.0).typ(), ValueType::Float);
        assert_eq!(Value::String("x".into()).typ(), ValueType::String);
        assert_eq!(Value::Boolean(true).typ(), ValueType::Boolean);
        assert_eq!(Value::Array(Array::Integer(vec![])).typ(), ValueType::Array);
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::Float(2.9).coerce(ValueType::Integer), Some(Value::Integer(2)));
        assert_eq!(Value::Float(-2.9).coerce(ValueType::Integer), Some(Value::Integer(-2)));
        assert_eq!(Value::Integer(7).coerce(ValueType::Float), Some(Value::Float(7.0)));
        assert_eq!(Value::Integer(7).coerce(ValueType::String), None);
        assert_eq!(Value::Boolean(true).coerce(ValueType::Integer), None);
    }

    #[test]
    fn strings_and_booleans_match_exactly() {
        assert_eq!(
            Value::String("hi".into()).coerce(ValueType::String),
            Some(Value::String("hi".into()))
        );
        assert_eq!(Value::String("1".into()).coerce(ValueType::Integer), None);
        assert_eq!(Value::Boolean(false).coerce(ValueType::Boolean), Some(Value::Boolean(false)));
        assert_eq!(Value::Integer(1).coerce(ValueType::Boolean), None);
    }

    #[test]
    fn array_rejects_nested_element_type() {
        assert!(Array::new(ValueType::Array).is_none());
        assert_eq!(Array::new(ValueType::Boolean), Some(Array::Boolean(vec![])));
    }

    #[test]
    fn array_push_keeps_order() {
        let mut array = Array::new(ValueType::Integer).unwrap();
        for x in [3, 1, 2] {
            array.push(Value::Integer(x)).unwrap();
        }
        assert_eq!(array, Array::Integer(vec![3, 1, 2]));
        assert_eq!(array.len(), 3);
    }

    #[test]
    fn array_push_rejects_wrong_element() {
        let mut array = Array::new(ValueType::String).unwrap();
        let err = array.push(Value::Integer(1)).unwrap_err();
        assert!(matches!(
            err,
            ArrayError::TypeMismatch {
                expected: ValueType::String,
                actual: ValueType::Integer
            }
        ));
        assert!(array.is_empty());
    }

    #[test]
    fn array_coercion() {
        let floats = Array::Float(vec![1.5, -2.5]);
        assert_eq!(floats.coerce(ValueType::Integer), Some(Array::Integer(vec![1, -2])));
        let ints = Array::Integer(vec![1, 2]);
        assert_eq!(ints.coerce(ValueType::Float), Some(Array::Float(vec![1.0, 2.0])));
        assert_eq!(ints.coerce(ValueType::String), None);
        assert_eq!(Array::Boolean(vec![true]).coerce(ValueType::Integer), None);
    }

    #[test]
    fn strides() {
        let strings = Array::String(vec!["ab".into(), "".into(), "xyz".into()]);
        assert_eq!(strings.strides(), vec![2, 0, 3]);
        assert_eq!(Array::Integer(vec![5]).stride(0), Some(4));
        assert_eq!(Array::Boolean(vec![true]).stride(0), Some(1));
        assert_eq!(Array::Boolean(vec![true]).stride(1), None);
    }

    #[test]
    fn display_as_literal() {
        assert_eq!(Value::Integer(-4).to_string(), "-4");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::String("a b".into()).to_string(), "\"a b\"");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(
            Value::Array(Array::String(vec!["x".into(), "y".into()])).to_string(),
            "\"x\", \"y\""
        );
    }

    #[test]
    fn float_format_avoids_exponents() {
        assert_eq!(format_float(0.0000001), "0.0000001");
        assert_eq!(format_float(1e10), "10000000000.0");
        assert_eq!(format_float(-0.0), "-0.0");
    }
}
