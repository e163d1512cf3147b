//! Conversion of bare literal words into values.

use super::error::ErrorKind;
use crate::value::{Value, ValueType};

pub fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

/// Whether `byte` may appear inside a bare literal of type `typ`.
///
/// Integers take digits and `-`, floats additionally `.`. Boolean words are
/// alphanumeric. Strings are never bare.
pub fn accepts(typ: ValueType, byte: u8) -> bool {
    match typ {
        ValueType::Integer => byte.is_ascii_digit() || byte == b'-',
        ValueType::Float => byte.is_ascii_digit() || byte == b'-' || byte == b'.',
        ValueType::Boolean => byte.is_ascii_alphanumeric(),
        ValueType::String | ValueType::Array => false,
    }
}

/// The error raised for a malformed literal of type `typ`.
pub fn invalid(typ: ValueType) -> ErrorKind {
    match typ {
        ValueType::Integer => ErrorKind::InvalidIntegerValue,
        ValueType::Float => ErrorKind::InvalidFloatValue,
        ValueType::Boolean => ErrorKind::InvalidBooleanValue,
        ValueType::String => ErrorKind::InvalidStringLiteral,
        ValueType::Array => ErrorKind::InvalidArrayType,
    }
}

/// Optional leading `-` followed by decimal digits, within `i32` range.
pub fn parse_integer(text: &[u8]) -> Option<i32> {
    let digits = text.strip_prefix(b"-").unwrap_or(text);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(text).ok()?.parse().ok()
}

/// Decimal float made of digits, `.` and an optional leading `-`.
///
/// Results that overflow to infinity are rejected.
pub fn parse_float(text: &[u8]) -> Option<f32> {
    if !text.iter().any(u8::is_ascii_digit) || !text.iter().all(|&b| accepts(ValueType::Float, b)) {
        return None;
    }
    let value: f32 = std::str::from_utf8(text).ok()?.parse().ok()?;
    value.is_finite().then_some(value)
}

/// One of `1 t true` or `0 f false`.
pub fn parse_boolean(text: &[u8]) -> Option<bool> {
    match text {
        b"1" | b"t" | b"true" => Some(true),
        b"0" | b"f" | b"false" => Some(false),
        _ => None,
    }
}

/// Convert a complete bare word into a value of type `typ`.
pub fn scalar(typ: ValueType, text: &[u8]) -> Result<Value, ErrorKind> {
    let value = match typ {
        ValueType::Integer => parse_integer(text).map(Value::Integer),
        ValueType::Float => parse_float(text).map(Value::Float),
        ValueType::Boolean => parse_boolean(text).map(Value::Boolean),
        ValueType::String | ValueType::Array => None,
    };
    value.ok_or_else(|| invalid(typ))
}
