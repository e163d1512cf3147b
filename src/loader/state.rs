//! Loader states.

use crate::value::ValueType;

/// Where the loader is within the document grammar.
///
/// Every declaration walks `*Wait` (skip to the name), `*Name` (capture it
/// up to `=`) and `*Value` (read the value up to `;`). Arrays first pass
/// through `ArrayTypeSelect` to fix their element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Between declarations.
    Neutral,
    /// After `[`, before the section name.
    SectionWait,
    /// Inside a section name, up to `]`.
    SectionName,
    IntegerWait,
    IntegerName,
    IntegerValue,
    FloatWait,
    FloatName,
    FloatValue,
    StringWait,
    StringName,
    StringValue,
    BooleanWait,
    BooleanName,
    BooleanValue,
    /// After `a`, before the element tag.
    ArrayTypeSelect,
    ArrayWait,
    ArrayName,
    ArrayValue,
}

impl State {
    /// The state that starts a declaration of `typ`.
    pub fn declare(typ: ValueType) -> State {
        match typ {
            ValueType::Integer => State::IntegerWait,
            ValueType::Float => State::FloatWait,
            ValueType::String => State::StringWait,
            ValueType::Boolean => State::BooleanWait,
            ValueType::Array => State::ArrayTypeSelect,
        }
    }

    /// Advance within a declaration: type selection to wait, wait to name,
    /// name to value. Other states stay put.
    pub fn next(self) -> State {
        match self {
            State::ArrayTypeSelect => State::ArrayWait,
            State::IntegerWait => State::IntegerName,
            State::IntegerName => State::IntegerValue,
            State::FloatWait => State::FloatName,
            State::FloatName => State::FloatValue,
            State::StringWait => State::StringName,
            State::StringName => State::StringValue,
            State::BooleanWait => State::BooleanName,
            State::BooleanName => State::BooleanValue,
            State::ArrayWait => State::ArrayName,
            State::ArrayName => State::ArrayValue,
            other => other,
        }
    }

    /// The type being declared, if inside a declaration.
    pub fn value_type(self) -> Option<ValueType> {
        match self {
            State::Neutral | State::SectionWait | State::SectionName => None,
            State::IntegerWait | State::IntegerName | State::IntegerValue => Some(ValueType::Integer),
            State::FloatWait | State::FloatName | State::FloatValue => Some(ValueType::Float),
            State::StringWait | State::StringName | State::StringValue => Some(ValueType::String),
            State::BooleanWait | State::BooleanName | State::BooleanValue => Some(ValueType::Boolean),
            State::ArrayTypeSelect | State::ArrayWait | State::ArrayName | State::ArrayValue => {
                Some(ValueType::Array)
            }
        }
    }
}
