//! The single-pass KOML state machine.
//!
//! Bytes arrive one at a time from the [`Cursor`] (comments already
//! stripped) and are dispatched on the current [`State`]. Symbols are built
//! off to the side and only appended to the table once their value is
//! complete, so a failed load leaves a table holding exactly the
//! declarations that finished before the error.

use super::cursor::{Cursor, Position};
use super::error::{ErrorKind, LoadError};
use super::literal::{self, is_whitespace};
use super::state::State;
use crate::limits::Limits;
use crate::table::{InsertError, Symbol, Table};
use crate::value::{Array, ArrayError, Value, ValueType};
use std::mem;

/// Accumulates the bytes of one word (section name, symbol name, literal
/// or reference).
#[derive(Debug, Default)]
struct Word {
    bytes: Vec<u8>,
    start: Position,
    /// Whitespace followed the last byte; another byte would start a second word.
    gap: bool,
}

impl Word {
    fn push(&mut self, byte: u8, pos: Position) {
        if self.bytes.is_empty() {
            self.start = pos;
        }
        self.bytes.push(byte);
    }

    fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn clear(&mut self) {
        self.bytes.clear();
        self.gap = false;
    }

    fn take(&mut self) -> Vec<u8> {
        self.gap = false;
        mem::take(&mut self.bytes)
    }
}

/// Progress through the right-hand side of a declaration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Operand {
    /// Reading bare literal bytes (or nothing yet).
    #[default]
    Bare,
    /// Inside `"..."`, opened at the given position.
    Quoted(Position),
    /// After the closing `"` of the literal opened at the given position.
    Closed(Position),
    /// After `@`, collecting the referenced name up to `;`.
    Reference(Position),
}

/// The declaration currently being read.
#[derive(Debug, Default)]
struct Declaration {
    /// Position of the type tag.
    start: Position,
    /// Fully qualified name, set once `=` is reached.
    name: String,
    name_at: Position,
    operand: Operand,
    /// Elements read so far (arrays only).
    array: Option<Array>,
    /// A `,` was read and no element has followed it yet.
    separated: bool,
}

pub(crate) struct Machine<'a, 't> {
    cursor: Cursor<'a>,
    table: &'t mut Table,
    limits: Limits,
    state: State,
    /// Active section, qualifying every name declared after it.
    section: Option<String>,
    word: Word,
    decl: Declaration,
}

impl<'a, 't> Machine<'a, 't> {
    pub fn new(source: &'a [u8], table: &'t mut Table, limits: Limits) -> Self {
        Self {
            cursor: Cursor::new(source),
            table,
            limits,
            state: State::Neutral,
            section: None,
            word: Word::default(),
            decl: Declaration::default(),
        }
    }

    /// Consume the whole source.
    pub fn run(mut self) -> Result<(), LoadError> {
        while let Some((byte, pos)) = self.cursor.next_byte()? {
            self.step(byte, pos)?;
        }
        self.finish()
    }

    fn step(&mut self, byte: u8, pos: Position) -> Result<(), LoadError> {
        if let Operand::Reference(at) = self.decl.operand {
            return self.reference(byte, at);
        }

        match self.state {
            State::Neutral => self.neutral(byte, pos),
            State::SectionWait => self.section_wait(byte, pos),
            State::SectionName => self.section_name(byte, pos),
            State::ArrayTypeSelect => self.array_type_select(byte, pos),
            State::IntegerWait | State::FloatWait | State::StringWait | State::BooleanWait | State::ArrayWait => {
                self.name_wait(byte, pos)
            }
            State::IntegerName | State::FloatName | State::StringName | State::BooleanName | State::ArrayName => {
                self.name(byte, pos)
            }
            State::IntegerValue => self.bare_value(ValueType::Integer, byte, pos),
            State::FloatValue => self.bare_value(ValueType::Float, byte, pos),
            State::BooleanValue => self.bare_value(ValueType::Boolean, byte, pos),
            State::StringValue => self.string_value(byte, pos),
            State::ArrayValue => self.array_value(byte, pos),
        }
    }

    /// End of input: only `Neutral` is a valid place to stop.
    fn finish(self) -> Result<(), LoadError> {
        let kind = match (self.state, self.decl.operand) {
            (State::Neutral, _) => return Ok(()),
            (_, Operand::Quoted(open)) => return Err(self.error(ErrorKind::UnterminatedString, open)),
            (_, Operand::Reference(at)) => return Err(self.error(ErrorKind::UnterminatedReference, at)),
            _ => ErrorKind::UnexpectedEndOfInput,
        };
        Err(self.error(kind, self.cursor.position()))
    }

    fn error(&self, kind: ErrorKind, pos: Position) -> LoadError {
        LoadError::new(kind, pos, self.cursor.source())
    }

    fn enter(&mut self, state: State) {
        tracing::trace!(from = ?self.state, to = ?state, "state transition");
        self.state = state;
    }
}

// ============================================================================
// Sections and declaration heads
// ============================================================================

impl<'a, 't> Machine<'a, 't> {
    fn neutral(&mut self, byte: u8, pos: Position) -> Result<(), LoadError> {
        if is_whitespace(byte) {
            return Ok(());
        }
        if byte == b'[' {
            self.word.clear();
            self.enter(State::SectionWait);
            return Ok(());
        }

        let typ = ValueType::from_tag(byte).ok_or_else(|| self.error(ErrorKind::UnexpectedToken, pos))?;
        self.decl = Declaration {
            start: pos,
            ..Declaration::default()
        };
        self.enter(State::declare(typ));
        Ok(())
    }

    fn section_wait(&mut self, byte: u8, pos: Position) -> Result<(), LoadError> {
        match byte {
            b if is_whitespace(b) => Ok(()),
            b']' | b'[' | b'=' => Err(self.error(ErrorKind::InvalidSectionName, pos)),
            _ => {
                self.word.push(byte, pos);
                self.enter(State::SectionName);
                Ok(())
            }
        }
    }

    fn section_name(&mut self, byte: u8, pos: Position) -> Result<(), LoadError> {
        match byte {
            b']' => {
                let start = self.word.start;
                let name =
                    String::from_utf8(self.word.take()).map_err(|_| self.error(ErrorKind::InvalidSectionName, start))?;
                tracing::debug!(section = %name, "entered section");
                self.section = Some(name);
                self.enter(State::Neutral);
                Ok(())
            }
            b if is_whitespace(b) => {
                self.word.gap = true;
                Ok(())
            }
            // `=` would end the qualified name early when the table is printed
            b'[' | b'=' => Err(self.error(ErrorKind::InvalidSectionName, pos)),
            _ if self.word.gap => Err(self.error(ErrorKind::InvalidSectionName, pos)),
            _ => {
                self.word.push(byte, pos);
                Ok(())
            }
        }
    }

    fn array_type_select(&mut self, byte: u8, pos: Position) -> Result<(), LoadError> {
        if is_whitespace(byte) {
            return Ok(());
        }

        let array = match ValueType::from_tag(byte) {
            Some(ValueType::Array) => return Err(self.error(ErrorKind::NestedArrayUnsupported, pos)),
            Some(element) => Array::new(element),
            None => None,
        };
        let array = array.ok_or_else(|| self.error(ErrorKind::InvalidArrayType, pos))?;

        self.decl.array = Some(array);
        self.enter(self.state.next());
        Ok(())
    }

    fn name_wait(&mut self, byte: u8, pos: Position) -> Result<(), LoadError> {
        match byte {
            b if is_whitespace(b) => Ok(()),
            b'=' => Err(self.error(ErrorKind::InvalidName, pos)),
            _ => {
                self.word.clear();
                self.word.push(byte, pos);
                self.enter(self.state.next());
                Ok(())
            }
        }
    }

    fn name(&mut self, byte: u8, pos: Position) -> Result<(), LoadError> {
        match byte {
            b'=' => {
                self.bind_name()?;
                self.enter(self.state.next());
                Ok(())
            }
            b if is_whitespace(b) => {
                self.word.gap = true;
                Ok(())
            }
            _ if self.word.gap => Err(self.error(ErrorKind::InvalidName, pos)),
            _ => {
                self.word.push(byte, pos);
                Ok(())
            }
        }
    }

    /// Qualify the captured name with the active section and reserve it.
    fn bind_name(&mut self) -> Result<(), LoadError> {
        let start = self.word.start;
        let local = String::from_utf8(self.word.take()).map_err(|_| self.error(ErrorKind::InvalidName, start))?;

        let name = match &self.section {
            Some(section) => format!("{}:{}", section, local),
            None => local,
        };
        if self.table.contains(&name) {
            return Err(self.error(ErrorKind::DuplicateName, start));
        }

        self.decl.name = name;
        self.decl.name_at = start;
        Ok(())
    }
}

// ============================================================================
// Values
// ============================================================================

impl<'a, 't> Machine<'a, 't> {
    /// Integer, float and boolean values: a bare word or a reference.
    fn bare_value(&mut self, typ: ValueType, byte: u8, pos: Position) -> Result<(), LoadError> {
        if self.word.is_empty() {
            if is_whitespace(byte) {
                return Ok(());
            }
            if byte == b'@' {
                self.decl.operand = Operand::Reference(pos);
                return Ok(());
            }
        }

        match byte {
            b';' => {
                let value = self.take_scalar(typ, pos)?;
                self.complete(value, pos)
            }
            _ => self.push_bare(typ, byte, pos),
        }
    }

    /// Add one byte to a bare literal word.
    fn push_bare(&mut self, typ: ValueType, byte: u8, pos: Position) -> Result<(), LoadError> {
        if is_whitespace(byte) {
            self.word.gap = true;
            return Ok(());
        }
        if byte == b'"' && typ.is_numeric() {
            return Err(self.error(ErrorKind::StringLiteralAsNumeric, pos));
        }
        if self.word.gap || !literal::accepts(typ, byte) {
            return Err(self.error(literal::invalid(typ), pos));
        }
        self.word.push(byte, pos);
        Ok(())
    }

    /// Convert the accumulated word; `end` is the separator that closed it.
    fn take_scalar(&mut self, typ: ValueType, end: Position) -> Result<Value, LoadError> {
        if self.word.is_empty() {
            return Err(self.error(literal::invalid(typ), end));
        }
        let start = self.word.start;
        let text = self.word.take();
        literal::scalar(typ, &text).map_err(|kind| self.error(kind, start))
    }

    fn string_value(&mut self, byte: u8, pos: Position) -> Result<(), LoadError> {
        match self.decl.operand {
            Operand::Quoted(open) => {
                if byte == b'"' {
                    self.decl.operand = Operand::Closed(open);
                    Ok(())
                } else {
                    self.push_quoted(byte, pos)
                }
            }
            Operand::Closed(open) => match byte {
                b if is_whitespace(b) => Ok(()),
                b';' => {
                    let text = self.take_string(open)?;
                    self.complete(Value::String(text), pos)
                }
                _ => Err(self.error(ErrorKind::InvalidStringLiteral, pos)),
            },
            Operand::Bare | Operand::Reference(_) => match byte {
                b if is_whitespace(b) => Ok(()),
                b'"' => {
                    self.word.clear();
                    self.decl.operand = Operand::Quoted(pos);
                    Ok(())
                }
                b'@' => {
                    self.decl.operand = Operand::Reference(pos);
                    Ok(())
                }
                _ => Err(self.error(ErrorKind::InvalidStringLiteral, pos)),
            },
        }
    }

    /// Add one byte to a quoted literal, enforcing the string length limit.
    fn push_quoted(&mut self, byte: u8, pos: Position) -> Result<(), LoadError> {
        if self.word.bytes.len() >= self.limits.max_string_length {
            return Err(self.error(ErrorKind::LimitExceeded, pos));
        }
        self.word.push(byte, pos);
        Ok(())
    }

    fn take_string(&mut self, open: Position) -> Result<String, LoadError> {
        String::from_utf8(self.word.take()).map_err(|_| self.error(ErrorKind::InvalidStringLiteral, open))
    }

    fn array_value(&mut self, byte: u8, pos: Position) -> Result<(), LoadError> {
        let (element, started) = match &self.decl.array {
            Some(array) => (array.element_type(), !array.is_empty() || self.decl.separated),
            None => return Err(self.error(ErrorKind::InvalidArrayType, pos)),
        };

        if element == ValueType::String {
            return self.string_element(byte, pos, started);
        }

        if self.word.is_empty() && !started {
            match byte {
                b'@' => {
                    self.decl.operand = Operand::Reference(pos);
                    return Ok(());
                }
                b';' => return self.complete_array(pos),
                _ => {}
            }
        }
        if self.word.is_empty() && is_whitespace(byte) {
            return Ok(());
        }

        match byte {
            b',' | b';' => {
                let value = self.take_scalar(element, pos)?;
                self.append(value, pos)?;
                if byte == b';' {
                    self.complete_array(pos)
                } else {
                    self.decl.separated = true;
                    Ok(())
                }
            }
            _ => self.push_bare(element, byte, pos),
        }
    }

    fn string_element(&mut self, byte: u8, pos: Position, started: bool) -> Result<(), LoadError> {
        match self.decl.operand {
            Operand::Quoted(open) => {
                if byte == b'"' {
                    let text = self.take_string(open)?;
                    self.append(Value::String(text), open)?;
                    self.decl.operand = Operand::Closed(open);
                    Ok(())
                } else {
                    self.push_quoted(byte, pos)
                }
            }
            Operand::Closed(_) => match byte {
                b if is_whitespace(b) => Ok(()),
                b',' => {
                    self.decl.operand = Operand::Bare;
                    self.decl.separated = true;
                    Ok(())
                }
                b';' => self.complete_array(pos),
                _ => Err(self.error(ErrorKind::InvalidStringLiteral, pos)),
            },
            Operand::Bare | Operand::Reference(_) => match byte {
                b if is_whitespace(b) => Ok(()),
                b'"' => {
                    self.word.clear();
                    self.decl.operand = Operand::Quoted(pos);
                    Ok(())
                }
                b'@' if !started => {
                    self.decl.operand = Operand::Reference(pos);
                    Ok(())
                }
                b';' if !started => self.complete_array(pos),
                _ => Err(self.error(ErrorKind::InvalidStringLiteral, pos)),
            },
        }
    }

    /// Append one element to the array being read.
    fn append(&mut self, value: Value, at: Position) -> Result<(), LoadError> {
        let max = self.limits.max_array_elements;
        let result = match self.decl.array.as_mut() {
            Some(array) if array.len() >= max => Err(ErrorKind::LimitExceeded),
            Some(array) => array.push(value).map_err(|err| match err {
                ArrayError::Allocation(_) => ErrorKind::AllocationFailure,
                ArrayError::TypeMismatch { expected, .. } => literal::invalid(expected),
            }),
            None => Err(ErrorKind::InvalidArrayType),
        };
        result.map_err(|kind| self.error(kind, at))?;
        self.decl.separated = false;
        Ok(())
    }

    fn complete_array(&mut self, pos: Position) -> Result<(), LoadError> {
        let array = self
            .decl
            .array
            .take()
            .ok_or_else(|| self.error(ErrorKind::InvalidArrayType, pos))?;
        self.complete(Value::Array(array), pos)
    }

    /// Collect a reference name up to `;`, then resolve it.
    fn reference(&mut self, byte: u8, at: Position) -> Result<(), LoadError> {
        if byte != b';' {
            self.word.bytes.push(byte);
            return Ok(());
        }

        let bytes = self.word.take();
        let value = self.resolve(&bytes, at)?;
        self.decl.operand = Operand::Bare;
        self.complete(value, at)
    }

    /// Copy the referenced symbol's value into the type being declared.
    fn resolve(&self, name: &[u8], at: Position) -> Result<Value, LoadError> {
        let name = trim(name);
        if name.is_empty() || name.iter().any(|&b| is_whitespace(b)) {
            return Err(self.error(ErrorKind::InvalidName, at));
        }
        let name = std::str::from_utf8(name).map_err(|_| self.error(ErrorKind::InvalidName, at))?;

        let source = self
            .table
            .symbol(name)
            .ok_or_else(|| self.error(ErrorKind::UndefinedReference, at))?;

        let value = match (self.state.value_type(), &self.decl.array) {
            (Some(ValueType::Array), Some(target)) => source
                .value()
                .as_array()
                .and_then(|array| array.coerce(target.element_type()))
                .map(Value::Array),
            (Some(typ), _) => source.value().coerce(typ),
            (None, _) => None,
        };
        value.ok_or_else(|| self.error(ErrorKind::ReferenceTypeMismatch, at))
    }

    /// Finalise the current declaration and return to `Neutral`.
    fn complete(&mut self, value: Value, pos: Position) -> Result<(), LoadError> {
        if self.table.len() >= self.limits.max_symbols {
            return Err(self.error(ErrorKind::LimitExceeded, self.decl.start));
        }

        let name = mem::take(&mut self.decl.name);
        let name_at = self.decl.name_at;
        let symbol = Symbol::new(name, value);
        tracing::debug!(name = symbol.name(), typ = %symbol.typ(), "declared symbol");

        self.table.insert(symbol).map_err(|err| match err {
            InsertError::Duplicate(_) => self.error(ErrorKind::DuplicateName, name_at),
            InsertError::Allocation(_) => self.error(ErrorKind::AllocationFailure, pos),
        })?;

        self.word.clear();
        self.decl = Declaration::default();
        self.enter(State::Neutral);
        Ok(())
    }
}

fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_whitespace(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&b| !is_whitespace(b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}
