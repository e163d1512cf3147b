//! The symbol table produced by loading a KOML document.
//!
//! Symbols are kept in declaration order. A name index keyed by the fully
//! qualified symbol name provides lookup; it hashes with DJB2 but always
//! confirms a hit by comparing the names themselves, so two names whose
//! hashes collide stay distinct.

use crate::value::{Array, Value, ValueType};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::{HashMap, TryReserveError};
use std::fmt;
use std::hash::{BuildHasherDefault, Hasher};

/// DJB2 hash of a byte string (seed 5381, `hash * 33 + byte`).
pub fn djb2(bytes: &[u8]) -> u64 {
    djb2_extend(DJB2_SEED, bytes)
}

const DJB2_SEED: u64 = 5381;

fn djb2_extend(hash: u64, bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(hash, |hash, &b| hash.wrapping_mul(33).wrapping_add(u64::from(b)))
}

/// [`Hasher`] running DJB2 over everything written to it.
#[derive(Debug, Clone, Copy)]
pub struct Djb2Hasher(u64);

impl Default for Djb2Hasher {
    fn default() -> Self {
        Djb2Hasher(DJB2_SEED)
    }
}

impl Hasher for Djb2Hasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0 = djb2_extend(self.0, bytes);
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

type NameIndex = HashMap<String, usize, BuildHasherDefault<Djb2Hasher>>;

/// One named, typed declaration.
///
/// The type is always the type of the held value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    name: String,
    value: Value,
}

impl Symbol {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Fully qualified name (`section:local` or bare `local`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn typ(&self) -> ValueType {
        self.value.typ()
    }

    /// See [`Value::stride`].
    pub fn stride(&self) -> usize {
        self.value.stride()
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Renders the symbol as a KOML declaration: `i name = 5;`.
impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Array(array) if array.is_empty() => {
                write!(f, "a {} {} = ;", array.element_type().tag(), self.name)
            }
            Value::Array(array) => {
                write!(f, "a {} {} = {};", array.element_type().tag(), self.name, array)
            }
            value => write!(f, "{} {} = {};", value.typ().tag(), self.name, value),
        }
    }
}

/// Error returned when a symbol cannot be added to a [`Table`].
#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("symbol already declared: {0}")]
    Duplicate(String),
    #[error("failed to grow symbol table: {0}")]
    Allocation(#[from] TryReserveError),
}

/// An ordered, name-indexed collection of symbols.
#[derive(Debug, Clone, Default)]
pub struct Table {
    symbols: Vec<Symbol>,
    index: NameIndex,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All symbols in declaration order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    /// Look up a symbol by its fully qualified name.
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).and_then(|&i| self.symbols.get(i))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get_integer(&self, name: &str) -> Option<i32> {
        self.symbol(name).and_then(|s| s.value().as_integer())
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.symbol(name).and_then(|s| s.value().as_float())
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.symbol(name).and_then(|s| s.value().as_str())
    }

    pub fn get_boolean(&self, name: &str) -> Option<bool> {
        self.symbol(name).and_then(|s| s.value().as_bool())
    }

    pub fn get_array(&self, name: &str) -> Option<&Array> {
        self.symbol(name).and_then(|s| s.value().as_array())
    }

    /// Append a fully built symbol.
    ///
    /// Fails without modifying the table if the name is already present or
    /// storage cannot grow.
    pub fn insert(&mut self, symbol: Symbol) -> Result<(), InsertError> {
        if self.index.contains_key(symbol.name()) {
            return Err(InsertError::Duplicate(symbol.name));
        }
        self.symbols.try_reserve(1)?;
        self.index.try_reserve(1)?;

        self.index.insert(symbol.name.clone(), self.symbols.len());
        self.symbols.push(symbol);
        Ok(())
    }

    /// A `name (type): value` listing in braces, for debugging output.
    pub fn describe(&self) -> Describe<'_> {
        Describe(self)
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

impl std::str::FromStr for Table {
    type Err = crate::loader::LoadError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        crate::loader::load_str(source)
    }
}

/// Renders the whole table as KOML, one declaration per line.
///
/// Names are written fully qualified and no section directives are emitted,
/// so loading the output yields the same symbols.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            writeln!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

/// Serialises as a map of qualified name to value, in declaration order.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.symbols.len()))?;
        for symbol in &self.symbols {
            map.serialize_entry(symbol.name(), symbol.value())?;
        }
        map.end()
    }
}

/// Debug listing returned by [`Table::describe`].
pub struct Describe<'a>(&'a Table);

impl fmt::Display for Describe<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for symbol in self.0 {
            write!(f, "  {} ({}): ", symbol.name(), symbol.typ())?;
            describe_value(f, symbol.value())?;
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}

fn describe_value(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Float(v) => write!(f, "{:.6}", v),
        Value::Array(array) => {
            write!(f, "({}) [ ", array.element_type())?;
            for (i, element) in array.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                describe_value(f, &element)?;
            }
            f.write_str(" ]")
        }
        other => write!(f, "{}", other),
    }
}
