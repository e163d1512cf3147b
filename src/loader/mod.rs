//! KOML loading.
//!
//! A document is read in a single pass by a byte-driven state machine that
//! fills a [`Table`] as it goes, resolving `@name;` references against the
//! symbols declared so far.
//!
//! # Example
//!
//! ```
//! use koml::Loader;
//!
//! let table = Loader::new(b"[net]\ni port = 8080;\nf ratio = @net:port;").load().unwrap();
//!
//! assert_eq!(table.get_integer("net:port"), Some(8080));
//! assert_eq!(table.get_float("net:ratio"), Some(8080.0));
//! ```
//!
//! # Error Handling
//!
//! Loading stops at the first error. The returned [`LoadError`] renders the
//! offending line with a caret under the column:
//!
//! ```
//! use koml::{ErrorKind, Loader};
//!
//! let err = Loader::new(b"i bad = \"oops\";").load().unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::StringLiteralAsNumeric);
//! assert_eq!((err.line(), err.column()), (1, 9));
//! ```

mod cursor;
mod error;
mod literal;
mod machine;
mod state;

pub use cursor::Position;
pub use error::{ErrorKind, LoadError};

use crate::limits::Limits;
use crate::table::Table;
use machine::Machine;

/// Loads one KOML buffer.
#[derive(Debug, Clone, Copy)]
pub struct Loader<'a> {
    source: &'a [u8],
    limits: Limits,
}

impl<'a> Loader<'a> {
    /// A loader over `source` with the default [`Limits`].
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            limits: Limits::default(),
        }
    }

    /// Replace the default [`Limits`].
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Load the buffer into a fresh table.
    pub fn load(&self) -> Result<Table, LoadError> {
        let mut table = Table::new();
        self.load_into(&mut table)?;
        Ok(table)
    }

    /// Load the buffer, appending to `table`.
    ///
    /// On error the table keeps every symbol completed before the failure;
    /// the symbol being declared when it failed is never added. Existing
    /// symbols can be referenced, and redeclaring one is a
    /// [`ErrorKind::DuplicateName`] error.
    pub fn load_into(&self, table: &mut Table) -> Result<(), LoadError> {
        let before = table.len();
        tracing::debug!(bytes = self.source.len(), "loading");

        match Machine::new(self.source, table, self.limits).run() {
            Ok(()) => {
                tracing::debug!(symbols = table.len() - before, "loaded");
                Ok(())
            }
            Err(err) => {
                tracing::debug!(
                    kind = ?err.kind(),
                    line = err.line(),
                    column = err.column(),
                    kept = table.len() - before,
                    "load aborted"
                );
                Err(err)
            }
        }
    }
}

/// Load a KOML buffer with default limits.
pub fn load(source: &[u8]) -> Result<Table, LoadError> {
    Loader::new(source).load()
}

/// Load KOML text with default limits.
pub fn load_str(source: &str) -> Result<Table, LoadError> {
    load(source.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_into_extends_existing_table() {
        let mut table = load_str("i base = 10;").unwrap();
        Loader::new(b"f scaled = @base;").load_into(&mut table).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get_float("scaled"), Some(10.0));
    }

    #[test]
    fn load_into_rejects_redeclaration() {
        let mut table = load_str("i base = 10;").unwrap();
        let err = Loader::new(b"i base = 11;").load_into(&mut table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateName);
        assert_eq!(table.get_integer("base"), Some(10));
    }

    #[test]
    fn limits_are_applied() {
        let limits = Limits {
            max_symbols: 1,
            ..Limits::default()
        };
        let err = Loader::new(b"i a = 1; i b = 2;").with_limits(limits).load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
        assert!(Loader::new(b"i a = 1; i b = 2;").with_limits(Limits::UNLIMITED).load().is_ok());
    }

    #[test]
    fn from_str_loads() {
        let table: Table = "b on = t;".parse().unwrap();
        assert_eq!(table.get_boolean("on"), Some(true));
        assert!("b on = maybe;".parse::<Table>().is_err());
    }
}
