//! A single-pass loader for KOML, a compact TOML-like configuration language.
//!
//! KOML documents are sequences of typed declarations, optionally grouped
//! under section directives, with `|comments|` allowed anywhere:
//!
//! ```text
//! [server]
//! s host = "localhost";
//! i port = 8080;
//! a i fallback_ports = 8081, 8082;
//! f timeout = @server:port;   |references copy earlier values|
//! ```
//!
//! # Modules
//!
//! - [`loader`] -- The state machine that turns bytes into a [`Table`].
//! - [`table`] -- The ordered, name-indexed symbol table.
//! - [`value`] -- Values, arrays and their types.
//! - [`limits`] -- Implementation limits applied while loading.
//!
//! # Example
//!
//! ```
//! let table = koml::load_str(r#"
//!     [server]
//!     s host = "localhost";
//!     i port = 8080;
//!     a i fallback_ports = 8081, 8082;
//! "#).unwrap();
//!
//! assert_eq!(table.get_string("server:host"), Some("localhost"));
//! assert_eq!(table.get_integer("server:port"), Some(8080));
//! assert_eq!(table.get_array("server:fallback_ports").map(|a| a.len()), Some(2));
//!
//! // Printing a table produces KOML that loads back to the same symbols.
//! let reloaded = koml::load_str(&table.to_string()).unwrap();
//! assert_eq!(reloaded, table);
//! ```

pub mod limits;
pub mod loader;
pub mod table;
pub mod value;

pub use limits::Limits;
pub use loader::{load, load_str, ErrorKind, LoadError, Loader, Position};
pub use table::{Symbol, Table};
pub use value::{Array, Value, ValueType};
