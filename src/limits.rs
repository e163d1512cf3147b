//! Implementation limits for KOML loading.
//!
//! These bound how much storage a single document can make the loader
//! allocate, so a hostile or corrupt buffer fails with a positioned error
//! instead of exhausting memory.

/// Default maximum number of symbols in one table.
pub const MAX_SYMBOLS: usize = 1_000_000;

/// Default maximum number of elements in one array.
pub const MAX_ARRAY_ELEMENTS: usize = 1_000_000;

/// Default maximum byte length of one string value or string element.
pub const MAX_STRING_LENGTH: usize = 16 * 1024 * 1024;

/// Limits applied by a [`Loader`](crate::Loader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_symbols: usize,
    pub max_array_elements: usize,
    pub max_string_length: usize,
}

impl Limits {
    /// No limits beyond available memory.
    pub const UNLIMITED: Limits = Limits {
        max_symbols: usize::MAX,
        max_array_elements: usize::MAX,
        max_string_length: usize::MAX,
    };
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_symbols: MAX_SYMBOLS,
            max_array_elements: MAX_ARRAY_ELEMENTS,
            max_string_length: MAX_STRING_LENGTH,
        }
    }
}
