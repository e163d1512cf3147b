//! Error types for KOML loading.

use super::cursor::Position;
use std::fmt;

/// What went wrong while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
    #[error("Comment never ended")]
    UnterminatedComment,
    #[error("Invalid section name")]
    InvalidSectionName,
    #[error("Invalid name")]
    InvalidName,
    #[error("String literal never ended")]
    UnterminatedString,
    #[error("Invalid string literal")]
    InvalidStringLiteral,
    #[error("Failed to allocate storage")]
    AllocationFailure,
    #[error("Invalid boolean value")]
    InvalidBooleanValue,
    #[error("Invalid array type")]
    InvalidArrayType,
    #[error("Arrays of arrays are not supported")]
    NestedArrayUnsupported,
    #[error("Invalid integer value")]
    InvalidIntegerValue,
    #[error("Invalid float value")]
    InvalidFloatValue,
    #[error("A string literal is not a valid numeric value")]
    StringLiteralAsNumeric,
    #[error("Variable reference never ended")]
    UnterminatedReference,
    #[error("Variable reference to undefined symbol")]
    UndefinedReference,
    #[error("Invalid type of variable reference")]
    ReferenceTypeMismatch,
    #[error("Unexpected token")]
    UnexpectedToken,
    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("Symbol declared more than once")]
    DuplicateName,
    #[error("Implementation limit exceeded")]
    LimitExceeded,
}

/// A load failure, positioned in the source.
///
/// Carries an owned copy of the offending source line so it can be rendered
/// after the input buffer is gone. `Display` renders the full diagnostic:
///
/// ```text
/// Invalid integer value (line 1: column 8)
///   | i x = 5a;
///   |        ^
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct LoadError {
    kind: ErrorKind,
    position: Position,
    /// Text of the source line containing `position`.
    source_line: String,
    /// Padding that puts a caret under `position` (tabs are kept as tabs).
    caret_padding: String,
}

impl LoadError {
    /// Create an error at `position`, capturing the source line it falls on.
    pub fn new(kind: ErrorKind, position: Position, source: &[u8]) -> Self {
        let line = source
            .split(|&b| b == b'\n')
            .nth(position.line.saturating_sub(1))
            .unwrap_or(&[]);
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        let caret_padding = line
            .iter()
            .take(position.column.saturating_sub(1))
            .map(|&b| if b == b'\t' { '\t' } else { ' ' })
            .collect();

        Self {
            kind,
            position,
            source_line: String::from_utf8_lossy(line).into_owned(),
            caret_padding,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Line number (1-indexed).
    pub fn line(&self) -> usize {
        self.position.line
    }

    /// Column number (1-indexed, in bytes).
    pub fn column(&self) -> usize {
        self.position.column
    }

    /// The source line the error points into.
    pub fn source_line(&self) -> &str {
        &self.source_line
    }

    /// The caret line, `^` under the offending column.
    pub fn caret(&self) -> String {
        format!("{}^", self.caret_padding)
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}: column {})\n  | {}\n  | {}",
            self.kind,
            self.position.line,
            self.position.column,
            self.source_line,
            self.caret()
        )
    }
}

impl std::error::Error for LoadError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset: usize, line: usize, column: usize) -> Position {
        Position { offset, line, column }
    }

    #[test]
    fn error_display() {
        let err = LoadError::new(ErrorKind::InvalidIntegerValue, at(7, 1, 8), b"i x = 5a;");
        assert_eq!(
            err.to_string(),
            "Invalid integer value (line 1: column 8)\n  | i x = 5a;\n  |        ^"
        );
    }

    #[test]
    fn picks_the_right_line() {
        let source = b"i a = 1;\r\ni b = x;\ni c = 3;";
        let err = LoadError::new(ErrorKind::InvalidIntegerValue, at(16, 2, 7), source);
        assert_eq!(err.source_line(), "i b = x;");
        assert_eq!(err.caret(), "      ^");
    }

    #[test]
    fn caret_follows_tabs() {
        let err = LoadError::new(ErrorKind::UnexpectedToken, at(2, 1, 3), b"\t\tz");
        assert_eq!(err.caret(), "\t\t^");
    }

    #[test]
    fn position_past_end_of_line() {
        let err = LoadError::new(ErrorKind::UnexpectedEndOfInput, at(6, 2, 1), b"i x =\n");
        assert_eq!(err.source_line(), "");
        assert_eq!(err.caret(), "^");
    }

    #[test]
    fn kind_messages() {
        assert_eq!(ErrorKind::UndefinedReference.to_string(), "Variable reference to undefined symbol");
        assert_eq!(ErrorKind::NestedArrayUnsupported.to_string(), "Arrays of arrays are not supported");
    }
}
