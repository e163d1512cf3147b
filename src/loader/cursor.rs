//! Byte-level cursor for navigating KOML source.
//!
//! The cursor hands the state machine one byte at a time while tracking
//! position information (byte offset, line, column) for error reporting.
//! Comments are stripped here, before any byte reaches the state machine:
//! a `|` starts a comment wherever it appears, including inside quoted
//! strings and references.

use super::error::{ErrorKind, LoadError};

/// Location of one byte in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Byte offset from start of source.
    pub offset: usize,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, counts bytes).
    pub column: usize,
}

impl Position {
    /// The first byte of the source.
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 1,
    };
}

impl Default for Position {
    fn default() -> Self {
        Position::START
    }
}

const COMMENT_DELIMITER: u8 = b'|';

/// A cursor over source bytes.
///
/// Line and column advance on every consumed byte, comment bytes included,
/// so positions always match what an editor shows for the raw buffer.
pub struct Cursor<'a> {
    /// The complete source.
    source: &'a [u8],
    /// Current byte offset from start of source.
    offset: usize,
    /// Current line number (1-indexed).
    line: usize,
    /// Current column number (1-indexed).
    column: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of the source.
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Get the position of the next byte to be consumed.
    pub fn position(&self) -> Position {
        Position {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    /// Consume one raw byte, comment or not.
    fn advance(&mut self) -> Option<u8> {
        let byte = *self.source.get(self.offset)?;
        self.offset += 1;

        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(byte)
    }

    /// Consume the next byte that is not part of a comment, returning it
    /// together with its position.
    ///
    /// Returns `Ok(None)` at end of input and an `UnterminatedComment` error
    /// (positioned at the opening `|`) if a comment runs off the end.
    pub fn next_byte(&mut self) -> Result<Option<(u8, Position)>, LoadError> {
        loop {
            let pos = self.position();
            let byte = match self.advance() {
                Some(b) => b,
                None => return Ok(None),
            };

            if byte != COMMENT_DELIMITER {
                return Ok(Some((byte, pos)));
            }

            loop {
                match self.advance() {
                    Some(COMMENT_DELIMITER) => break,
                    Some(_) => {}
                    None => return Err(LoadError::new(ErrorKind::UnterminatedComment, pos, self.source)),
                }
            }
        }
    }
}
