//! Source Location Utilities
//!
//! Line/column positions and the line-start index used to convert between
//! byte offsets and positions. Offsets are byte offsets into a UTF-8 buffer
//! and always sit on a character boundary; columns count characters.

use super::error::GrammarError;
use serde::Serialize;
use std::fmt;

/// A position in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, counted in characters)
    pub column: usize,
}

impl Position {
    /// Create a new position
    #[inline]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position of the first character of any input
    #[inline]
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.column)
    }
}

/// Byte offsets at which each line of a text begins
///
/// Built once per text. A new line starts after every `\n`, so a text
/// ending in `\n` has a final empty line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    /// Scan `text` for line terminators
    pub fn new(text: &str) -> Self {
        let mut starts = Vec::with_capacity(text.len() / 32 + 1);
        starts.push(0);
        starts.extend(memchr::memchr_iter(b'\n', text.as_bytes()).map(|i| i + 1));
        Self { starts }
    }

    /// Number of lines (at least one, even for empty text)
    #[inline]
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Byte offset where `line` (1-based) begins
    #[inline]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1).and_then(|i| self.starts.get(i)).copied()
    }

    /// Byte offset one past the end of `line`, including its terminator
    fn line_end(&self, text: &str, line: usize) -> usize {
        self.starts.get(line).copied().unwrap_or(text.len())
    }

    /// Convert a byte offset into a position
    ///
    /// Offsets past the end are clamped to the end of `text`; offsets inside
    /// a multi-byte character are floored to that character's start.
    pub fn position_at(&self, text: &str, offset: usize) -> Position {
        let offset = floor_char_boundary(text, offset);
        // starts[0] == 0, so the partition point is at least 1
        let line = self.starts.partition_point(|&start| start <= offset);
        let start = self.starts[line - 1];
        let column = text[start..offset].chars().count() + 1;
        Position { line, column }
    }

    /// Convert a position into a byte offset
    ///
    /// The column may point one past the last character of its line.
    ///
    /// # Errors
    /// Returns [`GrammarError::InvalidPosition`] for a zero line or column,
    /// a line beyond the last one, or a column beyond the line width + 1.
    pub fn offset_of(&self, text: &str, position: Position) -> Result<usize, GrammarError> {
        let invalid = || GrammarError::InvalidPosition { position };

        if position.column == 0 {
            return Err(invalid());
        }
        let start = self.line_start(position.line).ok_or_else(invalid)?;
        let end = self.line_end(text, position.line);
        let line = &text[start..end];

        let wanted = position.column - 1;
        match line.char_indices().nth(wanted) {
            Some((byte, _)) => Ok(start + byte),
            None if line.chars().count() == wanted => Ok(end),
            None => Err(invalid()),
        }
    }
}

/// Largest char boundary of `text` not greater than `offset`
pub(crate) fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
