//! Character-level source stream
//!
//! [`SourceStream`] owns the full input text and a cursor into it. The
//! line index is computed once at construction. The cursor's line and
//! column are advanced along with it, so reading them is constant time;
//! only seeks go through the line index.

use super::error::GrammarError;
use super::source_location::{floor_char_boundary, LineIndex, Position};

/// The input text plus a byte cursor
#[derive(Debug, Clone)]
pub struct SourceStream {
    text: String,
    lines: LineIndex,
    offset: usize,
    position: Position,
}

impl SourceStream {
    /// Create a stream positioned at the start of `text`
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = LineIndex::new(&text);
        Self {
            text,
            lines,
            offset: 0,
            position: Position::start(),
        }
    }

    /// The next character, without consuming it
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.peek_remainder().chars().next()
    }

    /// Consume and return the next character
    #[inline]
    pub fn get(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.advance(ch.len_utf8());
        Some(ch)
    }

    /// Everything from the cursor to the end of the text
    #[inline]
    pub fn peek_remainder(&self) -> &str {
        &self.text[self.offset..]
    }

    /// Advance by `n` characters (stopping at the end)
    pub fn ignore(&mut self, n: usize) {
        let skipped: usize = self
            .peek_remainder()
            .chars()
            .take(n)
            .map(char::len_utf8)
            .sum();
        self.advance(skipped);
    }

    /// Move the cursor forward `len` bytes, updating line and column
    fn advance(&mut self, len: usize) {
        let skipped = &self.text[self.offset..self.offset + len];
        match memchr::memrchr(b'\n', skipped.as_bytes()) {
            Some(last) => {
                self.position.line += memchr::memchr_iter(b'\n', skipped.as_bytes()).count();
                self.position.column = skipped[last + 1..].chars().count() + 1;
            }
            None => self.position.column += skipped.chars().count(),
        }
        self.offset += len;
    }

    /// Current byte offset
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Move the cursor, clamping into `[0, len]` and onto a char boundary
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = floor_char_boundary(&self.text, offset);
        self.position = self.lines.position_at(&self.text, self.offset);
    }

    /// True once the cursor has reached the end of the text
    #[inline]
    pub fn is_end_of_stream(&self) -> bool {
        self.offset == self.text.len()
    }

    /// Line and column of the cursor
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Move the cursor to a line and column
    ///
    /// # Errors
    /// Returns [`GrammarError::InvalidPosition`] when the position does not
    /// exist in the text; the cursor is left unchanged.
    pub fn set_position(&mut self, position: Position) -> Result<(), GrammarError> {
        self.offset = self.offset_of(position)?;
        self.position = position;
        Ok(())
    }

    /// Position of an arbitrary byte offset
    pub fn position_at(&self, offset: usize) -> Position {
        self.lines.position_at(&self.text, offset)
    }

    /// Byte offset of an arbitrary position
    pub fn offset_of(&self, position: Position) -> Result<usize, GrammarError> {
        self.lines.offset_of(&self.text, position)
    }

    /// `len` bytes starting at `start`, if that range is valid
    pub fn slice(&self, start: usize, len: usize) -> Option<&str> {
        self.text.get(start..start.checked_add(len)?)
    }

    /// The whole text
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True for an empty text
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of lines in the text
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_and_get() {
        let mut stream = SourceStream::new("aé");
        assert_eq!(stream.peek(), Some('a'));
        assert_eq!(stream.get(), Some('a'));
        assert_eq!(stream.get(), Some('é'));
        assert_eq!(stream.offset(), 3);
        assert!(stream.is_end_of_stream());
        assert_eq!(stream.get(), None);
        assert_eq!(stream.peek(), None);
    }

    #[test]
    fn test_ignore_and_remainder() {
        let mut stream = SourceStream::new("hello world");
        stream.ignore(6);
        assert_eq!(stream.peek_remainder(), "world");
        stream.ignore(100);
        assert!(stream.is_end_of_stream());
    }

    #[test]
    fn test_set_offset_clamps() {
        let mut stream = SourceStream::new("aé!");
        stream.set_offset(2);
        assert_eq!(stream.offset(), 1);
        stream.set_offset(50);
        assert_eq!(stream.offset(), 4);
        assert!(stream.is_end_of_stream());
    }

    #[test]
    fn test_position() {
        let mut stream = SourceStream::new("one\ntwo\nthree");
        stream.ignore(5);
        assert_eq!(stream.position(), Position::new(2, 2));
        assert_eq!(stream.line_count(), 3);
    }

    #[test]
    fn test_position_tracks_cursor() {
        let mut stream = SourceStream::new("ab\r\nçd\n\nxyz");
        let mut steps = 0;
        while !stream.is_end_of_stream() {
            stream.ignore(1 + steps % 3);
            assert_eq!(stream.position(), stream.position_at(stream.offset()));
            steps += 1;
        }
        assert_eq!(stream.position(), Position::new(4, 4));

        stream.set_offset(4);
        assert_eq!(stream.position(), Position::new(2, 1));
        stream.get();
        assert_eq!(stream.position(), Position::new(2, 2));
    }

    #[test]
    fn test_set_position() {
        let mut stream = SourceStream::new("one\ntwo");
        stream.set_position(Position::new(2, 3)).unwrap();
        assert_eq!(stream.peek(), Some('o'));
        stream.set_position(Position::new(2, 4)).unwrap();
        assert!(stream.is_end_of_stream());
    }

    #[test]
    fn test_set_position_rejects_invalid() {
        let mut stream = SourceStream::new("one\ntwo");
        stream.ignore(2);
        let result = stream.set_position(Position::new(3, 1));
        assert!(matches!(result, Err(GrammarError::InvalidPosition { .. })));
        assert_eq!(stream.offset(), 2);
        assert!(stream.set_position(Position::new(1, 6)).is_err());
        assert!(stream.set_position(Position::new(1, 0)).is_err());
    }

    #[test]
    fn test_slice() {
        let stream = SourceStream::new("abcdef");
        assert_eq!(stream.slice(2, 3), Some("cde"));
        assert_eq!(stream.slice(4, 10), None);
        assert_eq!(stream.slice(usize::MAX, 2), None);
    }
}
