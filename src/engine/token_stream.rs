//! Lazily materialized token stream
//!
//! [`TokenStream`] lexes on demand and caches every token it produces, so
//! backtracking is a plain cursor reset over the cache. The cache stores
//! tokens unfiltered; patterns in the [`IgnoreSet`] are skipped while the
//! cursor moves.
//!
//! The stream also keeps the furthest-reaching failure seen so far, since
//! a node that recovers from a failure (an optional element, a list that
//! ends early) discards the error that explains a later mismatch.

use super::error::{GrammarError, ParseError};
use super::lexer::{Lexer, PatternId, Token};
use super::source_location::Position;
use super::stream::SourceStream;
use hashbrown::HashSet;

/// Pattern ids to skip transparently
///
/// Never contains [`PatternId::EndOfStream`]: skipping it would leave a
/// token stream with nothing to return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    ids: HashSet<PatternId>,
}

impl IgnoreSet {
    /// An empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an id
    ///
    /// # Errors
    /// Returns [`GrammarError::IgnoredEndOfStream`] for the end-of-stream
    /// sentinel.
    pub fn insert(&mut self, id: impl Into<PatternId>) -> Result<bool, GrammarError> {
        let id = id.into();
        if id.is_end_of_stream() {
            return Err(GrammarError::IgnoredEndOfStream);
        }
        Ok(self.ids.insert(id))
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, id: impl Into<PatternId>) -> Result<Self, GrammarError> {
        self.insert(id)?;
        Ok(self)
    }

    /// True if tokens of this pattern are skipped
    #[inline]
    pub fn contains(&self, id: &PatternId) -> bool {
        !self.ids.is_empty() && self.ids.contains(id)
    }

    /// Number of ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if nothing is skipped
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over the ids
    pub fn iter(&self) -> impl Iterator<Item = &PatternId> {
        self.ids.iter()
    }
}

// Names always map to user ids, so these conversions cannot fail.

impl<'a> FromIterator<&'a str> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(PatternId::user).collect(),
        }
    }
}

impl<const N: usize> From<[&str; N]> for IgnoreSet {
    fn from(names: [&str; N]) -> Self {
        names.into_iter().collect()
    }
}

/// Cursor over the tokens a lexer produces from one source text
pub struct TokenStream<'l, T = String> {
    lexer: &'l Lexer<T>,
    source: SourceStream,
    tokens: Vec<Token<T>>,
    offset: usize,
    ignores: IgnoreSet,
    furthest: Option<(Position, ParseError)>,
}

impl<'l, T> TokenStream<'l, T>
where
    T: Clone + for<'a> From<&'a str>,
{
    /// Create a stream over `text`, skipping tokens in `ignores`
    pub fn new(lexer: &'l Lexer<T>, text: impl Into<String>, ignores: IgnoreSet) -> Self {
        Self {
            lexer,
            source: SourceStream::new(text),
            tokens: Vec::new(),
            offset: 0,
            ignores,
            furthest: None,
        }
    }

    /// Return the next non-ignored token and advance past it
    ///
    /// The cursor pins on the end-of-stream token: once it is returned,
    /// every further call returns it again.
    pub fn get(&mut self) -> Token<T> {
        loop {
            while self.tokens.len() <= self.offset && !self.is_end_of_stream() {
                let token = self.lexer.lex(&mut self.source);
                self.tokens.push(token);
            }

            let token = self.tokens[self.offset].clone();
            if !token.is_end_of_stream() {
                self.offset += 1;
            }
            if !self.ignores.contains(&token.pattern) {
                return token;
            }
        }
    }

    /// Return the next non-ignored token without moving the cursor
    pub fn peek(&mut self) -> Token<T> {
        let offset = self.offset;
        let token = self.get();
        self.offset = offset;
        token
    }

    /// Current index into the token cache
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Rewind (or advance) to a cache index, clamped into `[0, cached - 1]`
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset.min(self.tokens.len().saturating_sub(1));
    }

    /// True once the end-of-stream token has been lexed
    #[inline]
    pub fn is_end_of_stream(&self) -> bool {
        self.tokens.last().is_some_and(Token::is_end_of_stream)
    }

    /// Position of the token [`get`](Self::get) would return next
    pub fn position(&mut self) -> Position {
        self.peek().position
    }

    /// The underlying character stream
    pub fn source(&self) -> &SourceStream {
        &self.source
    }

    /// Number of tokens lexed so far
    pub fn cached_len(&self) -> usize {
        self.tokens.len()
    }

    /// The ignore set applied by this stream
    pub fn ignores(&self) -> &IgnoreSet {
        &self.ignores
    }

    /// Remember `error` if it reached at least as far as any earlier failure
    ///
    /// On a tie the later error wins; errors are recorded as they unwind,
    /// so that is the one carrying the most enclosing rules.
    pub fn record_failure(&mut self, error: &ParseError) {
        let deepest = error.deepest_position();
        if self.furthest.as_ref().map_or(true, |(furthest, _)| deepest >= *furthest) {
            self.furthest = Some((deepest, error.clone()));
        }
    }

    /// The furthest-reaching failure recorded so far
    pub fn furthest_failure(&self) -> Option<&ParseError> {
        self.furthest.as_ref().map(|(_, error)| error)
    }

    /// Take the recorded failure, leaving none
    pub fn take_furthest_failure(&mut self) -> Option<ParseError> {
        self.furthest.take().map(|(_, error)| error)
    }

    /// Attach the recorded failure to `error` if it got further
    pub fn explain(&mut self, error: ParseError) -> ParseError {
        match self.take_furthest_failure() {
            Some(furthest) if furthest.deepest_position() > error.deepest_position() => {
                error.with_cause(furthest)
            }
            _ => error,
        }
    }
}
