//! Longest-match Regex Lexer
//!
//! A [`Lexer`] holds an ordered list of named patterns. Each call to
//! [`Lexer::lex`] tries every pattern anchored at the stream cursor and
//! keeps the longest match. On a length tie the pattern registered first
//! wins, so keywords registered before a generic identifier pattern take
//! precedence over it.
//!
//! When nothing matches, an [`PatternId::Unknown`] token consuming exactly
//! one character is produced. At the end of input an
//! [`PatternId::EndOfStream`] token with an empty value is produced.

use super::error::GrammarError;
use super::regex_cache;
use super::source_location::Position;
use super::stream::SourceStream;
use hashbrown::HashMap;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Identity of the pattern that produced a token
///
/// The two sentinels are distinct variants, so no user-chosen name can
/// ever collide with them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternId {
    /// End of input was reached
    EndOfStream,
    /// No pattern matched the next character
    Unknown,
    /// A pattern registered on the lexer
    User(Arc<str>),
}

impl PatternId {
    /// Id for a user pattern
    pub fn user(name: impl AsRef<str>) -> Self {
        PatternId::User(Arc::from(name.as_ref()))
    }

    /// True for the end-of-stream sentinel
    #[inline]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, PatternId::EndOfStream)
    }

    /// True for the unknown-token sentinel
    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, PatternId::Unknown)
    }

    /// Printable name
    pub fn as_str(&self) -> &str {
        match self {
            PatternId::EndOfStream => "<EOS>",
            PatternId::Unknown => "<UNKNOWN>",
            PatternId::User(name) => name,
        }
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for PatternId {
    fn from(name: &str) -> Self {
        PatternId::user(name)
    }
}

impl From<String> for PatternId {
    fn from(name: String) -> Self {
        PatternId::User(Arc::from(name))
    }
}

impl From<&PatternId> for PatternId {
    fn from(id: &PatternId) -> Self {
        id.clone()
    }
}

impl Serialize for PatternId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Converts a raw match into a token value
pub type Action<T> = Arc<dyn Fn(&str) -> T + Send + Sync>;

/// One lexical unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token<T = String> {
    /// Pattern that produced this token
    pub pattern: PatternId,
    /// Where the token starts
    pub position: Position,
    /// Logical value (the raw match unless an action transformed it)
    pub value: T,
}

impl<T> Token<T> {
    /// True for the end-of-stream sentinel token
    #[inline]
    pub fn is_end_of_stream(&self) -> bool {
        self.pattern.is_end_of_stream()
    }

    /// True for the unknown-token sentinel
    #[inline]
    pub fn is_unknown(&self) -> bool {
        self.pattern.is_unknown()
    }
}

impl<T: fmt::Display> Token<T> {
    /// `PATTERN(value)`, or just `PATTERN` for an empty value
    pub fn describe(&self) -> String {
        let value = self.value.to_string();
        if value.is_empty() {
            self.pattern.to_string()
        } else {
            format!("{}({})", self.pattern, value)
        }
    }
}

/// A registered pattern
#[derive(Clone)]
pub struct Pattern<T> {
    id: PatternId,
    source: String,
    regex: Regex,
    action: Option<Action<T>>,
}

impl<T> Pattern<T> {
    /// The pattern's id
    #[inline]
    pub fn id(&self) -> &PatternId {
        &self.id
    }

    /// The regex source as registered (unanchored)
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True if matches go through an action
    #[inline]
    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Length in bytes of the match at the start of `input`, if non-empty
    fn match_len(&self, input: &str) -> Option<usize> {
        self.regex.find(input).map(|m| m.end()).filter(|&len| len > 0)
    }
}

impl<T> fmt::Debug for Pattern<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

/// Ordered set of patterns producing tokens of value type `T`
pub struct Lexer<T = String> {
    patterns: Vec<Pattern<T>>,
    index: HashMap<PatternId, usize>,
    on_end_of_stream: Option<Action<T>>,
    on_unknown: Option<Action<T>>,
}

impl<T> Default for Lexer<T> {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            index: HashMap::new(),
            on_end_of_stream: None,
            on_unknown: None,
        }
    }
}

impl<T> fmt::Debug for Lexer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl<T> Lexer<T> {
    /// Create an empty lexer
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pattern
    ///
    /// Without an `id` a synthetic one (`#0`, `#1`, ...) is assigned from
    /// the registration index.
    ///
    /// # Errors
    /// - [`GrammarError::DuplicatePattern`] if the id is already taken
    /// - [`GrammarError::InvalidRegex`] if `regex` does not compile
    pub fn add_pattern(
        &mut self,
        regex: &str,
        action: Option<Action<T>>,
        id: Option<&str>,
    ) -> Result<PatternId, GrammarError> {
        let id = match id {
            Some(name) => PatternId::user(name),
            None => PatternId::user(format!("#{}", self.patterns.len())),
        };
        if self.index.contains_key(&id) {
            return Err(GrammarError::DuplicatePattern {
                id: id.to_string(),
            });
        }

        let compiled = regex_cache::get_or_compile(regex).map_err(|e| GrammarError::InvalidRegex {
            pattern: regex.to_string(),
            message: e.to_string(),
        })?;

        log_debug!("registered pattern {} = /{}/", id, regex);

        self.index.insert(id.clone(), self.patterns.len());
        self.patterns.push(Pattern {
            id: id.clone(),
            source: regex.to_string(),
            regex: compiled,
            action,
        });
        Ok(id)
    }

    /// Register a named pattern whose value is the raw match
    pub fn pattern(&mut self, id: &str, regex: &str) -> Result<PatternId, GrammarError> {
        self.add_pattern(regex, None, Some(id))
    }

    /// Register a named pattern whose value is computed by `action`
    pub fn pattern_with<F>(&mut self, id: &str, regex: &str, action: F) -> Result<PatternId, GrammarError>
    where
        F: Fn(&str) -> T + Send + Sync + 'static,
    {
        self.add_pattern(regex, Some(Arc::new(action)), Some(id))
    }

    /// Compute the end-of-stream token's value with `action` (given `""`)
    pub fn with_end_of_stream_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&str) -> T + Send + Sync + 'static,
    {
        self.on_end_of_stream = Some(Arc::new(action));
        self
    }

    /// Compute unknown tokens' values with `action` (given the character)
    pub fn with_unknown_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&str) -> T + Send + Sync + 'static,
    {
        self.on_unknown = Some(Arc::new(action));
        self
    }

    /// Look up a registered pattern
    pub fn get_pattern(&self, id: &PatternId) -> Option<&Pattern<T>> {
        self.index.get(id).map(|&i| &self.patterns[i])
    }

    /// True if a pattern with this id is registered
    pub fn has_pattern(&self, id: &PatternId) -> bool {
        self.index.contains_key(id)
    }

    /// Patterns in registration order
    pub fn patterns(&self) -> &[Pattern<T>] {
        &self.patterns
    }

    /// Number of registered patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if no pattern is registered
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl<T> Lexer<T>
where
    T: for<'a> From<&'a str>,
{
    /// Produce the next token and advance `stream` past it
    pub fn lex(&self, stream: &mut SourceStream) -> Token<T> {
        let position = stream.position();

        if stream.is_end_of_stream() {
            return Token {
                pattern: PatternId::EndOfStream,
                position,
                value: apply(self.on_end_of_stream.as_ref(), ""),
            };
        }

        let remainder = stream.peek_remainder();
        let mut best: Option<(usize, usize)> = None;
        for (i, pattern) in self.patterns.iter().enumerate() {
            if let Some(len) = pattern.match_len(remainder) {
                // strictly longer only: earlier patterns keep ties
                if best.map_or(true, |(_, best_len)| len > best_len) {
                    best = Some((i, len));
                }
            }
        }

        let (pattern, value, consumed) = match best {
            Some((i, len)) => {
                let matched = &remainder[..len];
                let pattern = &self.patterns[i];
                let value = apply(pattern.action.as_ref(), matched);
                (pattern.id.clone(), value, matched.chars().count())
            }
            None => {
                let len = remainder.chars().next().map_or(0, char::len_utf8);
                let value = apply(self.on_unknown.as_ref(), &remainder[..len]);
                (PatternId::Unknown, value, 1)
            }
        };
        stream.ignore(consumed);

        log_trace!("lexed {} at {}", pattern, position);

        Token {
            pattern,
            position,
            value,
        }
    }

    /// Lex all of `text`, including the final end-of-stream token
    pub fn tokenize(&self, text: &str) -> Vec<Token<T>> {
        let mut stream = SourceStream::new(text);
        let mut tokens = Vec::new();
        loop {
            let token = self.lex(&mut stream);
            let done = token.is_end_of_stream();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }
}

#[inline]
fn apply<T>(action: Option<&Action<T>>, raw: &str) -> T
where
    T: for<'a> From<&'a str>,
{
    match action {
        Some(action) => action(raw),
        None => T::from(raw),
    }
}
