//! Parser node kinds
//!
//! The core combinators are [`Terminal`], [`Sequence`], [`Choice`],
//! [`Quantified`], [`Separated`] and [`Lazy`]. Built on the same contract
//! are [`Between`] (keep one part of a bracketed match), [`Satisfied`]
//! (value predicates), [`Fallback`] (default on failure), [`Chained`]
//! (value-dependent continuation), [`Lookahead`] and [`Fail`]. All except
//! `Lazy` run under [`Node::run`], which gives them the shared contract.
//!
//! # Example
//!
//! ```rust
//! use lexicomb::prelude::*;
//!
//! let mut lexer: Lexer = Lexer::new();
//! lexer.pattern("num", "[0-9]+").unwrap();
//! lexer.pattern("comma", ",").unwrap();
//! lexer.pattern("ws", r"\s+").unwrap();
//!
//! let numbers = separated("numbers", terminal("num", "num").boxed(), terminal(",", "comma").boxed());
//! let parser = LanguageParser::new(lexer, numbers.boxed(), ParserConfig::new().with_ignores(["ws"]));
//!
//! let values = parser.parse_value("1, 2, 3").unwrap().into_values().unwrap();
//! assert_eq!(values.len(), 3);
//! ```

use super::error::{GrammarError, ParseError};
use super::lexer::PatternId;
use super::parser::{Node, Parser, ParserRef, TokenValue};
use super::token_stream::{IgnoreSet, TokenStream};
use super::value::{ParseResult, Value};
use std::sync::Arc;

/// Builder methods shared by every node kind carrying a [`Node`]
macro_rules! node_builders {
    ($($ty:ident),* $(,)?) => {$(
        impl<T: TokenValue> $ty<T> {
            /// Apply `f` to the raw value of every successful parse
            pub fn map<F>(mut self, f: F) -> Self
            where
                F: Fn(Value) -> Value + Send + Sync + 'static,
            {
                self.node.set_transformer(Arc::new(f));
                self
            }

            /// Skip tokens of these patterns before attempting a match
            pub fn ignoring(mut self, ignores: impl Into<IgnoreSet>) -> Self {
                self.node.set_ignores(ignores.into());
                self
            }

            /// Share this node
            pub fn boxed(self) -> ParserRef<T> {
                Arc::new(self)
            }
        }
    )*};
}

node_builders!(
    Terminal, Sequence, Choice, Quantified, Separated, Between, Satisfied, Fallback, Chained,
    Lookahead, Fail,
);

// ============================================================================
// Terminal
// ============================================================================

/// Matches one token of a pattern, optionally with an exact value
pub struct Terminal<T: TokenValue = String> {
    node: Node,
    pattern: PatternId,
    literal: Option<T>,
}

impl<T: TokenValue> Terminal<T> {
    /// Match any token of `pattern`
    pub fn new(name: impl AsRef<str>, pattern: impl Into<PatternId>) -> Self {
        Self {
            node: Node::new(name),
            pattern: pattern.into(),
            literal: None,
        }
    }

    /// Match only the end-of-stream token
    pub fn end_of_stream() -> Self {
        Self::new("EOS", PatternId::EndOfStream)
    }

    /// Also require the token's value to equal `value`
    pub fn with_literal(mut self, value: impl Into<T>) -> Self {
        self.literal = Some(value.into());
        self
    }

    /// The required pattern
    pub fn pattern(&self) -> &PatternId {
        &self.pattern
    }

    /// The required value, if any
    pub fn literal(&self) -> Option<&T> {
        self.literal.as_ref()
    }

    fn expected(&self) -> String {
        match &self.literal {
            Some(value) => format!("{}({})", self.pattern, value),
            None => self.pattern.to_string(),
        }
    }
}

impl<T: TokenValue> Parser<T> for Terminal<T> {
    fn name(&self) -> &str {
        self.node.name()
    }

    fn parse(&self, stream: &mut TokenStream<'_, T>) -> Result<ParseResult, ParseError> {
        self.node.run(stream, |_, stream| {
            let token = stream.get();
            let matches = token.pattern == self.pattern
                && self.literal.as_ref().map_or(true, |value| *value == token.value);
            if !matches {
                return Err(ParseError::expectation(
                    self.expected(),
                    token.describe(),
                    token.position,
                ));
            }
            Ok(ParseResult::new(token.position, token.value.into()))
        })
    }
}

// ============================================================================
// Sequence
// ============================================================================

/// Matches its elements one after another
pub struct Sequence<T: TokenValue = String> {
    node: Node,
    parsers: Vec<ParserRef<T>>,
}

impl<T: TokenValue> Sequence<T> {
    /// Create a sequence
    pub fn new(name: impl AsRef<str>, parsers: Vec<ParserRef<T>>) -> Self {
        Self {
            node: Node::new(name),
            parsers,
        }
    }
}

impl<T: TokenValue> Parser<T> for Sequence<T> {
    fn name(&self) -> &str {
        self.node.name()
    }

    fn parse(&self, stream: &mut TokenStream<'_, T>) -> Result<ParseResult, ParseError> {
        self.node.run(stream, |start, stream| {
            let mut results = Vec::with_capacity(self.parsers.len());
            for parser in &self.parsers {
                results.push(parser.parse(stream)?);
            }
            let position = results.first().map_or(start, |r| r.position);
            Ok(ParseResult::new(position, Value::List(results)))
        })
    }
}

// ============================================================================
// Choice
// ============================================================================

/// Returns the first alternative that matches
///
/// When every alternative fails, the error lists all of them and carries
/// the failures that got furthest past the choice's start as causes.
pub struct Choice<T: TokenValue = String> {
    node: Node,
    alternatives: Vec<ParserRef<T>>,
    tag: bool,
}

impl<T: TokenValue> Choice<T> {
    /// Create an untagged choice
    pub fn new(name: impl AsRef<str>, alternatives: Vec<ParserRef<T>>) -> Self {
        Self {
            node: Node::new(name),
            alternatives,
            tag: false,
        }
    }

    /// Wrap each result in [`Value::Tagged`] with the winner's name
    pub fn tagged(mut self) -> Self {
        self.tag = true;
        self
    }
}

impl<T: TokenValue> Parser<T> for Choice<T> {
    fn name(&self) -> &str {
        self.node.name()
    }

    fn parse(&self, stream: &mut TokenStream<'_, T>) -> Result<ParseResult, ParseError> {
        self.node.run(stream, |start, stream| {
            let mut failures = Vec::with_capacity(self.alternatives.len());
            for alternative in &self.alternatives {
                match alternative.parse(stream) {
                    Ok(result) if self.tag => {
                        let value = Value::tagged(alternative.name(), result.value);
                        return Ok(ParseResult::new(result.position, value));
                    }
                    Ok(result) => return Ok(result),
                    Err(error) => failures.push(error),
                }
            }

            let names: Vec<&str> = self.alternatives.iter().map(|p| p.name()).collect();
            let mut error = ParseError::new(start, format!("Expected one of [{}]", names.join(", ")));

            let furthest = failures.iter().map(ParseError::deepest_position).max();
            if let Some(furthest) = furthest.filter(|p| *p > start) {
                error.causes = failures
                    .into_iter()
                    .filter(|e| e.deepest_position() == furthest)
                    .collect();
            }
            Err(error)
        })
    }
}

// ============================================================================
// Quantified
// ============================================================================

/// Repeats a parser greedily between `min` and `max` times
pub struct Quantified<T: TokenValue = String> {
    node: Node,
    parser: ParserRef<T>,
    min: usize,
    max: Option<usize>,
}

impl<T: TokenValue> Quantified<T> {
    /// Repeat `parser` at least `min` and at most `max` times (`None` = unbounded)
    ///
    /// # Errors
    /// Returns [`GrammarError::InvalidRepetition`] if `min > max`.
    pub fn new(
        name: impl AsRef<str>,
        parser: ParserRef<T>,
        min: usize,
        max: Option<usize>,
    ) -> Result<Self, GrammarError> {
        if let Some(max) = max.filter(|&max| min > max) {
            return Err(GrammarError::InvalidRepetition { min, max });
        }
        Ok(Self::bounded(name, parser, min, max))
    }

    fn bounded(name: impl AsRef<str>, parser: ParserRef<T>, min: usize, max: Option<usize>) -> Self {
        Self {
            node: Node::new(name),
            parser,
            min,
            max,
        }
    }

    /// `*`
    pub fn zero_or_more(name: impl AsRef<str>, parser: ParserRef<T>) -> Self {
        Self::bounded(name, parser, 0, None)
    }

    /// `?`
    pub fn zero_or_one(name: impl AsRef<str>, parser: ParserRef<T>) -> Self {
        Self::bounded(name, parser, 0, Some(1))
    }

    /// `+`
    pub fn one_or_more(name: impl AsRef<str>, parser: ParserRef<T>) -> Self {
        Self::bounded(name, parser, 1, None)
    }

    /// Exactly `n` repetitions
    pub fn exactly(name: impl AsRef<str>, parser: ParserRef<T>, n: usize) -> Self {
        Self::bounded(name, parser, n, Some(n))
    }

    /// Minimum repetitions
    pub fn min(&self) -> usize {
        self.min
    }

    /// Maximum repetitions, if bounded
    pub fn max(&self) -> Option<usize> {
        self.max
    }
}

impl<T: TokenValue> Parser<T> for Quantified<T> {
    fn name(&self) -> &str {
        self.node.name()
    }

    fn parse(&self, stream: &mut TokenStream<'_, T>) -> Result<ParseResult, ParseError> {
        self.node.run(stream, |start, stream| {
            let mut results = Vec::new();
            while self.max.map_or(true, |max| results.len() < max) {
                let before = stream.offset();
                match self.parser.parse(stream) {
                    Ok(result) => {
                        results.push(result);
                        // an empty match would repeat forever
                        if stream.offset() == before && results.len() >= self.min {
                            break;
                        }
                    }
                    Err(error) if results.len() < self.min => {
                        return Err(ParseError::expectation(
                            format!("at least {} '{}'", self.min, self.parser.name()),
                            format!("only {}", results.len()),
                            stream.position(),
                        )
                        .with_cause(error));
                    }
                    Err(_) => break,
                }
            }
            let position = results.first().map_or(start, |r| r.position);
            Ok(ParseResult::new(position, Value::List(results)))
        })
    }
}

// ============================================================================
// Separated
// ============================================================================

/// A list of values with separators between them
///
/// The result lists the values only. The list never fails part way: when
/// a value (or a separator and the value after it) does not match, the
/// stream is rewound to before that attempt and the values so far are
/// returned, so an absent list is empty. It fails only when fewer than
/// `min` values were matched.
pub struct Separated<T: TokenValue = String> {
    node: Node,
    value: ParserRef<T>,
    separator: ParserRef<T>,
    min: usize,
    max: Option<usize>,
}

impl<T: TokenValue> Separated<T> {
    /// Create a separated list of any length
    pub fn new(name: impl AsRef<str>, value: ParserRef<T>, separator: ParserRef<T>) -> Self {
        Self {
            node: Node::new(name),
            value,
            separator,
            min: 0,
            max: None,
        }
    }

    /// Create a separated list of `min` to `max` values (`None` = unbounded)
    ///
    /// # Errors
    /// Returns [`GrammarError::InvalidRepetition`] if `min > max`.
    pub fn with_bounds(
        name: impl AsRef<str>,
        value: ParserRef<T>,
        separator: ParserRef<T>,
        min: usize,
        max: Option<usize>,
    ) -> Result<Self, GrammarError> {
        if let Some(max) = max.filter(|&max| min > max) {
            return Err(GrammarError::InvalidRepetition { min, max });
        }
        Ok(Self {
            min,
            max,
            ..Self::new(name, value, separator)
        })
    }

    /// Minimum number of values
    pub fn min(&self) -> usize {
        self.min
    }

    /// Maximum number of values, if bounded
    pub fn max(&self) -> Option<usize> {
        self.max
    }
}

impl<T: TokenValue> Parser<T> for Separated<T> {
    fn name(&self) -> &str {
        self.node.name()
    }

    fn parse(&self, stream: &mut TokenStream<'_, T>) -> Result<ParseResult, ParseError> {
        self.node.run(stream, |start, stream| {
            let mut values: Vec<ParseResult> = Vec::new();
            let mut failure = None;
            while self.max.map_or(true, |max| values.len() < max) {
                let checkpoint = stream.offset();
                let item = if values.is_empty() {
                    self.value.parse(stream)
                } else {
                    self.separator
                        .parse(stream)
                        .and_then(|_| self.value.parse(stream))
                };
                match item {
                    Ok(item) => {
                        values.push(item);
                        if stream.offset() == checkpoint && values.len() >= self.min {
                            break;
                        }
                    }
                    Err(error) => {
                        stream.set_offset(checkpoint);
                        failure = Some(error);
                        break;
                    }
                }
            }

            if values.len() < self.min {
                let error = ParseError::expectation(
                    format!("at least {} '{}'", self.min, self.value.name()),
                    format!("only {}", values.len()),
                    stream.position(),
                );
                return Err(match failure {
                    Some(cause) => error.with_cause(cause),
                    None => error,
                });
            }
            let position = values.first().map_or(start, |r| r.position);
            Ok(ParseResult::new(position, Value::List(values)))
        })
    }
}

// ============================================================================
// Between
// ============================================================================

/// Matches a parser with an optional prefix and suffix, keeping only its value
pub struct Between<T: TokenValue = String> {
    node: Node,
    prefix: Option<ParserRef<T>>,
    parser: ParserRef<T>,
    suffix: Option<ParserRef<T>>,
}

impl<T: TokenValue> Between<T> {
    /// `prefix parser suffix`, keeping `parser`'s value
    pub fn new(name: impl AsRef<str>, prefix: ParserRef<T>, parser: ParserRef<T>, suffix: ParserRef<T>) -> Self {
        Self {
            node: Node::new(name),
            prefix: Some(prefix),
            parser,
            suffix: Some(suffix),
        }
    }

    /// `prefix parser`, keeping `parser`'s value
    pub fn prefixed(name: impl AsRef<str>, prefix: ParserRef<T>, parser: ParserRef<T>) -> Self {
        Self {
            node: Node::new(name),
            prefix: Some(prefix),
            parser,
            suffix: None,
        }
    }

    /// `parser suffix`, keeping `parser`'s value
    pub fn suffixed(name: impl AsRef<str>, parser: ParserRef<T>, suffix: ParserRef<T>) -> Self {
        Self {
            node: Node::new(name),
            prefix: None,
            parser,
            suffix: Some(suffix),
        }
    }
}

impl<T: TokenValue> Parser<T> for Between<T> {
    fn name(&self) -> &str {
        self.node.name()
    }

    fn parse(&self, stream: &mut TokenStream<'_, T>) -> Result<ParseResult, ParseError> {
        self.node.run(stream, |_, stream| {
            if let Some(prefix) = &self.prefix {
                prefix.parse(stream)?;
            }
            let result = self.parser.parse(stream)?;
            if let Some(suffix) = &self.suffix {
                suffix.parse(stream)?;
            }
            Ok(result)
        })
    }
}

// ============================================================================
// Satisfied
// ============================================================================

/// Test applied to a parsed value
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Matches a parser whose value also passes a predicate
pub struct Satisfied<T: TokenValue = String> {
    node: Node,
    parser: ParserRef<T>,
    predicate: Predicate,
    message: Option<String>,
}

impl<T: TokenValue> Satisfied<T> {
    /// Accept `parser`'s result only if `predicate` holds for its value
    pub fn new<F>(name: impl AsRef<str>, parser: ParserRef<T>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            node: Node::new(name),
            parser,
            predicate: Arc::new(predicate),
            message: None,
        }
    }

    /// Accept `parser`'s result only if its value equals `expected`
    pub fn equals(name: impl AsRef<str>, parser: ParserRef<T>, expected: Value) -> Self {
        Self::new(name, parser, move |value| *value == expected)
    }

    /// Replace the default failure message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: TokenValue> Parser<T> for Satisfied<T> {
    fn name(&self) -> &str {
        self.node.name()
    }

    fn parse(&self, stream: &mut TokenStream<'_, T>) -> Result<ParseResult, ParseError> {
        self.node.run(stream, |start, stream| {
            let result = self.parser.parse(stream)?;
            if (self.predicate)(&result.value) {
                return Ok(result);
            }
            let message = match &self.message {
                Some(message) => message.clone(),
                None => format!("Unsatisfied {}: {}", self.parser.name(), result.value),
            };
            Err(ParseError::new(start, message))
        })
    }
}

// ============================================================================
// Fallback
// ============================================================================

/// Matches a parser, or succeeds with a default value without consuming
pub struct Fallback<T: TokenValue = String> {
    node: Node,
    parser: ParserRef<T>,
    default: Value,
}

impl<T: TokenValue> Fallback<T> {
    /// Create a fallback node
    pub fn new(name: impl AsRef<str>, parser: ParserRef<T>, default: Value) -> Self {
        Self {
            node: Node::new(name),
            parser,
            default,
        }
    }
}

impl<T: TokenValue> Parser<T> for Fallback<T> {
    fn name(&self) -> &str {
        self.node.name()
    }

    fn parse(&self, stream: &mut TokenStream<'_, T>) -> Result<ParseResult, ParseError> {
        self.node.run(stream, |start, stream| match self.parser.parse(stream) {
            Ok(result) => Ok(result),
            Err(_) => Ok(ParseResult::new(start, self.default.clone())),
        })
    }
}

// ============================================================================
// Chained
// ============================================================================

/// Builds the parser to run next from the value just parsed
pub type Continuation<T> = Arc<dyn Fn(&Value) -> ParserRef<T> + Send + Sync>;

/// Matches a parser, then the parser its value selects
///
/// The result is the second parser's. Used where the shape of what
/// follows depends on what was read, such as a count followed by that
/// many items.
pub struct Chained<T: TokenValue = String> {
    node: Node,
    parser: ParserRef<T>,
    next: Continuation<T>,
}

impl<T: TokenValue> Chained<T> {
    /// Create a chained node
    pub fn new<F>(name: impl AsRef<str>, parser: ParserRef<T>, next: F) -> Self
    where
        F: Fn(&Value) -> ParserRef<T> + Send + Sync + 'static,
    {
        Self {
            node: Node::new(name),
            parser,
            next: Arc::new(next),
        }
    }
}

impl<T: TokenValue> Parser<T> for Chained<T> {
    fn name(&self) -> &str {
        self.node.name()
    }

    fn parse(&self, stream: &mut TokenStream<'_, T>) -> Result<ParseResult, ParseError> {
        self.node.run(stream, |_, stream| {
            let first = self.parser.parse(stream)?;
            (self.next)(&first.value).parse(stream)
        })
    }
}

// ============================================================================
// Lazy
// ============================================================================

/// Produces the parser to run on every call
///
/// Used for recursive rules: the producer is called at parse time, after
/// the whole grammar exists. The produced parser applies its own ignores
/// and transformer; `Lazy` adds nothing around it.
pub struct Lazy<T: TokenValue = String> {
    name: Arc<str>,
    producer: Arc<dyn Fn() -> ParserRef<T> + Send + Sync>,
}

impl<T: TokenValue> Lazy<T> {
    /// Create a lazy node
    pub fn new<F>(name: impl AsRef<str>, producer: F) -> Self
    where
        F: Fn() -> ParserRef<T> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.as_ref()),
            producer: Arc::new(producer),
        }
    }

    /// Invoke the producer
    pub fn resolve(&self) -> ParserRef<T> {
        (self.producer)()
    }

    /// Share this node
    pub fn boxed(self) -> ParserRef<T> {
        Arc::new(self)
    }
}

impl<T: TokenValue> Parser<T> for Lazy<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, stream: &mut TokenStream<'_, T>) -> Result<ParseResult, ParseError> {
        self.resolve().parse(stream)
    }
}

// ============================================================================
// Lookahead
// ============================================================================

/// Checks for (or against) a match without consuming anything
pub struct Lookahead<T: TokenValue = String> {
    node: Node,
    parser: ParserRef<T>,
    positive: bool,
}

impl<T: TokenValue> Lookahead<T> {
    /// Succeed if `parser` would match here (`&`)
    pub fn positive(name: impl AsRef<str>, parser: ParserRef<T>) -> Self {
        Self {
            node: Node::new(name),
            parser,
            positive: true,
        }
    }

    /// Succeed if `parser` would not match here (`!`)
    pub fn negative(name: impl AsRef<str>, parser: ParserRef<T>) -> Self {
        Self {
            positive: false,
            ..Self::positive(name, parser)
        }
    }
}

impl<T: TokenValue> Parser<T> for Lookahead<T> {
    fn name(&self) -> &str {
        self.node.name()
    }

    fn parse(&self, stream: &mut TokenStream<'_, T>) -> Result<ParseResult, ParseError> {
        self.node.run(stream, |start, stream| {
            let offset = stream.offset();
            let outcome = self.parser.parse(stream);
            stream.set_offset(offset);

            match (self.positive, outcome) {
                (true, outcome) => outcome,
                (false, Ok(_)) => Err(ParseError::new(
                    start,
                    format!("Unexpected {}", self.parser.name()),
                )),
                (false, Err(_)) => Ok(ParseResult::new(start, Value::Nil)),
            }
        })
    }
}

// ============================================================================
// Fail
// ============================================================================

/// Always fails with a fixed message
pub struct Fail<T: TokenValue = String> {
    node: Node,
    message: String,
    _tokens: std::marker::PhantomData<fn() -> T>,
}

impl<T: TokenValue> Fail<T> {
    /// Create a failing node
    pub fn new(name: impl AsRef<str>, message: impl Into<String>) -> Self {
        Self {
            node: Node::new(name),
            message: message.into(),
            _tokens: std::marker::PhantomData,
        }
    }
}

impl<T: TokenValue> Parser<T> for Fail<T> {
    fn name(&self) -> &str {
        self.node.name()
    }

    fn parse(&self, stream: &mut TokenStream<'_, T>) -> Result<ParseResult, ParseError> {
        self.node
            .run(stream, |start, _| Err(ParseError::new(start, self.message.clone())))
    }
}

// ============================================================================
// DSL
// ============================================================================

/// Match any token of `pattern`
pub fn terminal<T: TokenValue>(name: &str, pattern: impl Into<PatternId>) -> Terminal<T> {
    Terminal::new(name, pattern)
}

/// Match a token of `pattern` whose value is exactly `value`
pub fn literal<T: TokenValue>(name: &str, pattern: impl Into<PatternId>, value: &str) -> Terminal<T> {
    Terminal::new(name, pattern).with_literal(value)
}

/// Match `parsers` in order
pub fn sequence<T: TokenValue>(name: &str, parsers: Vec<ParserRef<T>>) -> Sequence<T> {
    Sequence::new(name, parsers)
}

/// Match the first of `alternatives` that succeeds
pub fn choice<T: TokenValue>(name: &str, alternatives: Vec<ParserRef<T>>) -> Choice<T> {
    Choice::new(name, alternatives)
}

/// Match `value` (`separator` `value`)*, or nothing
pub fn separated<T: TokenValue>(name: &str, value: ParserRef<T>, separator: ParserRef<T>) -> Separated<T> {
    Separated::new(name, value, separator)
}

/// Match `parser` any number of times
pub fn zero_or_more<T: TokenValue>(name: &str, parser: ParserRef<T>) -> Quantified<T> {
    Quantified::zero_or_more(name, parser)
}

/// Match `parser` at least once
pub fn one_or_more<T: TokenValue>(name: &str, parser: ParserRef<T>) -> Quantified<T> {
    Quantified::one_or_more(name, parser)
}

/// Match `parser` zero or one time
pub fn optional<T: TokenValue>(name: &str, parser: ParserRef<T>) -> Quantified<T> {
    Quantified::zero_or_one(name, parser)
}

/// Resolve the parser through `producer` on each parse
pub fn lazy<T, F>(name: &str, producer: F) -> Lazy<T>
where
    T: TokenValue,
    F: Fn() -> ParserRef<T> + Send + Sync + 'static,
{
    Lazy::new(name, producer)
}

/// Match `parser` between `prefix` and `suffix`, keeping its value
pub fn between<T: TokenValue>(
    name: &str,
    prefix: ParserRef<T>,
    parser: ParserRef<T>,
    suffix: ParserRef<T>,
) -> Between<T> {
    Between::new(name, prefix, parser, suffix)
}

/// Match `prefix` then `parser`, keeping `parser`'s value
pub fn prefixed<T: TokenValue>(name: &str, prefix: ParserRef<T>, parser: ParserRef<T>) -> Between<T> {
    Between::prefixed(name, prefix, parser)
}

/// Match `parser` then `suffix`, keeping `parser`'s value
pub fn suffixed<T: TokenValue>(name: &str, parser: ParserRef<T>, suffix: ParserRef<T>) -> Between<T> {
    Between::suffixed(name, parser, suffix)
}

/// Match `parser` only if `predicate` accepts its value
pub fn satisfied<T, F>(name: &str, parser: ParserRef<T>, predicate: F) -> Satisfied<T>
where
    T: TokenValue,
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Satisfied::new(name, parser, predicate)
}

/// Match `parser`, or produce `default` without consuming anything
pub fn fallback<T: TokenValue>(name: &str, parser: ParserRef<T>, default: Value) -> Fallback<T> {
    Fallback::new(name, parser, default)
}

/// Match `parser`, then the parser `next` builds from its value
pub fn chained<T, F>(name: &str, parser: ParserRef<T>, next: F) -> Chained<T>
where
    T: TokenValue,
    F: Fn(&Value) -> ParserRef<T> + Send + Sync + 'static,
{
    Chained::new(name, parser, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::lexer::Lexer;
    use crate::engine::source_location::Position;

    fn lexer() -> Lexer {
        let mut lexer = Lexer::new();
        lexer.pattern("kw", "let").unwrap();
        lexer.pattern("ident", "[a-z]+").unwrap();
        lexer.pattern("num", "[0-9]+").unwrap();
        lexer.pattern("sym", "[=,;()]").unwrap();
        lexer.pattern("ws", r"\s+").unwrap();
        lexer
    }

    fn stream<'l>(lexer: &'l Lexer, text: &str) -> TokenStream<'l> {
        TokenStream::new(lexer, text, IgnoreSet::from(["ws"]))
    }

    fn sym(value: &str) -> ParserRef {
        literal(value, "sym", value).boxed()
    }

    #[test]
    fn test_terminal() {
        let lexer = lexer();
        let mut s = stream(&lexer, "x 1");
        let ident: Terminal = terminal("ident", "ident");

        let result = ident.parse(&mut s).unwrap();
        assert_eq!(result.value, Value::string("x"));
        assert_eq!(result.position, Position::new(1, 1));

        let error = ident.parse(&mut s).unwrap_err();
        assert_eq!(error.message, "Unable to parse ident");
        assert_eq!(error.causes[0].message, "Expected ident, but found num(1)");
        assert_eq!(s.offset(), 1);
    }

    #[test]
    fn test_terminal_literal() {
        let lexer = lexer();
        let mut s = stream(&lexer, ";");
        let error = sym("=").parse(&mut s).unwrap_err();
        assert_eq!(error.causes[0].message, "Expected sym(=), but found sym(;)");
        assert!(sym(";").parse(&mut s).is_ok());
    }

    #[test]
    fn test_terminal_end_of_stream() {
        let lexer = lexer();
        let mut s = stream(&lexer, "  ");
        let eos: Terminal = Terminal::end_of_stream();
        assert_eq!(eos.parse(&mut s).unwrap().value, Value::string(""));
    }

    #[test]
    fn test_sequence() {
        let lexer = lexer();
        let mut s = stream(&lexer, "let x = 1;");
        let binding = sequence(
            "binding",
            vec![
                terminal("let", "kw").boxed(),
                terminal("name", "ident").boxed(),
                sym("="),
                terminal("value", "num").boxed(),
                sym(";"),
            ],
        );

        let result = binding.parse(&mut s).unwrap();
        let values = result.value.into_values().unwrap();
        assert_eq!(values[1], Value::string("x"));
        assert_eq!(values[3], Value::string("1"));
        assert!(s.peek().is_end_of_stream());
    }

    #[test]
    fn test_sequence_failure_rewinds() {
        let lexer = lexer();
        let mut s = stream(&lexer, "let x ;");
        let binding = sequence(
            "binding",
            vec![terminal("let", "kw").boxed(), terminal("name", "ident").boxed(), sym("=")],
        );

        let error = binding.parse(&mut s).unwrap_err();
        assert_eq!(s.offset(), 0);
        assert_eq!(error.deepest_position(), Position::new(1, 7));
        assert_eq!(error.innermost_rule(), Some("="));
    }

    #[test]
    fn test_empty_sequence_position() {
        let lexer = lexer();
        let mut s = stream(&lexer, "  x");
        let empty: Sequence = sequence("empty", vec![]);
        let result = empty.parse(&mut s).unwrap();
        assert_eq!(result.position, Position::new(1, 3));
        assert_eq!(result.value, Value::List(vec![]));
    }

    #[test]
    fn test_choice_tagged() {
        let lexer = lexer();
        let mut s = stream(&lexer, "42");
        let atom = choice(
            "atom",
            vec![terminal("name", "ident").boxed(), terminal("number", "num").boxed()],
        )
        .tagged();

        let result = atom.parse(&mut s).unwrap();
        assert_eq!(result.value, Value::tagged("number", Value::string("42")));
    }

    #[test]
    fn test_choice_exhausted() {
        let lexer = lexer();
        let mut s = stream(&lexer, ";");
        let atom: Choice = choice(
            "atom",
            vec![terminal("name", "ident").boxed(), terminal("number", "num").boxed()],
        );

        let error = atom.parse(&mut s).unwrap_err();
        assert_eq!(error.causes[0].message, "Expected one of [name, number]");
        // neither alternative got past the start
        assert!(error.causes[0].causes.is_empty());
    }

    #[test]
    fn test_choice_keeps_furthest_failure() {
        let lexer = lexer();
        let mut s = stream(&lexer, "let x ;");
        let long = sequence(
            "binding",
            vec![terminal("let", "kw").boxed(), terminal("name", "ident").boxed(), sym("=")],
        );
        let short = terminal("number", "num");
        let statement = choice("statement", vec![long.boxed(), short.boxed()]);

        let error = statement.parse(&mut s).unwrap_err();
        let exhausted = &error.causes[0];
        assert_eq!(exhausted.causes.len(), 1);
        assert_eq!(exhausted.causes[0].context.as_deref(), Some("binding"));
        assert_eq!(error.deepest_position(), Position::new(1, 7));
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn test_quantified_bounds() {
        let lexer = lexer();
        let num: ParserRef = terminal("num", "num").boxed();

        let mut s = stream(&lexer, "1 2 3");
        let two = Quantified::new("two", num.clone(), 0, Some(2)).unwrap();
        assert_eq!(two.parse(&mut s).unwrap().value.into_values().unwrap().len(), 2);
        assert_eq!(s.peek().value, "3");

        let mut s = stream(&lexer, "1 x");
        let at_least_two = Quantified::new("nums", num.clone(), 2, None).unwrap();
        let error = at_least_two.parse(&mut s).unwrap_err();
        assert_eq!(error.causes[0].message, "Expected at least 2 'num', but found only 1");
        assert_eq!(s.offset(), 0);

        assert_eq!(
            Quantified::new("bad", num, 3, Some(1)).err(),
            Some(GrammarError::InvalidRepetition { min: 3, max: 1 })
        );
    }

    #[test]
    fn test_quantified_empty_match_terminates() {
        let lexer = lexer();
        let mut s = stream(&lexer, "x");
        let maybe: ParserRef = optional("maybe", terminal("num", "num").boxed()).boxed();
        let many = zero_or_more("many", maybe);
        let result = many.parse(&mut s).unwrap();
        assert_eq!(result.value.into_list().unwrap().len(), 1);
    }

    #[test]
    fn test_separated() {
        let lexer = lexer();
        let args = separated("args", terminal("arg", "num").boxed(), sym(","));

        let mut s = stream(&lexer, "1, 2, 3)");
        let values = args.parse(&mut s).unwrap().value.into_values().unwrap();
        assert_eq!(values, [Value::from("1"), Value::from("2"), Value::from("3")]);

        let mut s = stream(&lexer, ")");
        let result = args.parse(&mut s).unwrap();
        assert_eq!(result.value, Value::List(vec![]));
        assert_eq!(s.offset(), 0);

        // a trailing separator is left unconsumed
        let mut s = stream(&lexer, "1, )");
        let values = args.parse(&mut s).unwrap().value.into_values().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(s.peek().value, ",");
    }

    fn pair() -> ParserRef {
        sequence(
            "pair",
            vec![terminal("key", "ident").boxed(), sym("="), terminal("value", "num").boxed()],
        )
        .boxed()
    }

    #[test]
    fn test_separated_backtracks_partial_value() {
        let lexer = lexer();
        let pairs = separated("pairs", pair(), sym(","));

        let mut s = stream(&lexer, "a = ;");
        let result = pairs.parse(&mut s).unwrap();
        assert_eq!(result.value, Value::List(vec![]));
        assert_eq!(s.offset(), 0);

        // the second pair fails after its key: rewind to before the comma
        let mut s = stream(&lexer, "a = 1, b = ;");
        let values = pairs.parse(&mut s).unwrap().value.into_values().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(s.peek().value, ",");
        // the failure that explains the stop is kept on the stream
        let furthest = s.furthest_failure().unwrap();
        assert_eq!(furthest.deepest_position(), Position::new(1, 12));
        assert_eq!(furthest.innermost_rule(), Some("value"));
    }

    #[test]
    fn test_separated_before_overlapping_element() {
        let lexer = lexer();
        // the list's first pair and the trailing name both start with an ident
        let statement = sequence(
            "statement",
            vec![separated("pairs", pair(), sym(",")).boxed(), terminal("name", "ident").boxed()],
        );

        let mut s = stream(&lexer, "a");
        let values = statement.parse(&mut s).unwrap().value.into_values().unwrap();
        assert_eq!(values, [Value::List(vec![]), Value::string("a")]);

        let mut s = stream(&lexer, "a = 1 b");
        let values = statement.parse(&mut s).unwrap().value.into_values().unwrap();
        assert_eq!(values[1], Value::string("b"));
    }

    #[test]
    fn test_separated_bounds() {
        let lexer = lexer();
        let args = Separated::with_bounds("args", terminal("arg", "num").boxed(), sym(","), 2, Some(3)).unwrap();

        let mut s = stream(&lexer, "1, 2, 3, 4");
        assert_eq!(args.parse(&mut s).unwrap().value.into_values().unwrap().len(), 3);
        assert_eq!(s.peek().value, ",");

        let mut s = stream(&lexer, "1, x");
        let error = args.parse(&mut s).unwrap_err();
        assert_eq!(error.causes[0].message, "Expected at least 2 'arg', but found only 1");
        assert_eq!(error.causes[0].position, Position::new(1, 2));
        assert_eq!(s.offset(), 0);

        assert_eq!(
            Separated::with_bounds("bad", sym("x"), sym(","), 2, Some(1)).err().map(|e| e.to_string()),
            Some("Invalid repetition: minimum 2 exceeds maximum 1".to_string())
        );
    }

    #[test]
    fn test_quantified_stops_before_partial_element() {
        let lexer = lexer();
        let mut s = stream(&lexer, "a = 1 b = ;");
        let pairs = zero_or_more("pairs", pair());

        let result = pairs.parse(&mut s).unwrap();
        assert_eq!(result.value.into_list().unwrap().len(), 1);
        assert_eq!(s.peek().value, "b");
    }

    #[test]
    fn test_between_keeps_inner_value() {
        let lexer = lexer();
        let number: ParserRef = terminal("number", "num").boxed();

        let mut s = stream(&lexer, "(7)");
        let group = between("group", sym("("), number.clone(), sym(")"));
        let result = group.parse(&mut s).unwrap();
        assert_eq!(result.value, Value::string("7"));
        assert_eq!(result.position, Position::new(1, 2));
        assert!(s.peek().is_end_of_stream());

        let mut s = stream(&lexer, "(7;");
        let error = group.parse(&mut s).unwrap_err();
        assert_eq!(error.innermost_rule(), Some(")"));
        assert_eq!(s.offset(), 0);

        let mut s = stream(&lexer, "= 1;");
        let assigned = prefixed("assigned", sym("="), number.clone());
        assert_eq!(assigned.parse(&mut s).unwrap().value, Value::string("1"));
        let terminated = suffixed("terminated", number, sym(";"));
        let mut s = stream(&lexer, "2;");
        assert_eq!(terminated.parse(&mut s).unwrap().value, Value::string("2"));
    }

    #[test]
    fn test_satisfied() {
        let lexer = lexer();
        let digit: Satisfied = satisfied("digit", terminal("num", "num").boxed(), |v| {
            v.as_str().is_some_and(|s| s.len() == 1)
        });

        let mut s = stream(&lexer, "7");
        assert_eq!(digit.parse(&mut s).unwrap().value, Value::string("7"));

        let mut s = stream(&lexer, "42");
        let error = digit.parse(&mut s).unwrap_err();
        assert_eq!(error.causes[0].message, "Unsatisfied num: \"42\"");
        assert_eq!(s.offset(), 0);

        let zero: Satisfied = Satisfied::equals("zero", terminal("num", "num").boxed(), Value::string("0"))
            .with_message("Expected zero");
        let error = zero.parse(&mut s).unwrap_err();
        assert_eq!(error.causes[0].message, "Expected zero");
    }

    #[test]
    fn test_fallback() {
        let lexer = lexer();
        let count: Fallback = fallback("count", terminal("num", "num").boxed(), Value::string("1"));

        let mut s = stream(&lexer, "x");
        let result = count.parse(&mut s).unwrap();
        assert_eq!(result.value, Value::string("1"));
        assert_eq!(result.position, Position::new(1, 1));
        assert_eq!(s.offset(), 0);

        let mut s = stream(&lexer, "3");
        assert_eq!(count.parse(&mut s).unwrap().value, Value::string("3"));
    }

    #[test]
    fn test_chained() {
        let lexer = lexer();
        // a count, then exactly that many names
        let names: Chained = chained("names", terminal("count", "num").boxed(), |count| {
            let n = count.as_str().and_then(|s| s.parse().ok()).unwrap_or(0);
            Quantified::exactly("names", terminal("name", "ident").boxed(), n).boxed()
        });

        let mut s = stream(&lexer, "2 a b c");
        let values = names.parse(&mut s).unwrap().value.into_values().unwrap();
        assert_eq!(values, [Value::string("a"), Value::string("b")]);
        assert_eq!(s.peek().value, "c");

        let mut s = stream(&lexer, "3 a b");
        assert!(names.parse(&mut s).is_err());
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn test_lazy_recursion() {
        let lexer = lexer();
        // nested = '(' nested? ')'
        let slot: Arc<std::sync::OnceLock<ParserRef>> = Arc::new(std::sync::OnceLock::new());
        let inner = Arc::clone(&slot);
        let recurse = lazy("nested", move || match inner.get() {
            Some(parser) => Arc::clone(parser),
            None => Fail::new("nested", "unresolved").boxed(),
        });
        let nested = sequence(
            "nested",
            vec![sym("("), optional("inner", recurse.boxed()).boxed(), sym(")")],
        )
        .boxed();
        assert!(slot.set(Arc::clone(&nested)).is_ok());

        let mut s = stream(&lexer, "((()))");
        assert!(nested.parse(&mut s).is_ok());
        assert!(s.peek().is_end_of_stream());

        let mut s = stream(&lexer, "(()");
        assert!(nested.parse(&mut s).is_err());
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn test_lookahead() {
        let lexer = lexer();
        let mut s = stream(&lexer, "x");
        let ident: ParserRef = terminal("ident", "ident").boxed();

        let peeked = Lookahead::positive("has_ident", ident.clone());
        assert_eq!(peeked.parse(&mut s).unwrap().value, Value::string("x"));
        assert_eq!(s.offset(), 0);

        let not_ident = Lookahead::negative("no_ident", ident);
        let error = not_ident.parse(&mut s).unwrap_err();
        assert_eq!(error.causes[0].message, "Unexpected ident");
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn test_node_ignores_and_transform() {
        let lexer = lexer();
        let mut s = TokenStream::new(&lexer, "  7", IgnoreSet::new());
        let number: Terminal = terminal("number", "num")
            .ignoring(["ws"])
            .map(|v| Value::Int(v.as_str().and_then(|s| s.parse().ok()).unwrap_or_default()));

        let result = number.parse(&mut s).unwrap();
        assert_eq!(result.value, Value::Int(7));
        assert_eq!(result.position, Position::new(1, 3));
    }
}
