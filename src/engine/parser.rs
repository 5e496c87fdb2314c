//! Parser contract and entry point
//!
//! Every node kind implements [`Parser`]. The shared part of the contract
//! (skip ignored tokens, apply the transformer, restore the cursor and wrap
//! the error on failure) lives in [`Node::run`], so node kinds only
//! implement their own matching logic.
//!
//! [`LanguageParser`] ties a lexer, a root node and a [`ParserConfig`]
//! together and is the usual way to parse a whole input.

use super::error::{GrammarError, ParseError};
use super::grammar::Grammar;
use super::lexer::Lexer;
use super::source_location::Position;
use super::token_stream::{IgnoreSet, TokenStream};
use super::value::{ParseResult, Value};
use std::fmt;
use std::sync::Arc;

/// Requirements on a lexer's token value type for use in parsers
pub trait TokenValue:
    Clone + PartialEq + fmt::Display + for<'a> From<&'a str> + Into<Value> + Send + Sync + 'static
{
}

impl<T> TokenValue for T where
    T: Clone + PartialEq + fmt::Display + for<'a> From<&'a str> + Into<Value> + Send + Sync + 'static
{
}

/// A parser node
///
/// On success the stream sits just after the consumed tokens. On failure
/// the stream is back where the attempt started.
pub trait Parser<T: TokenValue = String>: Send + Sync {
    /// Human-readable name, used in error messages
    fn name(&self) -> &str;

    /// Attempt to match at the stream's cursor
    fn parse(&self, stream: &mut TokenStream<'_, T>) -> Result<ParseResult, ParseError>;
}

/// Shared handle to a parser node
pub type ParserRef<T = String> = Arc<dyn Parser<T>>;

/// Pure function applied to a node's raw value on success
pub type Transformer = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// State and behaviour common to every node kind
#[derive(Clone)]
pub struct Node {
    name: Arc<str>,
    transformer: Option<Transformer>,
    ignores: IgnoreSet,
}

impl Node {
    /// A node with the identity transformer and no ignores
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            transformer: None,
            ignores: IgnoreSet::new(),
        }
    }

    /// The node's name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the transformer
    pub fn set_transformer(&mut self, transformer: Transformer) {
        self.transformer = Some(transformer);
    }

    /// Replace the ignore set
    pub fn set_ignores(&mut self, ignores: IgnoreSet) {
        self.ignores = ignores;
    }

    /// Apply the transformer (identity if none)
    pub fn transform(&self, value: Value) -> Value {
        match &self.transformer {
            Some(transformer) => transformer(value),
            None => value,
        }
    }

    /// Run `body` under the node contract
    ///
    /// `body` receives the position after leading ignored tokens were
    /// skipped. Its error is wrapped in "Unable to parse {name}", recorded
    /// on the stream as a candidate furthest failure, and the cursor is
    /// restored to where this call started.
    pub fn run<'l, T, F>(&self, stream: &mut TokenStream<'l, T>, body: F) -> Result<ParseResult, ParseError>
    where
        T: TokenValue,
        F: FnOnce(Position, &mut TokenStream<'l, T>) -> Result<ParseResult, ParseError>,
    {
        let offset = stream.offset();
        if !self.ignores.is_empty() {
            while self.ignores.contains(&stream.peek().pattern) {
                stream.get();
            }
        }
        let start = stream.position();

        match body(start, stream) {
            Ok(raw) => Ok(ParseResult::new(raw.position, self.transform(raw.value))),
            Err(cause) => {
                stream.set_offset(offset);
                let position = stream.position();
                log_debug!("{} failed at {}", self.name, position);
                let error = ParseError::unable_to_parse(&self.name, position).with_cause(cause);
                stream.record_failure(&error);
                Err(error)
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("has_transformer", &self.transformer.is_some())
            .field("ignores", &self.ignores)
            .finish()
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Settings for a whole-input parse
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Patterns skipped everywhere (typically whitespace and comments)
    pub ignores: IgnoreSet,

    /// Fail unless the root node consumed everything up to end of input
    pub require_end_of_stream: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            ignores: IgnoreSet::new(),
            require_end_of_stream: true,
        }
    }
}

impl ParserConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global ignore set
    pub fn with_ignores(mut self, ignores: impl Into<IgnoreSet>) -> Self {
        self.ignores = ignores.into();
        self
    }

    /// Accept input left over after the root node matched
    pub fn allow_trailing_input(mut self) -> Self {
        self.require_end_of_stream = false;
        self
    }
}

// ============================================================================
// Entry Point
// ============================================================================

/// A lexer, a root parser node and the settings to run them with
///
/// Immutable once built; parse sessions each create their own token
/// stream, so one `LanguageParser` can serve any number of threads.
pub struct LanguageParser<T: TokenValue = String> {
    lexer: Arc<Lexer<T>>,
    root: ParserRef<T>,
    config: ParserConfig,
    grammar: Option<Grammar<T>>,
}

impl<T: TokenValue> LanguageParser<T> {
    /// Create a parser from a lexer and a root node
    pub fn new(lexer: impl Into<Arc<Lexer<T>>>, root: ParserRef<T>, config: ParserConfig) -> Self {
        Self {
            lexer: lexer.into(),
            root,
            config,
            grammar: None,
        }
    }

    /// Create a parser rooted at a rule of `grammar`
    ///
    /// The parser keeps the rule table alive, so rule references stay
    /// resolvable for as long as the parser exists.
    ///
    /// # Errors
    /// Returns [`GrammarError::UndefinedRule`] if `root` is not defined.
    pub fn from_grammar(
        lexer: impl Into<Arc<Lexer<T>>>,
        grammar: Grammar<T>,
        root: &str,
        config: ParserConfig,
    ) -> Result<Self, GrammarError> {
        let root = grammar.rule(root).ok_or_else(|| GrammarError::UndefinedRule {
            name: root.to_string(),
        })?;
        Ok(Self {
            lexer: lexer.into(),
            root,
            config,
            grammar: Some(grammar),
        })
    }

    /// Parse `text` with the root node
    ///
    /// # Errors
    /// Returns the root node's error, or an expectation error at the first
    /// leftover token when the config requires the whole input. Either one
    /// also carries the furthest failure of the parse as a cause when that
    /// failure got further than the error itself.
    pub fn parse(&self, text: &str) -> Result<ParseResult, ParseError> {
        let mut stream = self.tokens(text);
        let result = match self.root.parse(&mut stream) {
            Ok(result) => result,
            Err(error) => return Err(stream.explain(error)),
        };

        if self.config.require_end_of_stream {
            let next = stream.peek();
            if !next.is_end_of_stream() {
                log_debug!("{} stopped before end of input at {}", self.root.name(), next.position);
                let error = ParseError::expectation("end of input", next.describe(), next.position);
                return Err(stream.explain(error));
            }
        }

        log_debug!(
            "{} matched: {} tokens lexed from {} bytes",
            self.root.name(),
            stream.cached_len(),
            text.len()
        );
        Ok(result)
    }

    /// Parse `text` and keep only the value
    pub fn parse_value(&self, text: &str) -> Result<Value, ParseError> {
        self.parse(text).map(|result| result.value)
    }

    /// A fresh token stream over `text` with the configured ignores
    pub fn tokens<'s>(&'s self, text: &str) -> TokenStream<'s, T> {
        TokenStream::new(&self.lexer, text, self.config.ignores.clone())
    }

    /// The lexer
    pub fn lexer(&self) -> &Lexer<T> {
        &self.lexer
    }

    /// The root node
    pub fn root(&self) -> &ParserRef<T> {
        &self.root
    }

    /// The configuration
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The rule table this parser was built from, if any
    pub fn grammar(&self) -> Option<&Grammar<T>> {
        self.grammar.as_ref()
    }
}

/// Parse `text` with `parser`, skipping `ignores` globally
///
/// Unlike [`LanguageParser::parse`], input left after the match is not an
/// error.
pub fn parse<T: TokenValue>(
    lexer: &Lexer<T>,
    parser: &dyn Parser<T>,
    text: &str,
    ignores: IgnoreSet,
) -> Result<ParseResult, ParseError> {
    let mut stream = TokenStream::new(lexer, text, ignores);
    parser.parse(&mut stream).map_err(|error| stream.explain(error))
}
