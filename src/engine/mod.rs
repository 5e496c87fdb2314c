//! Lexing and parsing engine
//!
//! Data flows text → [`SourceStream`] → [`Lexer`] → [`TokenStream`] →
//! parser nodes → [`Value`].
//!
//! # Module Organization
//!
//! ## Source
//! - [`source_location`] - Positions and the line index
//! - [`stream`] - Character-level source stream
//!
//! ## Lexing
//! - [`lexer`] - Longest-match pattern lexer
//! - [`regex_cache`] - Thread-local cache of compiled patterns
//! - [`token_stream`] - Cached, filterable token cursor
//!
//! ## Parsing
//! - [`parser`] - Node contract, configuration and entry point
//! - [`combinators`] - Node kinds and DSL functions
//! - [`grammar`] - Named rule table for recursive grammars
//! - [`parallel`] - Batch parsing
//!
//! ## Results and Errors
//! - [`value`] - Parse values
//! - [`error`] - Parse and grammar errors

// ============================================================================
// Module Declarations
// ============================================================================

pub mod combinators;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parallel;
pub mod parser;
pub mod regex_cache;
pub mod source_location;
pub mod stream;
pub mod token_stream;
pub mod value;

// ============================================================================
// Re-exports
// ============================================================================

pub use combinators::{
    between, chained, choice, fallback, lazy, literal, one_or_more, optional, prefixed,
    satisfied, separated, sequence, suffixed, terminal, zero_or_more, Between, Chained, Choice,
    Continuation, Fail, Fallback, Lazy, Lookahead, Predicate, Quantified, Satisfied, Separated,
    Sequence, Terminal,
};
pub use error::{GrammarError, ParseError};
pub use grammar::Grammar;
pub use lexer::{Action, Lexer, Pattern, PatternId, Token};
pub use parser::{
    parse, LanguageParser, Node, Parser, ParserConfig, ParserRef, TokenValue, Transformer,
};
pub use source_location::{LineIndex, Position};
pub use stream::SourceStream;
pub use token_stream::{IgnoreSet, TokenStream};
pub use value::{ParseResult, Value};
