//! Lexicomb - Longest-match Lexer and Parser-combinator Engine
//!
//! Turns text into values in two stages:
//! - a regex [`Lexer`] that picks the longest match at each position (the
//!   first registered pattern wins ties) and emits end-of-stream and
//!   unknown sentinel tokens
//! - a small algebra of parser nodes (terminal, sequence, choice,
//!   repetition, separated list, lazy reference) running recursive descent
//!   with backtracking over a lazily lexed, cached [`TokenStream`]
//!
//! Failures are [`ParseError`]s carrying a position and the chain of rule
//! failures that led to them.
//!
//! ## Quick Start
//!
//! ```rust
//! use lexicomb::prelude::*;
//!
//! let mut lexer: Lexer = Lexer::new();
//! lexer.pattern("let", "let").unwrap();
//! lexer.pattern("ident", "[a-z]+").unwrap();
//! lexer.pattern("num", "[0-9]+").unwrap();
//! lexer.pattern("eq", "=").unwrap();
//! lexer.pattern("ws", r"\s+").unwrap();
//!
//! let binding = sequence(
//!     "binding",
//!     vec![
//!         terminal("let", "let").boxed(),
//!         terminal("name", "ident").boxed(),
//!         terminal("=", "eq").boxed(),
//!         terminal("value", "num")
//!             .map(|v| Value::Int(v.as_str().and_then(|s| s.parse().ok()).unwrap_or(0)))
//!             .boxed(),
//!     ],
//! );
//!
//! let parser = LanguageParser::new(lexer, binding.boxed(), ParserConfig::new().with_ignores(["ws"]));
//! let value = parser.parse_value("let answer = 42").unwrap();
//! assert_eq!(value.get_index(3), Some(&Value::Int(42)));
//!
//! let error = parser.parse("let answer 42").unwrap_err();
//! assert_eq!(error.deepest_position(), Position::new(1, 12));
//! ```
//!
//! ## JSON
//!
//! [`json`] contains a complete reference grammar:
//!
//! ```rust
//! let value = lexicomb::json::parse(r#"{"a": [1, 2.5, true, null]}"#).unwrap();
//! assert_eq!(value.to_json().unwrap(), r#"{"a":[1,2.5,true,null]}"#);
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` - Enable debug/trace logging using the `log` crate
//! - `parallel` - Parse batches of inputs on the rayon thread pool

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]
#![allow(clippy::module_inception)]

/// Logging macros - no-op when logging feature is disabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Logging macros - use log crate when logging feature is enabled
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

// Prelude module for convenient imports
pub mod prelude;

// Lexer, token stream and parser algebra
pub mod engine;

// Reference grammar
pub mod json;

/// Re-export commonly used types for convenience
pub use engine::{
    between, chained, choice, fallback, lazy, literal, one_or_more, optional, parse, prefixed,
    satisfied, separated, sequence, suffixed, terminal, zero_or_more, Between, Chained, Choice,
    Fail, Fallback, Grammar, GrammarError, IgnoreSet, LanguageParser, Lazy, Lexer, Lookahead,
    ParseError, ParseResult, Parser, ParserConfig, ParserRef, PatternId, Position, Quantified,
    Satisfied, Separated, Sequence, SourceStream, Terminal, Token, TokenStream, TokenValue, Value,
};
