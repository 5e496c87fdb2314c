//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions.
//! Importing it with a wildcard brings everything needed to define a lexer
//! and a grammar into scope:
//!
//! ```
//! use lexicomb::prelude::*;
//! ```
//!
//! # Re-exported Items
//!
//! ## Lexing
//! - [`Lexer`] - Longest-match pattern lexer
//! - [`PatternId`] - Pattern identity, including the sentinels
//! - [`Token`] - One lexical unit
//! - [`TokenStream`] - Cached token cursor
//! - [`IgnoreSet`] - Patterns skipped while parsing
//!
//! ## Parser DSL
//! - [`terminal()`], [`literal()`] - Match one token
//! - [`sequence()`] - Match parsers in order
//! - [`choice()`] - Match the first alternative that succeeds
//! - [`zero_or_more()`], [`one_or_more()`], [`optional()`] - Repetition
//! - [`separated()`] - Separated list, possibly empty
//! - [`between()`], [`prefixed()`], [`suffixed()`] - Keep one part of a bracketed match
//! - [`satisfied()`] - Value predicate
//! - [`fallback()`] - Default value on failure
//! - [`chained()`] - Pick the next parser from a parsed value
//! - [`lazy()`] - Resolve a parser at parse time
//! - [`Grammar`] - Named rule table for recursive grammars
//!
//! ## Parsing
//! - [`Parser`] - Node trait
//! - [`LanguageParser`] - Lexer + root node + config
//! - [`ParserConfig`] - Whole-input settings
//!
//! ## Results and Errors
//! - [`Value`], [`ParseResult`] - Parse values
//! - [`ParseError`] - Positioned, chained parse failure
//! - [`GrammarError`] - Construction-time contract violation
//! - [`Position`] - Line and column

// ============================================================================
// Lexing
// ============================================================================

pub use crate::engine::{IgnoreSet, Lexer, PatternId, SourceStream, Token, TokenStream};

// ============================================================================
// Parser DSL
// ============================================================================

pub use crate::engine::{
    between, chained, choice, fallback, lazy, literal, one_or_more, optional, prefixed,
    satisfied, separated, sequence, suffixed, terminal, zero_or_more, Between, Chained, Choice,
    Fail, Fallback, Grammar, Lazy, Lookahead, Quantified, Satisfied, Separated, Sequence,
    Terminal,
};

// ============================================================================
// Parsing
// ============================================================================

pub use crate::engine::{LanguageParser, Parser, ParserConfig, ParserRef, TokenValue};

// ============================================================================
// Results and Errors
// ============================================================================

pub use crate::engine::{GrammarError, ParseError, ParseResult, Position, Value};
