//! Batch parsing
//!
//! Parser nodes are immutable and shared, and each parse owns its token
//! stream, so independent inputs can be parsed concurrently with one
//! [`LanguageParser`].
//!
//! # Feature Flag
//!
//! Inputs are parsed on the rayon thread pool when the `parallel` feature is
//! enabled, and one after another otherwise:
//!
//! ```toml
//! [dependencies]
//! lexicomb = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! # Example
//!
//! ```rust
//! let parser = lexicomb::json::parser().unwrap();
//! let results = parser.parse_batch(&["[1]", "{\"a\": true}", "[,]"]);
//!
//! // Results are in same order as inputs
//! assert!(results[0].is_ok());
//! assert!(results[1].is_ok());
//! assert!(results[2].is_err());
//! ```

use super::error::ParseError;
use super::parser::{LanguageParser, TokenValue};
use super::value::ParseResult;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

impl<T: TokenValue> LanguageParser<T> {
    /// Parse every input, returning results in input order
    #[cfg(feature = "parallel")]
    pub fn parse_batch(&self, inputs: &[&str]) -> Vec<Result<ParseResult, ParseError>> {
        log_debug!("parsing batch of {} inputs in parallel", inputs.len());
        inputs.par_iter().map(|input| self.parse(input)).collect()
    }

    /// Parse every input, returning results in input order
    #[cfg(not(feature = "parallel"))]
    pub fn parse_batch(&self, inputs: &[&str]) -> Vec<Result<ParseResult, ParseError>> {
        log_debug!("parsing batch of {} inputs", inputs.len());
        inputs.iter().map(|input| self.parse(input)).collect()
    }
}
