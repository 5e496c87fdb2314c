//! Error Reporting
//!
//! Two families of errors live here:
//!
//! - [`ParseError`] is raised while parsing. It is always recoverable by an
//!   enclosing choice or by the caller, and chains the lower-level errors that
//!   caused it so the full derivation path can be reported.
//! - [`GrammarError`] reports a contract violation while a lexer or grammar
//!   is being constructed (duplicate ids, bad regexes, invalid seeks).
//!
//! # Example Output
//!
//! `Display` prints the error and its causes depth-first, one per line:
//!
//! ```text
//! Error @ (1, 1): Unable to parse json
//! Error @ (1, 1): Expected one of [array, object]
//! Error @ (1, 1): Unable to parse object
//! Error @ (1, 2): Unable to parse }
//! Error @ (1, 2): Expected SYMBOL(}), but found string(a)
//! Error @ (1, 2): Unable to parse pair
//! Error @ (1, 7): Unable to parse value
//! Error @ (1, 7): Expected one of [string, number, number, true, false, null, object, array]
//! ```
//!
//! [`ParseError::indented_trace`] prints the same lines with each cause
//! indented one tab deeper than the error it explains.

use super::source_location::Position;
use std::fmt;

/// A positioned parse failure with the errors that caused it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Where the failing attempt began (or where the mismatch was found)
    pub position: Position,
    /// Human-readable description
    pub message: String,
    /// Name of the rule whose failure this error reports, if any
    pub context: Option<String>,
    /// Lower-level errors that led to this one
    pub causes: Vec<ParseError>,
}

impl ParseError {
    /// Create an error without causes
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
            context: None,
            causes: Vec::new(),
        }
    }

    /// "Expected X, but found Y"
    pub fn expectation(expected: impl fmt::Display, found: impl fmt::Display, position: Position) -> Self {
        Self::new(position, format!("Expected {}, but found {}", expected, found))
    }

    /// The wrapper every node raises when one of its attempts fails
    pub fn unable_to_parse(rule: &str, position: Position) -> Self {
        Self::new(position, format!("Unable to parse {}", rule)).with_context(rule)
    }

    /// Attach the rule name this error reports on
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Chain a lower-level cause
    pub fn with_cause(mut self, cause: ParseError) -> Self {
        self.causes.push(cause);
        self
    }

    /// Combine a higher-level error with the error that caused it
    pub fn combine(outer: ParseError, inner: ParseError) -> Self {
        outer.with_cause(inner)
    }

    /// Furthest position reached anywhere in this error tree
    pub fn deepest_position(&self) -> Position {
        self.causes
            .iter()
            .map(ParseError::deepest_position)
            .fold(self.position, Position::max)
    }

    /// The error at the end of the furthest-reaching derivation path
    pub fn deepest(&self) -> &ParseError {
        let mut current = self;
        while let Some(next) = current.deepest_cause() {
            current = next;
        }
        current
    }

    /// Cause through which the furthest position is reached
    fn deepest_cause(&self) -> Option<&ParseError> {
        let mut best: Option<(&ParseError, Position)> = None;
        for cause in &self.causes {
            let deepest = cause.deepest_position();
            if best.map_or(true, |(_, position)| deepest > position) {
                best = Some((cause, deepest));
            }
        }
        best.filter(|(_, position)| *position >= self.position)
            .map(|(cause, _)| cause)
    }

    /// Rule names along the deepest derivation path, outermost first
    pub fn rule_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = Some(self);
        while let Some(error) = current {
            if let Some(rule) = error.context.as_deref() {
                path.push(rule);
            }
            current = error.deepest_cause();
        }
        path
    }

    /// The innermost rule on the deepest derivation path
    pub fn innermost_rule(&self) -> Option<&str> {
        self.rule_path().pop()
    }

    /// Format the whole error tree with ASCII connectors
    pub fn ascii_tree(&self) -> String {
        let mut output = String::new();
        self.ascii_tree_impl(&mut output, "", true);
        output
    }

    fn ascii_tree_impl(&self, output: &mut String, prefix: &str, last: bool) {
        let connector = if last { "`- " } else { "|- " };
        let child_prefix = if last { "   " } else { "|  " };

        output.push_str(prefix);
        output.push_str(connector);
        output.push_str(&self.message);
        output.push_str(&format!(" @ {}", self.position));
        output.push('\n');

        for (i, cause) in self.causes.iter().enumerate() {
            let is_last = i == self.causes.len() - 1;
            cause.ascii_tree_impl(output, &format!("{}{}", prefix, child_prefix), is_last);
        }
    }

    /// Format with the offending source line and a caret under the deepest position
    pub fn format_with_source(&self, source: &str) -> String {
        let mut output = String::new();
        let position = self.deepest_position();

        output.push_str(&format!(
            "Error at line {}, column {}:\n",
            position.line, position.column
        ));

        let line = source.split('\n').nth(position.line.saturating_sub(1)).unwrap_or("");
        output.push_str(line.trim_end_matches('\r'));
        output.push('\n');

        for _ in 0..position.column.saturating_sub(1) {
            output.push(' ');
        }
        output.push_str("^\n");

        output.push_str(&self.ascii_tree());
        output
    }

    /// The error chain with each cause indented one tab deeper than its parent
    pub fn indented_trace(&self) -> String {
        let mut output = String::new();
        // writing to a String never fails
        let _ = self.write_trace(&mut output, 0, true);
        output
    }

    fn write_trace<W: fmt::Write>(&self, out: &mut W, depth: usize, indent: bool) -> fmt::Result {
        if indent {
            for _ in 0..depth {
                out.write_char('\t')?;
            }
        }
        write!(out, "Error @ {}: {}", self.position, self.message)?;
        for cause in &self.causes {
            out.write_char('\n')?;
            cause.write_trace(out, depth + 1, indent)?;
        }
        Ok(())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_trace(f, 0, false)
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.deepest_cause()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Contract violations detected while building a lexer or grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A pattern with this id is already registered
    DuplicatePattern {
        /// The repeated id
        id: String,
    },
    /// A pattern's regular expression failed to compile
    InvalidRegex {
        /// The pattern source as given
        pattern: String,
        /// Compiler diagnostic
        message: String,
    },
    /// The end-of-stream sentinel was placed in an ignore set
    IgnoredEndOfStream,
    /// A seek targeted a position outside the source
    InvalidPosition {
        /// The rejected position
        position: Position,
    },
    /// A repetition's minimum exceeds its maximum
    InvalidRepetition {
        /// Requested minimum
        min: usize,
        /// Requested maximum
        max: usize,
    },
    /// A rule with this name is already defined
    DuplicateRule {
        /// The repeated name
        name: String,
    },
    /// No rule with this name is defined
    UndefinedRule {
        /// The missing name
        name: String,
    },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::DuplicatePattern { id } => {
                write!(f, "Pattern '{}' is already registered", id)
            }
            GrammarError::InvalidRegex { pattern, message } => {
                write!(f, "Invalid regex '{}': {}", pattern, message)
            }
            GrammarError::IgnoredEndOfStream => {
                write!(f, "End of stream cannot be ignored")
            }
            GrammarError::InvalidPosition { position } => {
                write!(f, "Invalid position {}", position)
            }
            GrammarError::InvalidRepetition { min, max } => {
                write!(f, "Invalid repetition: minimum {} exceeds maximum {}", min, max)
            }
            GrammarError::DuplicateRule { name } => {
                write!(f, "Rule '{}' is already defined", name)
            }
            GrammarError::UndefinedRule { name } => {
                write!(f, "Rule '{}' is not defined", name)
            }
        }
    }
}

impl std::error::Error for GrammarError {}
