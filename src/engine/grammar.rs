//! Named rule table
//!
//! Recursive grammars cannot be built eagerly: a JSON value refers to an
//! object, which refers back to a value. [`Grammar`] stores rules by name;
//! [`Grammar::reference`] hands out a [`Lazy`] node that looks the rule up
//! when it is parsed, after every rule has been defined.
//!
//! References hold a weak handle to the table, so rule cycles do not keep
//! the table alive. Keep the [`Grammar`] (or a
//! [`LanguageParser`](super::parser::LanguageParser) built from it) around
//! for as long as its rules are used.
//!
//! ```rust
//! use lexicomb::prelude::*;
//!
//! let mut lexer: Lexer = Lexer::new();
//! lexer.pattern("open", r"\(").unwrap();
//! lexer.pattern("close", r"\)").unwrap();
//!
//! let grammar: Grammar = Grammar::new();
//! grammar
//!     .define(
//!         "parens",
//!         zero_or_more(
//!             "group",
//!             sequence(
//!                 "pair",
//!                 vec![
//!                     terminal("(", "open").boxed(),
//!                     grammar.reference("parens").boxed(),
//!                     terminal(")", "close").boxed(),
//!                 ],
//!             )
//!             .boxed(),
//!         ),
//!     )
//!     .unwrap();
//!
//! let parser = LanguageParser::from_grammar(lexer, grammar, "parens", ParserConfig::new()).unwrap();
//! assert!(parser.parse("(()())").is_ok());
//! assert!(parser.parse("(()").is_err());
//! ```

use super::combinators::{Fail, Lazy};
use super::error::GrammarError;
use super::parser::{Parser, ParserRef, TokenValue};
use hashbrown::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

type RuleTable<T> = RwLock<HashMap<String, ParserRef<T>>>;

/// Shared, named rule table
pub struct Grammar<T: TokenValue = String> {
    rules: Arc<RuleTable<T>>,
}

impl<T: TokenValue> Clone for Grammar<T> {
    fn clone(&self) -> Self {
        Self {
            rules: Arc::clone(&self.rules),
        }
    }
}

impl<T: TokenValue> Default for Grammar<T> {
    fn default() -> Self {
        Self {
            rules: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T: TokenValue> Grammar<T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `parser` under `name`
    ///
    /// # Errors
    /// Returns [`GrammarError::DuplicateRule`] if `name` is taken.
    pub fn define<P>(&self, name: &str, parser: P) -> Result<ParserRef<T>, GrammarError>
    where
        P: Parser<T> + 'static,
    {
        let mut rules = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        if rules.contains_key(name) {
            return Err(GrammarError::DuplicateRule {
                name: name.to_string(),
            });
        }
        let parser: ParserRef<T> = Arc::new(parser);
        rules.insert(name.to_string(), Arc::clone(&parser));
        log_debug!("defined rule {}", name);
        Ok(parser)
    }

    /// Look up a rule
    pub fn rule(&self, name: &str) -> Option<ParserRef<T>> {
        lookup(&self.rules, name)
    }

    /// A node that resolves `name` each time it parses
    ///
    /// The rule may be defined after the reference is created. If it is
    /// still undefined at parse time, the reference fails to match.
    pub fn reference(&self, name: &str) -> Lazy<T> {
        let rules: Weak<RuleTable<T>> = Arc::downgrade(&self.rules);
        let rule = name.to_string();
        Lazy::new(name, move || {
            rules
                .upgrade()
                .and_then(|rules| lookup(&rules, &rule))
                .unwrap_or_else(|| Fail::new(&rule, format!("Undefined rule '{}'", rule)).boxed())
        })
    }

    /// True if `name` is defined
    pub fn contains(&self, name: &str) -> bool {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Defined rule names, sorted
    pub fn names(&self) -> Vec<String> {
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = rules.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of defined rules
    pub fn len(&self) -> usize {
        self.rules.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if no rule is defined
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lookup<T: TokenValue>(rules: &RuleTable<T>, name: &str) -> Option<ParserRef<T>> {
    rules
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::combinators::{choice, literal, sequence, terminal};
    use crate::engine::lexer::Lexer;
    use crate::engine::token_stream::{IgnoreSet, TokenStream};

    fn lexer() -> Lexer {
        let mut lexer = Lexer::new();
        lexer.pattern("num", "[0-9]+").unwrap();
        lexer.pattern("sym", r"[\[\],]").unwrap();
        lexer
    }

    #[test]
    fn test_define_and_lookup() {
        let grammar: Grammar = Grammar::new();
        grammar.define("num", terminal("num", "num")).unwrap();

        assert!(grammar.contains("num"));
        assert_eq!(grammar.rule("num").map(|r| r.name().to_string()), Some("num".to_string()));
        assert_eq!(grammar.len(), 1);
        assert_eq!(grammar.names(), ["num"]);

        let duplicate = grammar.define("num", terminal("other", "num"));
        assert_eq!(
            duplicate.err(),
            Some(GrammarError::DuplicateRule {
                name: "num".to_string()
            })
        );
    }

    #[test]
    fn test_forward_reference() {
        let lexer = lexer();
        let grammar: Grammar = Grammar::new();

        // item = num | '[' item ']'
        let item = grammar.reference("item");
        grammar
            .define(
                "item",
                choice(
                    "item",
                    vec![
                        terminal("num", "num").boxed(),
                        sequence(
                            "list",
                            vec![literal("[", "sym", "[").boxed(), item.boxed(), literal("]", "sym", "]").boxed()],
                        )
                        .boxed(),
                    ],
                ),
            )
            .unwrap();

        let root = grammar.rule("item").unwrap();
        let mut stream = TokenStream::new(&lexer, "[[7]]", IgnoreSet::new());
        assert!(root.parse(&mut stream).is_ok());
        assert!(stream.peek().is_end_of_stream());
    }

    #[test]
    fn test_undefined_reference_fails() {
        let lexer = lexer();
        let grammar: Grammar = Grammar::new();
        let missing = grammar.reference("missing");

        let mut stream = TokenStream::new(&lexer, "1", IgnoreSet::new());
        let error = missing.parse(&mut stream).unwrap_err();
        assert_eq!(error.causes[0].message, "Undefined rule 'missing'");
    }

    #[test]
    fn test_reference_after_grammar_dropped() {
        let lexer = lexer();
        let reference = {
            let grammar: Grammar = Grammar::new();
            grammar.define("num", terminal("num", "num")).unwrap();
            grammar.reference("num")
        };

        let mut stream = TokenStream::new(&lexer, "1", IgnoreSet::new());
        assert!(reference.parse(&mut stream).is_err());
    }
}
