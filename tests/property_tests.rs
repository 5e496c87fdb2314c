//! Property-based tests using proptest
//!
//! These tests check the lexer, token stream and parser nodes against
//! invariants that must hold for any input.

use lexicomb::json;
use lexicomb::prelude::*;
use proptest::prelude::*;

fn lexer() -> Lexer {
    let mut lexer = Lexer::new();
    lexer.pattern("kw", "let").unwrap();
    lexer.pattern("ident", "[a-z]+").unwrap();
    lexer.pattern("num", "[0-9]+").unwrap();
    lexer.pattern("plus", r"\+").unwrap();
    lexer.pattern("ws", r"\s+").unwrap();
    lexer
}

fn num() -> ParserRef {
    terminal("num", "num").boxed()
}

fn numbers(count: usize) -> String {
    (0..count).map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
}

// =============================================================================
// Source Positions
// =============================================================================

proptest! {
    /// Seeking to the position of any char boundary lands on that boundary
    #[test]
    fn test_position_round_trip(text in "[a-z \né]{0,40}", index in any::<prop::sample::Index>()) {
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let offset = boundaries[index.index(boundaries.len())];

        let mut source = SourceStream::new(text.as_str());
        let position = source.position_at(offset);
        prop_assert!(source.set_position(position).is_ok());
        prop_assert_eq!(source.offset(), offset);
        prop_assert_eq!(source.position(), position);
    }

    /// Lines are counted by newlines and columns by characters
    #[test]
    fn test_position_counts(lines in prop::collection::vec("[a-zé]{0,8}", 1..6)) {
        let text = lines.join("\n");
        let source = SourceStream::new(text.as_str());
        let last = lines.last().map_or(0, |l| l.chars().count());
        prop_assert_eq!(source.position_at(text.len()), Position::new(lines.len(), last + 1));
    }

    /// The tracked cursor position agrees with a fresh lookup after any walk
    #[test]
    fn test_position_tracks_steps(
        text in "[a-z \n\ré]{0,40}",
        steps in prop::collection::vec(0usize..5, 0..20),
    ) {
        let mut source = SourceStream::new(text.as_str());
        for step in steps {
            source.ignore(step);
            prop_assert_eq!(source.position(), source.position_at(source.offset()));
        }
    }
}

// =============================================================================
// Lexer
// =============================================================================

proptest! {
    /// Token values are the raw matches, so they cover the input exactly
    #[test]
    fn test_tokens_cover_input(text in "[a-z0-9 +@é]{0,30}") {
        let tokens = lexer().tokenize(&text);
        let joined: String = tokens.iter().map(|t| t.value.as_str()).collect();
        prop_assert_eq!(joined, text);
        prop_assert!(tokens.last().is_some_and(|t| t.is_end_of_stream()));
    }

    /// The keyword wins only the exact tie; longer words stay identifiers
    #[test]
    fn test_longest_match_and_ties(word in "[a-z]{1,8}") {
        let tokens = lexer().tokenize(&word);
        let expected = if word == "let" { "kw" } else { "ident" };
        prop_assert_eq!(tokens.len(), 2);
        prop_assert_eq!(tokens[0].pattern.as_str(), expected);
    }

    /// Unknown characters are consumed one at a time
    #[test]
    fn test_unknown_single_char(count in 1usize..10) {
        let text = "@".repeat(count);
        let tokens = lexer().tokenize(&text);
        prop_assert_eq!(tokens.len(), count + 1);
        prop_assert!(tokens[..count].iter().all(|t| t.is_unknown() && t.value == "@"));
    }
}

// =============================================================================
// Parser Nodes
// =============================================================================

proptest! {
    /// A failing sequence leaves the stream where it started
    #[test]
    fn test_backtracking_restores_offset(count in 0usize..8) {
        let lexer = lexer();
        let text = numbers(count);
        let too_long = sequence("too long", vec![num(); count + 1]);

        let mut stream = TokenStream::new(&lexer, text.as_str(), IgnoreSet::from(["ws"]));
        prop_assert!(too_long.parse(&mut stream).is_err());
        prop_assert_eq!(stream.offset(), 0);
        prop_assert_eq!(stream.position(), Position::start());
    }

    /// Repetition succeeds exactly when the minimum is met
    #[test]
    fn test_quantified_minimum(count in 0usize..6, min in 0usize..6) {
        let parser = LanguageParser::new(
            lexer(),
            Quantified::new("nums", num(), min, None).unwrap().boxed(),
            ParserConfig::new().with_ignores(["ws"]),
        );

        let outcome = parser.parse_value(&numbers(count));
        if count >= min {
            let values = outcome.ok().and_then(Value::into_values);
            prop_assert_eq!(values.map(|v| v.len()), Some(count));
        } else {
            prop_assert!(outcome.is_err());
        }
    }

    /// Separated lists accept any number of values, none included
    #[test]
    fn test_separated_any_length(count in 0usize..8) {
        let list = separated("list", num(), terminal("plus", "plus").boxed());
        let parser = LanguageParser::new(lexer(), list.boxed(), ParserConfig::new().with_ignores(["ws"]));

        let text = numbers(count).replace(' ', " + ");
        let values = parser.parse_value(&text).ok().and_then(Value::into_values);
        prop_assert_eq!(values.map(|v| v.len()), Some(count));
    }
}

// =============================================================================
// JSON
// =============================================================================

proptest! {
    /// Integer arrays written by serde_json parse back to the same numbers
    #[test]
    fn test_json_integer_arrays(items in prop::collection::vec(any::<i64>(), 0..20)) {
        let text = serde_json::to_string(&items).unwrap();
        let expected = Value::Array(items.into_iter().map(Value::Int).collect());
        prop_assert_eq!(json::parse(&text).unwrap(), expected);
    }

    /// Strings written by serde_json unescape back to the same text
    #[test]
    fn test_json_strings(text in "[a-z\"\\\\\n\t/é]{0,20}") {
        let document = serde_json::to_string(&vec![text.clone()]).unwrap();
        let value = json::parse(&document).unwrap();
        prop_assert_eq!(value.get_index(0).and_then(Value::as_str), Some(text.as_str()));
    }
}
