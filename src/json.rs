//! JSON reference grammar
//!
//! A complete grammar built from the engine's parts: a lexer with a string
//! unescaping action, recursive rules through [`Grammar`] references, a
//! tagged choice for values, and transformers that turn raw sequences into
//! [`Value::Array`] and ordered [`Value::Map`] values.
//!
//! ```rust
//! use lexicomb::json;
//! use lexicomb::Value;
//!
//! let value = json::parse(r#"{"name": "lexicomb", "tags": [1, 2.5]}"#).unwrap();
//! assert_eq!(value.get("name"), Some(&Value::string("lexicomb")));
//! assert_eq!(value.get("tags").and_then(|t| t.get_index(1)), Some(&Value::Float(2.5)));
//! ```

use crate::engine::{
    between, choice, literal, separated, sequence, terminal, Grammar, GrammarError, LanguageParser,
    Lexer, ParseError, ParserConfig, ParserRef, Value,
};
use std::str::Chars;

/// Whitespace pattern id
pub const WS: &str = "WS";
/// Punctuation pattern id
pub const SYMBOL: &str = "SYMBOL";
/// `true`, `false` and `null`
pub const KEYWORD: &str = "KEYWORD";
/// Numbers with a fraction and/or exponent
pub const DECIMAL: &str = "decimal";
/// Numbers without a fraction or exponent
pub const INTEGER: &str = "integer";
/// Quoted strings
pub const STRING: &str = "string";

/// The JSON lexer
///
/// `decimal` is registered before `integer` and only matches numbers with
/// a fraction or an exponent, so the two never tie.
pub fn lexer() -> Result<Lexer, GrammarError> {
    let mut lexer = Lexer::new();
    lexer.pattern(WS, r"\s+")?;
    lexer.pattern(SYMBOL, r"[{}\[\],:]")?;
    lexer.pattern(KEYWORD, "true|false|null")?;
    lexer.pattern(
        DECIMAL,
        r"-?(?:0|[1-9][0-9]*)(?:\.[0-9]+(?:[eE][+-]?[0-9]+)?|[eE][+-]?[0-9]+)",
    )?;
    lexer.pattern(INTEGER, r"-?(?:0|[1-9][0-9]*)")?;
    lexer.pattern_with(STRING, r#""(?:[^"\\]|\\.)*""#, |raw| {
        let body = raw
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(raw);
        unescape(body)
    })?;
    Ok(lexer)
}

/// The JSON parser: an array or an object, whitespace ignored
pub fn parser() -> Result<LanguageParser, GrammarError> {
    let grammar: Grammar = Grammar::new();
    let string = terminal(STRING, STRING).boxed();

    let value = grammar.define(
        "value",
        choice(
            "value",
            vec![
                string.clone(),
                terminal("number", INTEGER).map(integer).boxed(),
                terminal("number", DECIMAL).map(decimal).boxed(),
                literal("true", KEYWORD, "true").map(|_| Value::Bool(true)).boxed(),
                literal("false", KEYWORD, "false").map(|_| Value::Bool(false)).boxed(),
                literal("null", KEYWORD, "null").map(|_| Value::Nil).boxed(),
                grammar.reference("object").boxed(),
                grammar.reference("array").boxed(),
            ],
        )
        .tagged(),
    )?;

    let pair = sequence("pair", vec![string, symbol(":"), value.clone()]).boxed();
    grammar.define(
        "object",
        between("object", symbol("{"), separated("pairs", pair, symbol(",")).boxed(), symbol("}"))
            .map(object),
    )?;
    grammar.define(
        "array",
        between("array", symbol("["), separated("values", value, symbol(",")).boxed(), symbol("]"))
            .map(array),
    )?;
    grammar.define(
        "json",
        choice(
            "json",
            vec![grammar.reference("array").boxed(), grammar.reference("object").boxed()],
        ),
    )?;

    let config = ParserConfig::new().with_ignores([WS]);
    LanguageParser::from_grammar(lexer()?, grammar, "json", config)
}

/// Parse a JSON document into a [`Value`]
///
/// Builds the grammar on every call; keep a [`parser`] around to parse
/// many documents.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    match parser() {
        Ok(parser) => parser.parse_value(text),
        // the grammar is fixed, so this only happens if it is edited badly
        Err(error) => Err(ParseError::new(Default::default(), error.to_string())),
    }
}

/// Resolve JSON escape sequences in a string body (quotes already removed)
///
/// Handles `\n \t \r \f \b \" \\ \/` and `\uXXXX`, including surrogate
/// pairs. Unknown escapes are kept as written; invalid `\u` escapes become
/// U+FFFD.
pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{0C}'),
            Some('b') => out.push('\u{08}'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('u') => out.push(unicode_escape(&mut chars).unwrap_or(char::REPLACEMENT_CHARACTER)),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn hex4(chars: &mut Chars<'_>) -> Option<u32> {
    let digits: String = chars.by_ref().take(4).collect();
    if digits.len() == 4 && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        u32::from_str_radix(&digits, 16).ok()
    } else {
        None
    }
}

fn unicode_escape(chars: &mut Chars<'_>) -> Option<char> {
    let high = hex4(chars)?;
    if !(0xD800..0xDC00).contains(&high) {
        return char::from_u32(high);
    }

    // high surrogate: only valid followed by `\u` and a low surrogate
    let mut rest = chars.clone();
    if rest.next() != Some('\\') || rest.next() != Some('u') {
        return None;
    }
    let low = hex4(&mut rest).filter(|low| (0xDC00..0xE000).contains(low))?;
    *chars = rest;
    char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
}

fn symbol(value: &str) -> ParserRef {
    literal(value, SYMBOL, value).boxed()
}

fn integer(value: Value) -> Value {
    let parsed = value.as_str().map(|raw| match raw.parse::<i64>() {
        Ok(n) => Value::Int(n),
        // too large for i64
        Err(_) => raw.parse::<f64>().map(Value::Float).unwrap_or(Value::Nil),
    });
    parsed.unwrap_or(value)
}

fn decimal(value: Value) -> Value {
    let parsed = value
        .as_str()
        .and_then(|raw| raw.parse::<f64>().ok())
        .map(Value::Float);
    parsed.unwrap_or(value)
}

/// pairs → ordered map
fn object(value: Value) -> Value {
    let pairs = value.into_list().unwrap_or_default();

    Value::Map(
        pairs
            .into_iter()
            .filter_map(|pair| {
                // string ':' value
                let mut items = pair.value.into_list()?.into_iter();
                let key = items.next()?.value.into_string()?;
                let value = items.nth(1)?.value.untag();
                Some((key, value))
            })
            .collect(),
    )
}

/// values → array
fn array(value: Value) -> Value {
    let values = value.into_values().unwrap_or_default();

    Value::Array(values.into_iter().map(Value::untag).collect())
}
