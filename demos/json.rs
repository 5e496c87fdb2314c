//! JSON Parser Example
//!
//! Parses a few documents with the reference JSON grammar, prints the
//! resulting values and shows how a malformed document is reported.
//!
//! Run with: cargo run --example json

use lexicomb::json;

fn main() {
    let parser = match json::parser() {
        Ok(parser) => parser,
        Err(error) => {
            eprintln!("grammar error: {}", error);
            return;
        }
    };

    println!("JSON Parser Example");
    println!("===================");
    println!();

    let documents = [
        r#"{"name": "lexicomb", "tags": ["lexer", "parser"], "stable": false}"#,
        r#"[1, -2.5e3, null, {"nested": {"deep": [[]]}}]"#,
        r#"{"escaped": "line\nbreak é 😀"}"#,
    ];

    for text in documents {
        println!("Input:  {}", text);
        match parser.parse_value(text) {
            Ok(value) => {
                println!("Value:  {}", value);
                if let Ok(json) = value.to_json() {
                    println!("JSON:   {}", json);
                }
            }
            Err(error) => println!("Error:\n{}", error),
        }
        println!();
    }

    let malformed = "{\n  \"a\": 1,\n  \"b\" 2\n}";
    println!("Input:\n{}", malformed);
    println!();
    match parser.parse(malformed) {
        Ok(result) => println!("Unexpected success: {}", result.value),
        Err(error) => {
            println!("{}", error.format_with_source(malformed));
            println!("Rule path: {}", error.rule_path().join(" > "));
        }
    }
}
