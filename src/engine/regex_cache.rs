//! Thread-local regex cache for lexer patterns
//!
//! Lexer patterns are compiled anchored at the cursor. Grammars are often
//! rebuilt (per test, per worker, per benchmark iteration) from the same
//! pattern sources, so compiled expressions are cached per thread.

use hashbrown::HashMap;
use regex::Regex;
use std::cell::RefCell;

thread_local! {
    /// Thread-local cache of compiled, anchored patterns
    static REGEX_CACHE: RefCell<HashMap<String, Regex>> = RefCell::new(HashMap::new());
}

/// Wrap `pattern` so it only matches at the start of the haystack
#[inline]
pub fn anchored(pattern: &str) -> String {
    format!("^(?:{})", pattern)
}

/// Get or compile `pattern` anchored at the start of the haystack
///
/// # Errors
/// Returns the regex compiler's error for an invalid pattern. Invalid
/// patterns are not cached.
pub fn get_or_compile(pattern: &str) -> Result<Regex, regex::Error> {
    let source = anchored(pattern);
    REGEX_CACHE.with(|cache| {
        if let Some(regex) = cache.borrow().get(&source) {
            return Ok(regex.clone());
        }

        let regex = Regex::new(&source)?;
        cache.borrow_mut().insert(source, regex.clone());
        Ok(regex)
    })
}

/// Clear this thread's cache
pub fn clear_cache() {
    REGEX_CACHE.with(|cache| cache.borrow_mut().clear());
}

/// Number of patterns cached on this thread
pub fn cache_size() -> usize {
    REGEX_CACHE.with(|cache| cache.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_compilation() {
        clear_cache();

        assert!(get_or_compile("[0-9]+").is_ok());
        assert_eq!(cache_size(), 1);

        // Second access uses cache
        assert!(get_or_compile("[0-9]+").is_ok());
        assert_eq!(cache_size(), 1);

        assert!(get_or_compile("[a-z]+").is_ok());
        assert_eq!(cache_size(), 2);
    }

    #[test]
    fn test_invalid_pattern() {
        clear_cache();

        assert!(get_or_compile("[invalid").is_err());
        assert_eq!(cache_size(), 0);
    }

    #[test]
    fn test_anchoring() {
        let regex = get_or_compile("a|b").unwrap();
        assert_eq!(regex.find("abc").map(|m| m.as_str()), Some("a"));
        // never matches past the start
        assert!(regex.find("xb").is_none());
    }
}
