//! Tokenization shared by stored search keys and query strings.
//!
//! Text splits into runs of letters, digits and `_`, plus single
//! punctuation characters. Only the word runs take part in matching,
//! lowercased, so `pkg.sub.run`, `["pkg.sub", ".", "run"]` and
//! `PKG sub/run` all reduce to `pkg sub run`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::schema::SearchKey;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}_]+|[^\s\p{L}\p{N}_]").unwrap());

/// All tokens of `text`, punctuation included, original case
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// True for single punctuation tokens such as `.`, `/`, `#`
pub fn is_separator(token: &str) -> bool {
    !token
        .chars()
        .any(|c| c.is_alphanumeric() || c == '_')
}

/// Lowercased word tokens of `text`, used for matching
pub fn match_tokens(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_separator(t))
        .map(str::to_lowercase)
        .collect()
}

/// Match tokens of a search key, token by token
pub fn key_match_tokens(key: &SearchKey) -> Vec<String> {
    key.tokens().iter().flat_map(|t| match_tokens(t)).collect()
}
