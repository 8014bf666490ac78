//! Ranked symbol search.
//!
//! Stored indexes are flattened into a [`corpus::Corpus`] of path
//! entries which are scored against query tokens by subsequence match.

mod corpus;
mod engine;
mod scorer;
mod tokenize;

pub use corpus::{Corpus, Entry};
pub use engine::{search, SearchService};
pub use scorer::{compare_ranked, match_subsequence, names_project, score_entry, MatchStats};
pub use tokenize::{is_separator, key_match_tokens, match_tokens, tokenize};
