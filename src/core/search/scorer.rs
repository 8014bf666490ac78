//! Lexical match scoring.
//!
//! Query tokens are matched in order against an entry's path tokens,
//! maximising how many match and then preferring an exact token over
//! one that merely contains the query token. Gaps are allowed; unmatched query
//! tokens simply earn nothing. An entry matching no query token
//! scores zero and is dropped.

use std::cmp::Ordering;

use super::corpus::Entry;

/// Per query token found in the path
pub const MATCH_WEIGHT: f32 = 10.0;
/// Extra for a whole-token match over a substring match
pub const EXACT_BONUS: f32 = 5.0;
/// Extra when a match directly follows the previous one
pub const CONTIGUITY_BONUS: f32 = 2.0;
/// Extra when the entry's own name (last token) matched exactly
pub const TAIL_BONUS: f32 = 3.0;
/// Extra when the query also names the entry's project
pub const PROJECT_BONUS: f32 = 15.0;
/// Subtracted per nesting level, capped at [`MAX_PENALIZED_DEPTH`]
pub const DEPTH_PENALTY: f32 = 0.1;
pub const MAX_PENALIZED_DEPTH: usize = 9;

/// Breakdown of a subsequence match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub matched: usize,
    pub exact: usize,
    pub contiguous: usize,
    pub tail_exact: bool,
}

impl MatchStats {
    /// Comparison key: more matches first, then exact, contiguous, tail
    fn key(&self) -> (usize, usize, usize, bool) {
        (self.matched, self.exact, self.contiguous, self.tail_exact)
    }
}

/// Best in-order match of `query` against `path`
///
/// Maximises the number of query tokens matched as a subsequence,
/// then the number of exact matches, then contiguity, then an exact
/// tail. `best[p]` holds the best match so far whose last matched
/// token is `path[p - 1]`; `best[0]` is "nothing matched yet".
pub fn match_subsequence(query: &[String], path: &[String]) -> MatchStats {
    let n = path.len();
    let mut best: Vec<Option<MatchStats>> = vec![None; n + 1];
    best[0] = Some(MatchStats::default());

    for token in query {
        let mut next = best.clone();
        for (p, stats) in best.iter().enumerate() {
            let Some(stats) = stats else {
                continue;
            };
            for (q, candidate_token) in path.iter().enumerate().skip(p) {
                let exact = candidate_token == token;
                if !exact && !candidate_token.contains(token.as_str()) {
                    continue;
                }

                let candidate = MatchStats {
                    matched: stats.matched + 1,
                    exact: stats.exact + usize::from(exact),
                    contiguous: stats.contiguous + usize::from(p > 0 && q == p),
                    tail_exact: stats.tail_exact || (exact && q + 1 == n),
                };
                if next[q + 1].is_none_or(|current| candidate.key() > current.key()) {
                    next[q + 1] = Some(candidate);
                }
            }
        }
        best = next;
    }

    best.into_iter()
        .flatten()
        .max_by_key(MatchStats::key)
        .unwrap_or_default()
}

/// True when `query` contains the project's tokens as a contiguous run
pub fn names_project(query: &[String], project_tokens: &[String]) -> bool {
    !project_tokens.is_empty()
        && query
            .windows(project_tokens.len())
            .any(|window| window == project_tokens)
}

/// Score of `entry` for `query`; zero means no match
pub fn score_entry(query: &[String], entry: &Entry, project_named: bool) -> f32 {
    let stats = match_subsequence(query, &entry.tokens);
    if stats.matched == 0 {
        return 0.0;
    }

    let mut score = stats.matched as f32 * MATCH_WEIGHT
        + stats.exact as f32 * EXACT_BONUS
        + stats.contiguous as f32 * CONTIGUITY_BONUS;
    if stats.tail_exact {
        score += TAIL_BONUS;
    }
    if project_named {
        score += PROJECT_BONUS;
    }
    score - entry.depth.min(MAX_PENALIZED_DEPTH) as f32 * DEPTH_PENALTY
}

/// Total order used for ranking: best score first, then shallower,
/// then by path and location so equal inputs always sort the same
pub fn compare_ranked(a: (f32, &Entry), b: (f32, &Entry)) -> Ordering {
    let (sa, ea) = a;
    let (sb, eb) = b;
    sb.total_cmp(&sa)
        .then_with(|| ea.depth.cmp(&eb.depth))
        .then_with(|| ea.path.cmp(&eb.path))
        .then_with(|| ea.project.cmp(&eb.project))
        .then_with(|| ea.language.cmp(&eb.language))
        .then_with(|| ea.page_path.cmp(&eb.page_path))
        .then_with(|| ea.section_path.cmp(&eb.section_path))
}
