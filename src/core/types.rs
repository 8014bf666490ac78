//! Request and response types shared by the core services and the CLI.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::schema::Language;

/// One ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Project the hit belongs to
    pub project: String,

    /// Language of the index holding the hit
    pub language: Language,

    /// Library identifier
    pub library: String,

    /// Page (source file) path
    pub page_path: String,

    /// Section ids from the page down to the hit; empty for a page hit
    pub section_path: Vec<String>,

    /// Canonical path, e.g. `pkg.run`
    pub path: String,

    /// Display label
    pub label: String,

    /// Markdown detail text
    pub detail: String,

    /// Match score (higher = more relevant)
    pub score: f32,
}

/// Response from a search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Original query string
    pub query: String,

    /// Project filter, if one was given
    pub project: Option<String>,

    /// Hits, best first
    pub results: Vec<SearchResult>,

    /// Number of hits returned
    pub count: usize,

    /// Number of entries that matched before truncation
    pub total_matches: usize,

    /// Search duration in milliseconds
    pub duration_ms: u64,
}

/// Statistics from one extractor run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub project: String,
    pub language: Language,
    pub files_indexed: u64,
    pub bytes_indexed: u64,
    pub pages: usize,
    pub sections: usize,
    pub duration_ms: u64,
}

/// Outcome of indexing one project root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectIndexReport {
    pub project: String,
    pub root: PathBuf,
    /// One entry per language written, ordered by language
    pub indexes: Vec<IndexStats>,
    /// Previously stored languages this run no longer produced
    pub removed: Vec<Language>,
    pub duration_ms: u64,
}

impl ProjectIndexReport {
    pub fn total_files(&self) -> u64 {
        self.indexes.iter().map(|s| s.files_indexed).sum()
    }

    pub fn total_sections(&self) -> usize {
        self.indexes.iter().map(|s| s.sections).sum()
    }
}
