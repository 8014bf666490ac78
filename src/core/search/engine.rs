//! Ranked symbol search over stored indexes.
//!
//! This module provides the SearchService for answering token
//! queries, optionally scoped to one project.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::corpus::{Corpus, Entry};
use super::scorer::{compare_ranked, names_project, score_entry};
use super::tokenize::match_tokens;
use crate::core::config::SearchConfig;
use crate::core::error::{DoctreeError, Result};
use crate::core::storage::{IndexStore, RecordStamp};
use crate::core::types::{SearchResponse, SearchResult};

/// Entries scored between cancellation checks
const CANCEL_CHECK_INTERVAL: usize = 1024;

struct CachedCorpus {
    generation: u64,
    fingerprint: Vec<RecordStamp>,
    corpus: Arc<Corpus>,
}

/// Symbol search service
///
/// With caching enabled one corpus per project scope (`None` for all
/// projects) is kept between queries and rebuilt when the store's
/// generation or on-disk fingerprint moves, so any `put` or `delete`
/// is visible to the next query. A scoped corpus only ever reads the
/// records of its own project.
pub struct SearchService {
    store: Arc<IndexStore>,
    config: SearchConfig,
    cache: RwLock<HashMap<Option<String>, CachedCorpus>>,
}

impl SearchService {
    /// Create a new search service
    pub fn new(store: Arc<IndexStore>, config: SearchConfig) -> Self {
        Self {
            store,
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    /// Drop any cached corpus
    pub fn refresh(&self) {
        self.cache.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Execute a search
    ///
    /// `project`, when given, restricts candidates before scoring.
    /// `k` defaults to `default_k` and is capped at `max_k`.
    pub fn search(
        &self,
        cancel: &CancellationToken,
        query: &str,
        project: Option<&str>,
        k: Option<usize>,
    ) -> Result<SearchResponse> {
        let start = Instant::now();

        if query.trim().is_empty() {
            return Err(DoctreeError::InvalidQuery(
                "Query cannot be empty".to_string(),
            ));
        }
        if query.chars().count() > self.config.max_query_length {
            return Err(DoctreeError::InvalidQuery(format!(
                "Query exceeds {} characters",
                self.config.max_query_length
            )));
        }

        let k_limit = k.unwrap_or(self.config.default_k).clamp(1, self.config.max_k);
        let tokens = match_tokens(query);

        let mut results = Vec::new();
        let mut total_matches = 0;
        if !tokens.is_empty() {
            let corpus = self.corpus(cancel, project)?;
            let ranked = rank(cancel, &corpus, &tokens, project)?;
            total_matches = ranked.len();
            results = ranked
                .into_iter()
                .take(k_limit)
                .map(|(score, entry)| to_result(score, entry))
                .collect();
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let count = results.len();

        tracing::info!(
            "Search '{}' (project: {}): {} of {} matches in {}ms",
            query,
            project.unwrap_or("*"),
            count,
            total_matches,
            duration_ms
        );

        Ok(SearchResponse {
            query: query.to_string(),
            project: project.map(str::to_string),
            results,
            count,
            total_matches,
            duration_ms,
        })
    }

    fn corpus(&self, cancel: &CancellationToken, project: Option<&str>) -> Result<Arc<Corpus>> {
        let include_categories = self.config.include_categories;

        if !self.config.cache {
            return Ok(Arc::new(Corpus::load(
                cancel,
                &self.store,
                project,
                include_categories,
            )?));
        }

        let generation = self.store.generation();
        let fingerprint = self.store.fingerprint()?;

        let scope = project.map(str::to_string);

        {
            let guard = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = guard.get(&scope) {
                if cached.generation == generation && cached.fingerprint == fingerprint {
                    return Ok(Arc::clone(&cached.corpus));
                }
            }
        }

        let corpus = Arc::new(Corpus::load(cancel, &self.store, project, include_categories)?);

        let mut guard = self.cache.write().unwrap_or_else(|e| e.into_inner());
        guard.retain(|_, cached| cached.generation == generation && cached.fingerprint == fingerprint);
        guard.insert(
            scope,
            CachedCorpus {
                generation,
                fingerprint,
                corpus: Arc::clone(&corpus),
            },
        );
        Ok(corpus)
    }
}

/// Score every in-scope entry and sort best first
fn rank<'c>(
    cancel: &CancellationToken,
    corpus: &'c Corpus,
    tokens: &[String],
    project: Option<&str>,
) -> Result<Vec<(f32, &'c Entry)>> {
    let named: HashMap<&str, bool> = corpus
        .projects()
        .map(|p| (p, names_project(tokens, &match_tokens(p))))
        .collect();

    let mut ranked = Vec::new();
    for (i, entry) in corpus.entries().iter().enumerate() {
        if i % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            return Err(DoctreeError::Cancelled);
        }
        if project.is_some_and(|p| p != entry.project) {
            continue;
        }

        let project_named = named.get(entry.project.as_str()).copied().unwrap_or(false);
        let score = score_entry(tokens, entry, project_named);
        if score > 0.0 {
            ranked.push((score, entry));
        }
    }

    ranked.sort_by(|a, b| compare_ranked(*a, *b));
    Ok(ranked)
}

fn to_result(score: f32, entry: &Entry) -> SearchResult {
    SearchResult {
        project: entry.project.clone(),
        language: entry.language.clone(),
        library: entry.library.clone(),
        page_path: entry.page_path.clone(),
        section_path: entry.section_path.clone(),
        path: entry.path.clone(),
        label: entry.label.clone(),
        detail: entry.detail.clone(),
        score,
    }
}

/// One-shot search against the store at `store_location`
///
/// Builds a fresh corpus with default search settings and returns
/// up to `max_k` results.
pub fn search(
    cancel: &CancellationToken,
    store_location: &Path,
    query: &str,
    project: Option<&str>,
) -> Result<Vec<SearchResult>> {
    let config = SearchConfig {
        cache: false,
        ..SearchConfig::default()
    };
    let k = config.max_k;
    let service = SearchService::new(Arc::new(IndexStore::new(store_location)), config);
    Ok(service.search(cancel, query, project, Some(k))?.results)
}
