//! Flattened, searchable view over stored indexes.
//!
//! Every page and every symbol section becomes one [`Entry`] holding
//! its canonical path tokens and a reference back to where it lives.
//! Category sections only group their children and are skipped
//! unless explicitly included.

use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;

use super::tokenize::{key_match_tokens, match_tokens};
use crate::core::error::{DoctreeError, Result};
use crate::core::schema::{Index, Language, SearchKey, Section, SectionKind};
use crate::core::storage::IndexStore;

/// One searchable page or section
#[derive(Debug, Clone)]
pub struct Entry {
    pub project: String,
    pub language: Language,
    pub library: String,
    pub page_path: String,
    /// Section ids from the page down; empty for the page itself
    pub section_path: Vec<String>,
    /// Canonical path for display and tie-breaking
    pub path: String,
    /// Lowercased match tokens of the canonical path
    pub tokens: Vec<String>,
    /// 0 for pages, +1 per symbol level below
    pub depth: usize,
    pub label: String,
    pub detail: String,
}

/// All entries built from a set of indexes, in emission order
#[derive(Debug, Default)]
pub struct Corpus {
    entries: Vec<Entry>,
    projects: BTreeSet<String>,
}

struct PageContext<'a> {
    project: &'a str,
    language: &'a Language,
    library: &'a str,
    page_path: &'a str,
    include_categories: bool,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every stored index in scope, all projects when `project` is None
    ///
    /// Keys that vanish between listing and reading are skipped.
    pub fn load(
        cancel: &CancellationToken,
        store: &IndexStore,
        project: Option<&str>,
        include_categories: bool,
    ) -> Result<Self> {
        let mut corpus = Self::new();

        for key in store.list()? {
            if project.is_some_and(|p| p != key.project) {
                continue;
            }
            if cancel.is_cancelled() {
                return Err(DoctreeError::Cancelled);
            }
            if let Some(index) = store.try_get(cancel, &key.project, &key.language)? {
                corpus.add_index(&key.project, &index, include_categories);
            }
        }

        tracing::debug!(
            "Built search corpus: {} entries across {} projects",
            corpus.len(),
            corpus.projects.len()
        );
        Ok(corpus)
    }

    /// Append the entries of `index`, stored under `project`
    pub fn add_index(&mut self, project: &str, index: &Index, include_categories: bool) {
        self.projects.insert(project.to_string());

        for library in &index.libraries {
            for page in &library.pages {
                let ctx = PageContext {
                    project,
                    language: &index.language,
                    library: &library.id,
                    page_path: &page.path,
                    include_categories,
                };

                self.push(
                    &ctx,
                    Vec::new(),
                    &page.search_key,
                    key_match_tokens(&page.search_key),
                    0,
                    &page.title,
                    page.detail.as_str(),
                );

                let mut ids = Vec::new();
                self.walk(&ctx, &page.sections, &page.search_key, &mut ids, 0);
            }
        }
    }

    fn walk(
        &mut self,
        ctx: &PageContext<'_>,
        sections: &[Section],
        parent_key: &SearchKey,
        ids: &mut Vec<String>,
        depth: usize,
    ) {
        for section in sections {
            ids.push(section.id.clone());

            match section.kind {
                SectionKind::Symbol => {
                    let key = parent_key.join(&section.search_key);
                    self.push(
                        ctx,
                        ids.clone(),
                        &key,
                        key_match_tokens(&key),
                        depth + 1,
                        &section.label,
                        section.detail.as_str(),
                    );
                    self.walk(ctx, &section.children, &key, ids, depth + 1);
                }
                SectionKind::Category => {
                    let key = parent_key.join(&section.search_key);
                    if ctx.include_categories {
                        let mut tokens = key_match_tokens(&key);
                        tokens.extend(match_tokens(&section.label));
                        self.push(
                            ctx,
                            ids.clone(),
                            &key,
                            tokens,
                            depth + 1,
                            &section.label,
                            section.detail.as_str(),
                        );
                    }
                    self.walk(ctx, &section.children, &key, ids, depth);
                }
            }

            ids.pop();
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        ctx: &PageContext<'_>,
        section_path: Vec<String>,
        key: &SearchKey,
        tokens: Vec<String>,
        depth: usize,
        label: &str,
        detail: &str,
    ) {
        self.entries.push(Entry {
            project: ctx.project.to_string(),
            language: ctx.language.clone(),
            library: ctx.library.to_string(),
            page_path: ctx.page_path.to_string(),
            section_path,
            path: key.to_string(),
            tokens,
            depth,
            label: label.to_string(),
            detail: detail.to_string(),
        });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Projects contributing at least one index
    pub fn projects(&self) -> impl Iterator<Item = &str> {
        self.projects.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
