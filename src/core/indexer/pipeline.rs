//! Indexing pipeline orchestration.
//!
//! Coordinates indexing of one project root:
//! 1. Dispatch the root to every extractor with matching files
//! 2. Run each extractor on the blocking pool, bounded by a semaphore
//! 3. Store each resulting index under (project, language)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::core::error::{DoctreeError, Result};
use crate::core::extractor::{ExtractorRegistry, LanguageExtractor};
use crate::core::schema::Language;
use crate::core::storage::{encode_project, IndexStore};
use crate::core::types::{IndexStats, ProjectIndexReport};

/// Orchestrates extraction and storage for a project
pub struct IndexingPipeline {
    registry: Arc<ExtractorRegistry>,
    store: Arc<IndexStore>,
    permits: Arc<Semaphore>,
}

impl IndexingPipeline {
    /// Create a new indexing pipeline
    ///
    /// # Arguments
    ///
    /// * `registry` - Extractors to dispatch to
    /// * `store` - Destination for produced indexes
    /// * `max_concurrent` - Upper bound on extractors running at once
    pub fn new(
        registry: Arc<ExtractorRegistry>,
        store: Arc<IndexStore>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            registry,
            store,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn registry(&self) -> &Arc<ExtractorRegistry> {
        &self.registry
    }

    /// Index `root` and store one index per language found
    ///
    /// The first failing extractor cancels the others and its error
    /// is returned. Indexes already stored by finished extractors are
    /// kept. A root with no supported files yields an empty report.
    pub async fn index_project(
        &self,
        cancel: &CancellationToken,
        project: &str,
        root: &Path,
    ) -> Result<ProjectIndexReport> {
        let start = Instant::now();

        encode_project(project)?;
        let root = canonical_root(root)?;

        let dispatch_root = root.clone();
        let registry = Arc::clone(&self.registry);
        let dispatch_cancel = cancel.clone();
        let extractors = tokio::task::spawn_blocking(move || {
            registry.dispatch(&dispatch_cancel, &dispatch_root)
        })
        .await??;

        tracing::info!(
            "Indexing project '{}' at {:?} with {} extractor(s)",
            project,
            root,
            extractors.len()
        );

        let child = cancel.child_token();
        let mut tasks = JoinSet::new();
        for extractor in extractors {
            let permits = Arc::clone(&self.permits);
            let store = Arc::clone(&self.store);
            let cancel = child.clone();
            let project = project.to_string();
            let root = root.clone();

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|_| DoctreeError::Cancelled)?;
                if cancel.is_cancelled() {
                    return Err(DoctreeError::Cancelled);
                }
                tokio::task::spawn_blocking(move || {
                    run_extractor(&cancel, &store, extractor.as_ref(), &project, &root)
                })
                .await?
            });
        }

        let mut indexes = Vec::new();
        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(DoctreeError::from).and_then(|r| r);
            match outcome {
                Ok(stats) => indexes.push(stats),
                Err(e) => {
                    if first_error.is_none() {
                        tracing::warn!("Indexing project '{}' failed: {}", project, e);
                        child.cancel();
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_error {
            // A caller-side cancel outranks whatever the extractors saw
            if cancel.is_cancelled() {
                return Err(DoctreeError::Cancelled);
            }
            return Err(e);
        }

        indexes.sort_by(|a, b| a.language.cmp(&b.language));
        let removed = self.remove_stale(project, &indexes).await?;
        let duration_ms = start.elapsed().as_millis() as u64;

        let report = ProjectIndexReport {
            project: project.to_string(),
            root,
            indexes,
            removed,
            duration_ms,
        };

        tracing::info!(
            "Indexed project '{}': {} files, {} sections in {}ms",
            project,
            report.total_files(),
            report.total_sections(),
            duration_ms
        );

        Ok(report)
    }

    /// Delete stored languages of `project` that this run did not write
    async fn remove_stale(&self, project: &str, written: &[IndexStats]) -> Result<Vec<Language>> {
        let store = Arc::clone(&self.store);
        let project = project.to_string();
        let written: Vec<Language> = written.iter().map(|s| s.language.clone()).collect();

        tokio::task::spawn_blocking(move || -> Result<Vec<Language>> {
            let mut removed = Vec::new();
            for language in store.languages_for(&project)? {
                if written.contains(&language) {
                    continue;
                }
                if store.delete(&project, &language)? {
                    tracing::info!("Removed stale {} index of project '{}'", language, project);
                    removed.push(language);
                }
            }
            Ok(removed)
        })
        .await?
    }
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    if !root.is_dir() {
        return Err(DoctreeError::InvalidPath(format!(
            "Not a directory: {}",
            root.display()
        )));
    }
    root.canonicalize().map_err(|e| DoctreeError::io(root, e))
}

fn run_extractor(
    cancel: &CancellationToken,
    store: &IndexStore,
    extractor: &dyn LanguageExtractor,
    project: &str,
    root: &Path,
) -> Result<IndexStats> {
    let start = Instant::now();
    let language = extractor.language();

    let index = extractor.index_dir(cancel, root)?;
    store.put(cancel, project, &language, &index)?;

    Ok(IndexStats {
        project: project.to_string(),
        language,
        files_indexed: index.num_files,
        bytes_indexed: index.num_bytes,
        pages: index.page_count(),
        sections: index.section_count(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}
