//! Unified service container for doctree
//!
//! Provides shared access to all core services.

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::extractor::ExtractorRegistry;
use crate::core::indexer::IndexingPipeline;
use crate::core::search::SearchService;
use crate::core::storage::IndexStore;
use std::sync::Arc;

/// Unified services container
#[derive(Clone)]
pub struct Services {
    /// Persistent index store
    pub store: Arc<IndexStore>,

    /// Registered language extractors
    pub registry: Arc<ExtractorRegistry>,

    /// Extraction + storage driver
    pub pipeline: Arc<IndexingPipeline>,

    /// Search over stored indexes
    pub search: Arc<SearchService>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration with the built-in extractors
    pub fn new(config: Config) -> Result<Self> {
        let registry = ExtractorRegistry::with_defaults(&config.indexing)?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create services around an explicitly assembled registry
    pub fn with_registry(config: Config, registry: ExtractorRegistry) -> Self {
        let store = Arc::new(IndexStore::new(config.storage.index_dir.clone()));
        let registry = Arc::new(registry);

        let pipeline = Arc::new(IndexingPipeline::new(
            Arc::clone(&registry),
            Arc::clone(&store),
            config.limits.max_concurrent_indexes,
        ));

        let search = Arc::new(SearchService::new(
            Arc::clone(&store),
            config.search.clone(),
        ));

        Self {
            store,
            registry,
            pipeline,
            search,
            config: Arc::new(config),
        }
    }
}
