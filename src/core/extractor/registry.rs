//! Maps language tags and file extensions to extractors.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{default_extractors, LanguageExtractor};
use crate::core::config::IndexingConfig;
use crate::core::error::{DoctreeError, Result};
use crate::core::indexer::walker::SourceWalker;
use crate::core::schema::Language;

/// Immutable set of extractors, safe to share across threads
///
/// Built once from an explicit list. A second extractor claiming an
/// already registered language tag is rejected at construction.
pub struct ExtractorRegistry {
    by_language: BTreeMap<Language, Arc<dyn LanguageExtractor>>,
    by_extension: HashMap<String, Language>,
    walker: SourceWalker,
}

impl ExtractorRegistry {
    /// Build a registry from `extractors`
    ///
    /// `config` supplies the exclude patterns and size limit used by
    /// [`dispatch`](Self::dispatch), which must match what the
    /// extractors themselves walk.
    pub fn new(
        extractors: Vec<Arc<dyn LanguageExtractor>>,
        config: &IndexingConfig,
    ) -> Result<Self> {
        let mut by_language = BTreeMap::new();
        let mut by_extension = HashMap::new();

        for extractor in extractors {
            let language = extractor.language();
            if by_language.contains_key(&language) {
                return Err(DoctreeError::DuplicateExtractor(language.to_string()));
            }

            for ext in extractor.extensions() {
                let ext = ext.trim_start_matches('.').to_ascii_lowercase();
                if let Some(owner) = by_extension.get(&ext) {
                    tracing::warn!(
                        "Extension '.{}' claimed by both {} and {}; keeping {}",
                        ext,
                        owner,
                        language,
                        owner
                    );
                    continue;
                }
                by_extension.insert(ext, language.clone());
            }

            tracing::debug!("Registered extractor: {}", language);
            by_language.insert(language, extractor);
        }

        let extensions: Vec<&str> = by_extension.keys().map(String::as_str).collect();
        let walker = SourceWalker::from_config(&extensions, config)?;

        Ok(Self {
            by_language,
            by_extension,
            walker,
        })
    }

    /// Registry holding the built-in front-ends
    pub fn with_defaults(config: &IndexingConfig) -> Result<Self> {
        Self::new(default_extractors(config)?, config)
    }

    /// Extractor registered for `language`
    pub fn get(&self, language: &str) -> Option<Arc<dyn LanguageExtractor>> {
        self.by_language
            .iter()
            .find(|(tag, _)| tag.as_str() == language)
            .map(|(_, extractor)| Arc::clone(extractor))
    }

    /// Extractor responsible for files ending in `.ext`
    pub fn for_extension(&self, ext: &str) -> Option<Arc<dyn LanguageExtractor>> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        self.by_extension
            .get(&ext)
            .and_then(|language| self.by_language.get(language))
            .map(Arc::clone)
    }

    /// Registered language tags, sorted
    pub fn languages(&self) -> Vec<Language> {
        self.by_language.keys().cloned().collect()
    }

    /// Extensions handled by `language`, sorted
    pub fn extensions_for(&self, language: &Language) -> Vec<String> {
        let mut exts: Vec<String> = self
            .by_extension
            .iter()
            .filter(|(_, owner)| *owner == language)
            .map(|(ext, _)| ext.clone())
            .collect();
        exts.sort();
        exts
    }

    pub fn len(&self) -> usize {
        self.by_language.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_language.is_empty()
    }

    /// Extractors with at least one matching file under `dir`
    ///
    /// Scans recursively with the same exclude and size rules the
    /// extractors apply. Result is ordered by language tag.
    pub fn dispatch(
        &self,
        cancel: &CancellationToken,
        dir: &Path,
    ) -> Result<Vec<Arc<dyn LanguageExtractor>>> {
        let present = self.walker.present_extensions(cancel, dir)?;

        let mut matched: BTreeMap<&Language, Arc<dyn LanguageExtractor>> = BTreeMap::new();
        for ext in &present {
            if let Some(language) = self.by_extension.get(ext) {
                if let Some(extractor) = self.by_language.get(language) {
                    matched.insert(language, Arc::clone(extractor));
                }
            }
        }

        tracing::debug!(
            "Dispatch {:?}: {} extractor(s) for extensions {:?}",
            dir,
            matched.len(),
            present
        );

        Ok(matched.into_values().collect())
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}
