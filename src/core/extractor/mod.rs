//! Language front-ends and the registry that dispatches to them.
//!
//! Each front-end implements [`LanguageExtractor`] and turns the
//! source files of one language under a directory into a single
//! [`Index`]. Front-ends are assembled explicitly at startup and
//! handed to [`ExtractorRegistry::new`]; there is no global
//! self-registration.
//!
//! Parsing is an opaque capability of each front-end: nothing
//! outside this module depends on tree-sitter or pulldown-cmark.

pub mod markdown;
pub mod python;
pub mod registry;

use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::core::config::IndexingConfig;
use crate::core::error::Result;
use crate::core::schema::{Index, Language, Library};

pub use markdown::MarkdownExtractor;
pub use python::PythonExtractor;
pub use registry::ExtractorRegistry;

/// Contract implemented by every language front-end
pub trait LanguageExtractor: Send + Sync {
    /// Tag identifying the language, unique within a registry
    fn language(&self) -> Language;

    /// File extensions handled, lowercase without the dot
    fn extensions(&self) -> &[&'static str];

    /// Index every matching file under `dir`
    ///
    /// Implementations check `cancel` at least once per file and
    /// return [`crate::core::error::DoctreeError::Cancelled`] when it fires.
    fn index_dir(&self, cancel: &CancellationToken, dir: &Path) -> Result<Index>;
}

/// The built-in front-ends, in registration order
pub fn default_extractors(config: &IndexingConfig) -> Result<Vec<Arc<dyn LanguageExtractor>>> {
    Ok(vec![
        Arc::new(PythonExtractor::new(config)?),
        Arc::new(MarkdownExtractor::new(config)?),
    ])
}

/// Library wrapping everything found under `dir`
///
/// Identity metadata is not read from manifests; name and id are the
/// directory's base name and the remaining fields stay empty.
pub(crate) fn directory_library(dir: &Path) -> Library {
    let name = dir
        .canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "root".to_string());
    Library::new(name.clone(), name)
}
