//! File system walker with extension and pattern filtering.
//!
//! Shared by the extractor registry (to decide which extractors
//! apply to a directory) and by the extractors themselves, so both
//! always agree on the set of files under consideration. Walk errors
//! such as permission denied are logged and skipped.

use glob::Pattern;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use walkdir::{DirEntry, WalkDir};

use crate::core::config::IndexingConfig;
use crate::core::error::{DoctreeError, Result};

/// A file selected by the walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute (or root-joined) path on disk
    pub path: PathBuf,
    /// Path relative to the walk root, `/`-separated
    pub relative: String,
    /// Size in bytes at walk time
    pub size: u64,
}

impl SourceFile {
    /// Lowercased extension without the dot
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Recursive walker filtering by extension, exclude globs and size
#[derive(Debug, Clone)]
pub struct SourceWalker {
    /// Accepted extensions, lowercase, no dot. Empty accepts all.
    extensions: BTreeSet<String>,

    /// Patterns to exclude (e.g., "**/target/**", "**/.git/**")
    exclude_patterns: Vec<Pattern>,

    /// Maximum file size in bytes (skip larger files)
    max_file_size_bytes: u64,
}

impl SourceWalker {
    /// Create a new walker
    ///
    /// # Arguments
    ///
    /// * `extensions` - File extensions to accept (with or without dot)
    /// * `exclude_patterns` - Glob patterns for paths to skip
    /// * `max_file_size_mb` - Maximum file size in megabytes
    pub fn new<S: AsRef<str>>(
        extensions: &[S],
        exclude_patterns: &[String],
        max_file_size_mb: usize,
    ) -> Result<Self> {
        let exclude = exclude_patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    DoctreeError::ConfigError(format!("Invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            exclude_patterns: exclude,
            max_file_size_bytes: (max_file_size_mb as u64).saturating_mul(1024 * 1024),
        })
    }

    /// Build a walker for `extensions` using the indexing settings
    pub fn from_config<S: AsRef<str>>(extensions: &[S], config: &IndexingConfig) -> Result<Self> {
        Self::new(extensions, &config.exclude_patterns, config.max_file_size_mb)
    }

    /// Collect matching files, sorted by relative path
    ///
    /// Returns [`DoctreeError::Cancelled`] as soon as `cancel` fires.
    pub fn collect_files(&self, cancel: &CancellationToken, root: &Path) -> Result<Vec<SourceFile>> {
        if !root.is_dir() {
            return Err(DoctreeError::InvalidPath(format!(
                "not a directory: {}",
                root.display()
            )));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, root))
        {
            if cancel.is_cancelled() {
                return Err(DoctreeError::Cancelled);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.matches_extension(path) {
                continue;
            }

            let relative = match relative_path(root, path) {
                Some(relative) => relative,
                None => {
                    tracing::warn!("Skipping non UTF-8 path: {:?}", path);
                    continue;
                }
            };

            if self.is_excluded(&relative) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    tracing::warn!("Skipping {:?}: cannot read metadata: {}", path, e);
                    continue;
                }
            };
            if size > self.max_file_size_bytes {
                tracing::warn!("Skipping large file: {:?} ({} bytes)", path, size);
                continue;
            }

            files.push(SourceFile {
                path: path.to_path_buf(),
                relative,
                size,
            });
        }

        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(files)
    }

    /// Extensions present under `root` that this walker accepts
    pub fn present_extensions(
        &self,
        cancel: &CancellationToken,
        root: &Path,
    ) -> Result<BTreeSet<String>> {
        Ok(self
            .collect_files(cancel, root)?
            .iter()
            .filter_map(SourceFile::extension)
            .collect())
    }

    /// Filters out hidden and excluded directories. Never filters the root.
    fn should_process_entry(&self, entry: &DirEntry, root: &Path) -> bool {
        let path = entry.path();

        if path == root {
            return true;
        }

        if !entry.file_type().is_dir() {
            return true;
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                return false;
            }
        }

        // Excludes apply below the root only, never to where the root lives
        if let Some(relative) = relative_path(root, path) {
            if self.is_excluded(&relative) {
                tracing::debug!("Skipping excluded directory: {:?}", path);
                return false;
            }
        }

        true
    }

    fn matches_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    fn is_excluded(&self, relative: &str) -> bool {
        self.exclude_patterns.iter().any(|p| p.matches(relative))
    }
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
