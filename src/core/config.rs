//! Configuration management for doctree.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{DoctreeError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Indexing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexingConfig {
    /// Maximum file size in MB (skip larger files)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: usize,

    /// File patterns to exclude (glob syntax)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Let extractors drop conventional test files
    #[serde(default = "default_skip_test_files")]
    pub skip_test_files: bool,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory of the index store
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,
}

/// Search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Default number of results to return
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Maximum results per query
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    /// Maximum query string length
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,

    /// Score grouping sections ("Functions", "Classes") as matches
    #[serde(default)]
    pub include_categories: bool,

    /// Keep the built corpus between queries
    #[serde(default = "default_cache")]
    pub cache: bool,
}

/// Limits configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Maximum concurrent extractor runs
    #[serde(default = "default_max_concurrent_indexes")]
    pub max_concurrent_indexes: usize,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_sec: u64,
}

// Default value functions
fn default_max_file_size() -> usize {
    10
}

fn default_skip_test_files() -> bool {
    true
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("./data/index")
}

fn default_k() -> usize {
    10
}

fn default_max_k() -> usize {
    100
}

fn default_max_query_length() -> usize {
    500
}

fn default_cache() -> bool {
    true
}

fn default_max_concurrent_indexes() -> usize {
    4
}

fn default_request_timeout() -> u64 {
    300
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        "**/.git/**".to_string(),
        "**/.hg/**".to_string(),
        "**/.svn/**".to_string(),
        "**/node_modules/**".to_string(),
        "**/target/**".to_string(),
        "**/vendor/**".to_string(),
        "**/build/**".to_string(),
        "**/dist/**".to_string(),
        "**/__pycache__/**".to_string(),
        "**/.venv/**".to_string(),
        "**/venv/**".to_string(),
        "**/.tox/**".to_string(),
        "**/site-packages/**".to_string(),
        "**/*.egg-info/**".to_string(),
    ]
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size(),
            exclude_patterns: default_exclude_patterns(),
            skip_test_files: default_skip_test_files(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            max_k: default_max_k(),
            max_query_length: default_max_query_length(),
            include_categories: false,
            cache: default_cache(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_indexes: default_max_concurrent_indexes(),
            request_timeout_sec: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| DoctreeError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// File priority:
    /// 1. DOCTREE_CONFIG env var
    /// 2. XDG config file (~/.config/doctree/config.toml)
    /// 3. ./doctree.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("DOCTREE_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("doctree.toml").exists() {
                Self::from_file("doctree.toml")?
            } else {
                Self::default()
            }
        };

        // Place the store under the XDG data directory unless a file set it
        if env::var("DOCTREE_DATA_DIR").is_err() && config.storage.index_dir == default_index_dir()
        {
            config.storage.index_dir = xdg.index_dir();
        }

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // Indexing configuration
        if let Some(size) = parse_env("DOCTREE_MAX_FILE_SIZE_MB") {
            self.indexing.max_file_size_mb = size;
        }
        if let Some(skip) = parse_env("DOCTREE_SKIP_TEST_FILES") {
            self.indexing.skip_test_files = skip;
        }

        // Storage configuration
        if let Ok(data_dir) = env::var("DOCTREE_DATA_DIR") {
            self.storage.index_dir = PathBuf::from(data_dir).join("index");
        }

        // Search configuration
        if let Some(k) = parse_env("DOCTREE_DEFAULT_K") {
            self.search.default_k = k;
        }
        if let Some(k) = parse_env("DOCTREE_MAX_K") {
            self.search.max_k = k;
        }
        if let Some(len) = parse_env("DOCTREE_MAX_QUERY_LENGTH") {
            self.search.max_query_length = len;
        }
        if let Some(include) = parse_env("DOCTREE_INCLUDE_CATEGORIES") {
            self.search.include_categories = include;
        }
        if let Some(cache) = parse_env("DOCTREE_SEARCH_CACHE") {
            self.search.cache = cache;
        }

        // Limits configuration
        if let Some(max) = parse_env("DOCTREE_MAX_CONCURRENT_INDEXES") {
            self.limits.max_concurrent_indexes = max;
        }
        if let Some(t) = parse_env("DOCTREE_REQUEST_TIMEOUT_SEC") {
            self.limits.request_timeout_sec = t;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.indexing.max_file_size_mb == 0 {
            return Err(DoctreeError::ConfigError(
                "Max file size must be non-zero".to_string(),
            ));
        }

        for pattern in &self.indexing.exclude_patterns {
            glob::Pattern::new(pattern).map_err(|e| {
                DoctreeError::ConfigError(format!("Invalid exclude pattern '{pattern}': {e}"))
            })?;
        }

        if self.search.default_k == 0 {
            return Err(DoctreeError::ConfigError(
                "Default k must be non-zero".to_string(),
            ));
        }

        if self.search.default_k > self.search.max_k {
            return Err(DoctreeError::ConfigError(
                "Default k cannot exceed max k".to_string(),
            ));
        }

        if self.search.max_query_length == 0 {
            return Err(DoctreeError::ConfigError(
                "Max query length must be non-zero".to_string(),
            ));
        }

        if self.limits.max_concurrent_indexes == 0 {
            return Err(DoctreeError::ConfigError(
                "Max concurrent indexes must be non-zero".to_string(),
            ));
        }

        if self.limits.request_timeout_sec == 0 {
            return Err(DoctreeError::ConfigError(
                "Request timeout must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::debug!("Configuration loaded:");
        tracing::debug!("  Max file size: {} MB", self.indexing.max_file_size_mb);
        tracing::debug!(
            "  Exclude patterns: {} patterns",
            self.indexing.exclude_patterns.len()
        );
        tracing::debug!("  Skip test files: {}", self.indexing.skip_test_files);
        tracing::debug!("  Index dir: {:?}", self.storage.index_dir);
        tracing::debug!("  Default k: {}", self.search.default_k);
        tracing::debug!("  Max k: {}", self.search.max_k);
        tracing::debug!("  Max query length: {}", self.search.max_query_length);
        tracing::debug!("  Include categories: {}", self.search.include_categories);
        tracing::debug!("  Search cache: {}", self.search.cache);
        tracing::debug!(
            "  Max concurrent indexes: {}",
            self.limits.max_concurrent_indexes
        );
        tracing::debug!("  Request timeout: {}s", self.limits.request_timeout_sec);
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.parse().ok())
}
