//! doctree - multi-language source indexing and symbol search
//!
//! Extractors turn a directory of source files into a language-neutral
//! documentation tree. Trees are stored per (project, language) and
//! searched by token subsequence with deterministic ranking.
//!
//! # Architecture
//!
//! - **core**: Domain logic
//!   - config, error, types, xdg
//!   - schema (index tree model)
//!   - extractor (Python, Markdown, registry)
//!   - storage (atomic on-disk index store)
//!   - search (tokenizer, scorer, cached corpus)
//!   - indexer (walker, pipeline)
//!   - services (unified service container)
//!
//! - **cli**: `doctree` command-line frontend (depends on core)

pub mod cli;
pub mod core;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{DoctreeError, ErrorKind, Result};
pub use core::extractor::{ExtractorRegistry, LanguageExtractor};
pub use core::schema::{Index, Language, Library, Markdown, Page, SearchKey, Section, SectionKind};
pub use core::search::{search, SearchService};
pub use core::services::Services;
pub use core::storage::{IndexKey, IndexStore};
pub use core::types::*;
