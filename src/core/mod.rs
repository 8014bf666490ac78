//! Core domain logic (frontend-agnostic)
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **schema**: Index / Library / Page / Section tree
//! - **extractor**: Language extractors and their registry
//! - **storage**: Persistent per-(project, language) index records
//! - **search**: Token subsequence search over stored indexes
//! - **indexer**: File walking and the indexing pipeline
//! - **services**: Unified service container
//! - **types**: Request and response structures
//! - **xdg**: XDG directory handling

pub mod config;
pub mod error;
pub mod extractor;
pub mod indexer;
pub mod schema;
pub mod search;
pub mod services;
pub mod storage;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{DoctreeError, ErrorKind, Result};
pub use services::Services;
