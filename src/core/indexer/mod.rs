//! Source discovery and indexing orchestration.
//!
//! - **walker**: directory traversal with exclude, hidden and size rules
//! - **pipeline**: runs extractors for a project root and stores the result

pub mod pipeline;
pub mod walker;

pub use pipeline::IndexingPipeline;
pub use walker::{SourceFile, SourceWalker};
