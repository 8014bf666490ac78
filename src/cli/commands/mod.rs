//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a specific CLI command.

pub mod completions;
pub mod config;
pub mod delete;
pub mod index;
pub mod languages;
pub mod list;
pub mod search;

// Re-export argument types for use in mod.rs
pub use completions::CompletionsArgs;
pub use config::ConfigArgs;
pub use delete::DeleteArgs;
pub use index::IndexArgs;
pub use languages::LanguagesArgs;
pub use list::ListArgs;
pub use search::SearchArgs;
