//! List command - show stored indexes

use crate::cli::output::{colors, format_bytes, format_relative_time, print_json};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::storage::IndexSummary;
use clap::Args;
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list this project
    #[arg(long, short = 'p')]
    pub project: Option<String>,
}

/// One stored index
#[derive(Debug, Serialize)]
pub struct ListItem {
    pub project: String,
    pub language: String,
    pub schema_version: u32,
    pub compatible: bool,
    pub files: u64,
    pub source_bytes: u64,
    pub record_bytes: u64,
    pub modified: Option<String>,
}

/// List response
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub count: usize,
    pub indexes: Vec<ListItem>,
}

impl From<&IndexSummary> for ListItem {
    fn from(s: &IndexSummary) -> Self {
        Self {
            project: s.key.project.clone(),
            language: s.key.language.to_string(),
            schema_version: s.schema_version,
            compatible: s.compatible,
            files: s.num_files,
            source_bytes: s.num_bytes,
            record_bytes: s.record_bytes,
            modified: s.modified.map(|m| m.to_rfc3339()),
        }
    }
}

/// Collect the listing without printing
pub fn list(
    args: &ListArgs,
    services: &Arc<Services>,
    cancel: &CancellationToken,
) -> Result<(ListResponse, Vec<IndexSummary>), Box<dyn Error>> {
    let summaries: Vec<IndexSummary> = services
        .store
        .summaries(cancel)?
        .into_iter()
        .filter(|s| args.project.as_ref().is_none_or(|p| *p == s.key.project))
        .collect();

    let response = ListResponse {
        count: summaries.len(),
        indexes: summaries.iter().map(ListItem::from).collect(),
    };
    Ok((response, summaries))
}

/// Execute the list command
pub async fn execute(
    args: ListArgs,
    services: &Arc<Services>,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn Error>> {
    let (response, summaries) = list(&args, services, cancel)?;

    match format {
        OutputFormat::Human => {
            if summaries.is_empty() {
                println!(
                    "Nothing indexed yet. Run '{}' to index a directory.",
                    colors::label("doctree index <path>")
                );
                return Ok(());
            }

            println!(
                "{} ({}):",
                colors::label("Indexes"),
                colors::number(&response.count.to_string())
            );
            for summary in &summaries {
                let modified = summary
                    .modified
                    .as_ref()
                    .map(format_relative_time)
                    .unwrap_or_default();
                let status = if summary.compatible {
                    String::new()
                } else {
                    format!(
                        "  {}",
                        colors::warning(&format!(
                            "schema v{}: re-index required",
                            summary.schema_version
                        ))
                    )
                };
                println!(
                    "  {:<20} {:<10} {:>6} files  {:>10}  {}{}",
                    colors::project(&summary.key.project),
                    colors::language(summary.key.language.as_str()),
                    colors::number(&summary.num_files.to_string()),
                    colors::number(&format_bytes(summary.record_bytes)),
                    colors::dim(&modified),
                    status
                );
            }
        }
        OutputFormat::Json => print_json(&response)?,
    }

    Ok(())
}
