//! Index command - extract and store a project's indexes

use crate::cli::output::{colors, format_bytes, format_duration};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::types::ProjectIndexReport;
use clap::Args;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Arguments for the index command
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Directory to index
    pub path: PathBuf,

    /// Project name (defaults to the directory's base name)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Per-language line of the index response
#[derive(Debug, Serialize)]
pub struct IndexedLanguage {
    pub language: String,
    pub files: u64,
    pub bytes: u64,
    pub pages: usize,
    pub sections: usize,
}

/// Indexing result response
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub project: String,
    pub path: String,
    pub languages: Vec<IndexedLanguage>,
    /// Stored languages dropped because no matching files remain
    pub removed: Vec<String>,
    pub files_indexed: u64,
    pub sections: usize,
    pub duration_secs: f64,
}

impl From<ProjectIndexReport> for IndexResponse {
    fn from(report: ProjectIndexReport) -> Self {
        Self {
            files_indexed: report.total_files(),
            sections: report.total_sections(),
            duration_secs: report.duration_ms as f64 / 1000.0,
            project: report.project,
            path: report.root.to_string_lossy().into_owned(),
            removed: report.removed.iter().map(ToString::to_string).collect(),
            languages: report
                .indexes
                .into_iter()
                .map(|s| IndexedLanguage {
                    language: s.language.to_string(),
                    files: s.files_indexed,
                    bytes: s.bytes_indexed,
                    pages: s.pages,
                    sections: s.sections,
                })
                .collect(),
        }
    }
}

/// Project name used when none is given: the directory's base name
pub fn default_project_name(path: &Path) -> Option<String> {
    let resolved = path.canonicalize().ok()?;
    resolved
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

/// Index `args.path` and return the response without printing it
pub async fn index(
    args: &IndexArgs,
    services: &Arc<Services>,
    cancel: &CancellationToken,
) -> Result<IndexResponse, Box<dyn Error>> {
    let project = match &args.project {
        Some(project) => project.clone(),
        None => default_project_name(&args.path).ok_or_else(|| {
            format!(
                "Cannot derive a project name from '{}'. Pass --project NAME.",
                args.path.display()
            )
        })?,
    };

    let report = services
        .pipeline
        .index_project(cancel, &project, &args.path)
        .await?;
    Ok(report.into())
}

/// Execute the index command
pub async fn execute(
    args: IndexArgs,
    services: &Arc<Services>,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn Error>> {
    if !args.quiet && format == OutputFormat::Human {
        eprintln!(
            "Indexing {}...",
            colors::file_path(&args.path.display().to_string())
        );
    }

    let response = index(&args, services, cancel).await?;

    match format {
        OutputFormat::Human => {
            for language in &response.removed {
                println!(
                    "  {:<10} {}",
                    colors::language(language),
                    colors::dim("removed (no matching files left)")
                );
            }
            if response.languages.is_empty() {
                println!(
                    "No supported source files under {}. Run '{}' to see what can be indexed.",
                    colors::file_path(&response.path),
                    colors::label("doctree languages")
                );
                return Ok(());
            }
            for lang in &response.languages {
                println!(
                    "  {:<10} {:>6} files  {:>8}  {:>6} pages  {:>7} sections",
                    colors::language(&lang.language),
                    colors::number(&lang.files.to_string()),
                    colors::number(&format_bytes(lang.bytes)),
                    colors::number(&lang.pages.to_string()),
                    colors::number(&lang.sections.to_string())
                );
            }
            println!(
                "{} '{}': {} files ({} sections) in {}",
                colors::success("Indexed"),
                colors::project(&response.project),
                colors::number(&response.files_indexed.to_string()),
                colors::number(&response.sections.to_string()),
                colors::number(&format_duration(response.duration_secs))
            );
        }
        OutputFormat::Json => {
            crate::cli::output::print_json(&response)?;
        }
    }

    Ok(())
}
