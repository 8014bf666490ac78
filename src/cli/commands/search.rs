//! Search command - ranked symbol search

use crate::cli::output::{colors, print_json, summary_line};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::types::SearchResponse;
use clap::Args;
use std::error::Error;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query, e.g. `pkg.run` or `install guide`
    pub query: String,

    /// Restrict results to one project
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Maximum number of results (default from config)
    #[arg(long = "limit", short = 'k')]
    pub limit: Option<usize>,
}

/// Outcome of a search command
#[derive(Debug)]
pub enum SearchOutcome {
    /// The store (or the requested project) has no indexes
    NothingIndexed,
    Results(SearchResponse),
}

/// Run the search on the blocking pool without printing
pub async fn search(
    args: &SearchArgs,
    services: &Arc<Services>,
    cancel: &CancellationToken,
) -> Result<SearchOutcome, Box<dyn Error>> {
    let indexed = match &args.project {
        Some(project) => !services.store.languages_for(project)?.is_empty(),
        None => !services.store.list()?.is_empty(),
    };
    if !indexed {
        return Ok(SearchOutcome::NothingIndexed);
    }

    let search = Arc::clone(&services.search);
    let cancel = cancel.clone();
    let query = args.query.clone();
    let project = args.project.clone();
    let limit = args.limit;

    let response = tokio::task::spawn_blocking(move || {
        search.search(&cancel, &query, project.as_deref(), limit)
    })
    .await??;

    Ok(SearchOutcome::Results(response))
}

/// Execute the search command
pub async fn execute(
    args: SearchArgs,
    services: &Arc<Services>,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn Error>> {
    let outcome = search(&args, services, cancel).await?;

    let response = match outcome {
        SearchOutcome::NothingIndexed => {
            let target = args
                .project
                .as_deref()
                .map(|p| format!(" for project '{p}'"))
                .unwrap_or_default();
            match format {
                OutputFormat::Human => println!(
                    "Nothing indexed yet{}. Run '{}' first.",
                    target,
                    colors::label("doctree index <path>")
                ),
                OutputFormat::Json => print_json(&serde_json::json!({
                    "query": args.query,
                    "project": args.project,
                    "results": [],
                    "count": 0,
                    "message": format!("nothing indexed yet{target}"),
                }))?,
            }
            return Ok(());
        }
        SearchOutcome::Results(response) => response,
    };

    match format {
        OutputFormat::Human => {
            if response.results.is_empty() {
                println!("No results found for '{}'", colors::label(&args.query));
                return Ok(());
            }

            println!(
                "Found {} of {} match(es) in {}ms:\n",
                colors::number(&response.count.to_string()),
                colors::number(&response.total_matches.to_string()),
                response.duration_ms
            );
            for (i, hit) in response.results.iter().enumerate() {
                println!(
                    "[{}] {} {} {}",
                    colors::rank(&(i + 1).to_string()),
                    colors::symbol(&hit.path),
                    colors::dim(&format!("{}/{}", hit.project, hit.language)),
                    colors::score(&format!("({:.2})", hit.score))
                );
                println!(
                    "    {}  {}",
                    hit.label,
                    colors::file_path(&hit.page_path)
                );
                let summary = summary_line(&hit.detail, 96);
                if !summary.is_empty() {
                    println!("    {}", colors::dim(&summary));
                }
            }
        }
        OutputFormat::Json => print_json(&response)?,
    }

    Ok(())
}
