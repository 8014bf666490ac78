//! CLI adapter for doctree
//!
//! Thin `clap` frontend over `core/`. Every command runs under the
//! configured request timeout; when it expires the shared
//! cancellation token fires and the command reports a timeout.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::error::DoctreeError;

/// doctree - index source trees and search their symbols
///
/// Extracts documentation trees from Python and Markdown sources,
/// stores one index per project and language, and answers ranked
/// symbol queries such as `pkg.module.func`.
#[derive(Parser, Debug)]
#[command(name = "doctree")]
#[command(version)]
#[command(about = "Multi-language source indexer and symbol search", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index a directory under a project name
    Index(commands::IndexArgs),

    /// Search indexed symbols
    Search(commands::SearchArgs),

    /// List stored indexes
    List(commands::ListArgs),

    /// Delete a project's indexes
    Delete(commands::DeleteArgs),

    /// List registered language extractors
    Languages(commands::LanguagesArgs),

    /// Show effective configuration
    Config(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  doctree completions bash > ~/.local/share/bash-completion/completions/doctree
    ///   zsh:   doctree completions zsh > ~/.zfunc/_doctree
    ///   fish:  doctree completions fish > ~/.config/fish/completions/doctree.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use crate::core::xdg::XdgDirs;

    // Handle completions command early (doesn't need services)
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    let xdg = XdgDirs::new();
    xdg.log_paths();
    if let Err(e) = xdg.ensure_dirs_exist() {
        output::print_warning(&format!("Cannot create data directories: {e}"));
    }

    let config = Config::load_with_xdg(&xdg)?;
    config.log_config();

    let timeout = Duration::from_secs(config.limits.request_timeout_sec);
    let services = Arc::new(Services::new(config)?);

    let cancel = CancellationToken::new();
    let timer = spawn_timeout(cancel.clone(), timeout);

    let format = cli.format;
    let result = match cli.command {
        Commands::Index(args) => commands::index::execute(args, &services, format, &cancel).await,
        Commands::Search(args) => commands::search::execute(args, &services, format, &cancel).await,
        Commands::List(args) => commands::list::execute(args, &services, format, &cancel).await,
        Commands::Delete(args) => commands::delete::execute(args, &services, format).await,
        Commands::Languages(args) => commands::languages::execute(args, &services, format).await,
        Commands::Config(args) => commands::config::execute(args, &services, format).await,
        Commands::Completions(_) => unreachable!(), // Handled above
    };

    let timed_out = timer.is_finished();
    timer.abort();

    result.map_err(|e| explain_error(e, timed_out, timeout))
}

/// Fire `cancel` once `timeout` has elapsed
fn spawn_timeout(cancel: CancellationToken, timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        tracing::warn!("Request timed out after {:?}, cancelling", timeout);
        cancel.cancel();
    })
}

/// Rewrite core errors into messages that tell the user what to do next
pub fn explain_error(err: Box<dyn Error>, timed_out: bool, timeout: Duration) -> Box<dyn Error> {
    let Some(core) = err.downcast_ref::<DoctreeError>() else {
        return err;
    };

    match core {
        DoctreeError::Cancelled if timed_out => {
            format!("Operation timed out after {}s", timeout.as_secs()).into()
        }
        DoctreeError::IndexNotFound { project, .. } => format!(
            "Nothing indexed yet for project '{project}'. Run 'doctree index <path> --project {project}' first."
        )
        .into(),
        DoctreeError::IncompatibleSchema {
            project,
            language,
            found,
            supported,
        } => format!(
            "The {language} index of project '{project}' uses schema version {found} \
             but this doctree reads version {supported}. \
             Re-index it with 'doctree index <path> --project {project}'."
        )
        .into(),
        _ => err,
    }
}
