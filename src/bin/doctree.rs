//! doctree CLI - index source trees and search their symbols
//!
//! # Examples
//!
//! ```bash
//! # Index a repository (project name defaults to the directory name)
//! doctree index /path/to/acme
//!
//! # Search across all projects, or within one
//! doctree search "pkg.run"
//! doctree search "install" --project acme -k 5
//!
//! # Inspect what is stored
//! doctree list --format json
//! ```
//!
//! Logs go to stderr. Set `RUST_LOG` to change the level and
//! `DOCTREE_LOG_FORMAT=json` for structured output.

use clap::Parser;
use doctree::cli::{run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = std::env::var("DOCTREE_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr) // stdout carries command output
                    .with_ansi(false)
                    .compact(),
            )
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
