//! Languages command - list registered extractors

use crate::cli::output::{colors, print_json};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;

/// Arguments for the languages command
#[derive(Args, Debug)]
pub struct LanguagesArgs {}

#[derive(Debug, Serialize)]
pub struct LanguageInfo {
    pub language: String,
    pub extensions: Vec<String>,
}

/// Registered extractors, ordered by language tag
pub fn languages(services: &Arc<Services>) -> Vec<LanguageInfo> {
    services
        .registry
        .languages()
        .into_iter()
        .map(|language| LanguageInfo {
            extensions: services.registry.extensions_for(&language),
            language: language.to_string(),
        })
        .collect()
}

/// Execute the languages command
pub async fn execute(
    _args: LanguagesArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    let infos = languages(services);

    match format {
        OutputFormat::Human => {
            println!("{}:", colors::label("Languages"));
            for info in &infos {
                let exts: Vec<String> = info.extensions.iter().map(|e| format!(".{e}")).collect();
                println!(
                    "  {:<10} {}",
                    colors::language(&info.language),
                    colors::dim(&exts.join(" "))
                );
            }
        }
        OutputFormat::Json => print_json(&infos)?,
    }

    Ok(())
}
