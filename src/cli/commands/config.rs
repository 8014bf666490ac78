//! Config command - show effective configuration

use crate::cli::output::print_json;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::services::Services;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub config_file: String,
    pub config_file_exists: bool,
    #[serde(flatten)]
    pub config: Config,
}

/// Execute the config command
pub async fn execute(
    _args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    let config_file = XdgDirs::new().config_file();

    let response = ConfigResponse {
        config_file_exists: config_file.exists(),
        config_file: config_file.to_string_lossy().into_owned(),
        config: services.config.as_ref().clone(),
    };

    match format {
        OutputFormat::Human => {
            let status = if response.config_file_exists {
                ""
            } else {
                " (not found, using defaults)"
            };
            println!("# config file: {}{}", response.config_file, status);
            print!("{}", toml::to_string_pretty(&response.config)?);
        }
        OutputFormat::Json => print_json(&response)?,
    }

    Ok(())
}
