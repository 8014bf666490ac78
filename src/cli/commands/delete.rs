//! Delete command - remove a project's indexes

use crate::cli::output::{colors, print_json};
use crate::cli::OutputFormat;
use crate::core::error::DoctreeError;
use crate::core::schema::Language;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Project to delete
    pub project: String,

    /// Delete only this language's index
    #[arg(long, short = 'l')]
    pub language: Option<String>,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub project: String,
    pub language: Option<String>,
    pub deleted: usize,
}

/// Delete without printing
///
/// Fails with [`DoctreeError::IndexNotFound`] when nothing matched.
pub fn delete(args: &DeleteArgs, services: &Arc<Services>) -> Result<DeleteResponse, Box<dyn Error>> {
    let deleted = match &args.language {
        Some(tag) => {
            let language = Language::new(tag.as_str())?;
            usize::from(services.store.delete(&args.project, &language)?)
        }
        None => services.store.delete_project(&args.project)?,
    };

    if deleted == 0 {
        return Err(DoctreeError::IndexNotFound {
            project: args.project.clone(),
            language: args.language.clone().unwrap_or_else(|| "*".to_string()),
        }
        .into());
    }

    Ok(DeleteResponse {
        project: args.project.clone(),
        language: args.language.clone(),
        deleted,
    })
}

/// Execute the delete command
pub async fn execute(
    args: DeleteArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    let response = delete(&args, services)?;

    match format {
        OutputFormat::Human => {
            let scope = response
                .language
                .as_deref()
                .map(|l| format!(" ({l})"))
                .unwrap_or_default();
            println!(
                "{} '{}'{}: {} index(es) removed",
                colors::success("Deleted"),
                colors::project(&response.project),
                scope,
                colors::number(&response.deleted.to_string())
            );
        }
        OutputFormat::Json => print_json(&response)?,
    }

    Ok(())
}
