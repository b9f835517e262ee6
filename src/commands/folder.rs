//! Folder inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use algohub_core::error::AppError;
use algohub_core::types::FolderId;
use algohub_database::store::FolderStore;

use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// Show the chain from a folder up to its root
    Ancestry {
        /// Folder ID
        #[arg(short, long)]
        id: FolderId,
    },
}

/// Ancestry display row
#[derive(Debug, Serialize, Tabled)]
struct AncestorRow {
    /// Levels above the requested folder
    level: usize,
    /// Folder ID
    id: String,
    /// Name
    name: String,
    /// Updated at
    updated_at: String,
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;
    let repos = db.repositories();
    let resolver = super::build_resolver(&config, &repos);

    match &args.command {
        FolderCommand::Ancestry { id } => {
            let chain = resolver.folder_ancestry(*id).await?;
            let folders = repos.folders.find_many(&chain).await?;
            if folders.is_empty() {
                return Err(AppError::not_found(format!("Folder {id} not found")));
            }

            let rows: Vec<AncestorRow> = chain
                .iter()
                .enumerate()
                .filter_map(|(level, folder_id)| {
                    folders.iter().find(|f| f.id == *folder_id).map(|f| AncestorRow {
                        level,
                        id: f.id.to_string(),
                        name: f.name.clone(),
                        updated_at: f.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                    })
                })
                .collect();

            output::print_list(&rows, format);
        }
    }

    db.close().await;
    Ok(())
}
