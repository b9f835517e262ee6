//! Algorithm document tooling.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use bytes::Bytes;

use algohub_core::error::AppError;
use algohub_core::result::AppResult;
use algohub_core::traits::BlobStore;
use algohub_core::types::AlgorithmId;
use algohub_database::store::AlgorithmStore;
use algohub_service::ContentValidator;
use algohub_storage::LocalBlobStore;

use crate::output::{self, OutputFormat};

/// Arguments for algorithm commands
#[derive(Debug, Args)]
pub struct AlgorithmArgs {
    /// Algorithm subcommand
    #[command(subcommand)]
    pub command: AlgorithmCommand,
}

/// Algorithm subcommands
#[derive(Debug, Subcommand)]
pub enum AlgorithmCommand {
    /// Validate a source document stored in a JSON file
    Validate {
        /// Path to the JSON document
        file: PathBuf,
        /// Print the normalized document on success
        #[arg(long)]
        normalized: bool,
    },
    /// Rewrite an algorithm's mirrored document from the database copy
    Resync {
        /// Algorithm ID
        #[arg(short, long)]
        id: AlgorithmId,
    },
}

/// Validation issue display row
#[derive(Debug, Serialize, Tabled)]
struct IssueRow {
    /// JSON path
    path: String,
    /// Constraint code
    code: String,
    /// Message
    message: String,
}

/// Execute algorithm commands
pub async fn execute(
    args: &AlgorithmArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        AlgorithmCommand::Validate { file, normalized } => {
            let max_depth = super::load_config(config_path)
                .map(|c| c.rights.max_content_depth)
                .unwrap_or_else(|_| algohub_core::config::RightsConfig::default().max_content_depth);
            let document = read_document(file).await?;

            match ContentValidator::new(max_depth).validate(&document) {
                Ok(code) => {
                    output::print_success(&format!(
                        "{} is valid ({} nodes)",
                        file.display(),
                        code.node_count()
                    ));
                    if *normalized {
                        println!("{}", serde_json::to_string_pretty(&code.to_value())?);
                    }
                    Ok(())
                }
                Err(issues) => {
                    let rows: Vec<IssueRow> = issues
                        .iter()
                        .map(|i| IssueRow {
                            path: i.path.clone(),
                            code: i.code.clone(),
                            message: i.message.clone(),
                        })
                        .collect();
                    output::print_list(&rows, format);
                    Err(AppError::validation(format!(
                        "{} has {} issue(s)",
                        file.display(),
                        rows.len()
                    )))
                }
            }
        }
        AlgorithmCommand::Resync { id } => resync(*id, config_path).await,
    }
}

async fn resync(id: AlgorithmId, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;
    let repos = db.repositories();
    let blobs = LocalBlobStore::new(&config.storage.blob_root).await?;

    let algorithm = repos
        .algorithms
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Algorithm {id} not found")))?;
    let data = serde_json::to_vec(&algorithm.source_code)?;
    blobs.put(id, Bytes::from(data)).await?;

    output::print_success(&format!(
        "Mirrored algorithm {id} to {}",
        blobs.path_for(id).display()
    ));
    db.close().await;
    Ok(())
}

async fn read_document(file: &Path) -> AppResult<serde_json::Value> {
    let raw = tokio::fs::read(file).await?;
    Ok(serde_json::from_slice(&raw)?)
}
