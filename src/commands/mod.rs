//! CLI command definitions and dispatch.

pub mod algorithm;
pub mod folder;
pub mod migrate;
pub mod rights;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use algohub_auth::RightsResolver;
use algohub_core::config::AppConfig;
use algohub_core::error::AppError;
use algohub_database::DatabasePool;
use algohub_database::connection::Repositories;

use crate::output::OutputFormat;

/// AlgoHub: algorithm documents and folders with inherited access rights
#[derive(Debug, Parser)]
#[command(name = "algohub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Inspect and administer rights entries
    Rights(rights::RightsArgs),
    /// Folder inspection
    Folder(folder::FolderArgs),
    /// Algorithm document tooling
    Algorithm(algorithm::AlgorithmArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(&self.config).await,
            Commands::Rights(args) => rights::execute(args, &self.config, self.format).await,
            Commands::Folder(args) => folder::execute(args, &self.config, self.format).await,
            Commands::Algorithm(args) => algorithm::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration, using `ALGOHUB_ENV` for the overlay
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    let env = std::env::var("ALGOHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(config_path, &env)
}

/// Helper: connect to the database named in the configuration
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: build a resolver over the PostgreSQL repositories
pub fn build_resolver(config: &AppConfig, repos: &Repositories) -> Arc<RightsResolver> {
    Arc::new(RightsResolver::new(
        repos.rights.clone(),
        repos.tree.clone(),
        config.rights.max_folder_depth,
    ))
}
