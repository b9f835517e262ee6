//! Rights administration commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use algohub_core::error::AppError;
use algohub_core::types::UserId;
use algohub_entity::rights::{AccessLevel, ResourceKind, ResourceRef, RightsEntry};
use algohub_service::RightsAdminService;

use crate::output::{self, OutputFormat};

/// Arguments for rights commands
#[derive(Debug, Args)]
pub struct RightsArgs {
    /// Rights subcommand
    #[command(subcommand)]
    pub command: RightsCommand,
}

/// Identifies a folder or an algorithm
#[derive(Debug, Clone, Args)]
pub struct ResourceArg {
    /// Resource kind (folder or algorithm)
    #[arg(short, long)]
    pub kind: ResourceKind,
    /// Resource ID
    #[arg(short, long)]
    pub id: Uuid,
}

impl ResourceArg {
    fn resource(&self) -> ResourceRef {
        ResourceRef::from_parts(self.kind, self.id)
    }
}

/// Rights subcommands
#[derive(Debug, Subcommand)]
pub enum RightsCommand {
    /// List direct grants on a resource
    Show {
        #[command(flatten)]
        resource: ResourceArg,
    },
    /// Grant (or replace) a user's level on a resource
    Grant {
        /// User ID
        #[arg(short, long)]
        user: UserId,
        #[command(flatten)]
        resource: ResourceArg,
        /// Access level (owner, read-write, read-only)
        #[arg(short, long)]
        level: AccessLevel,
    },
    /// Remove a user's direct grant on a resource
    Revoke {
        /// User ID
        #[arg(short, long)]
        user: UserId,
        #[command(flatten)]
        resource: ResourceArg,
    },
    /// Show a user's effective level, inheritance included
    Resolve {
        /// User ID
        #[arg(short, long)]
        user: UserId,
        #[command(flatten)]
        resource: ResourceArg,
    },
}

/// Grant display row
#[derive(Debug, Serialize, Tabled)]
struct GrantRow {
    /// User ID
    user_id: String,
    /// Resource
    resource: String,
    /// Level
    level: String,
    /// Granted at
    granted_at: String,
}

impl From<&RightsEntry> for GrantRow {
    fn from(entry: &RightsEntry) -> Self {
        Self {
            user_id: entry.user_id.to_string(),
            resource: entry.resource.to_string(),
            level: entry.level.to_string(),
            granted_at: entry.granted_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Effective rights display row
#[derive(Debug, Serialize, Tabled)]
struct ResolvedRow {
    /// User ID
    user_id: String,
    /// Resource
    resource: String,
    /// Effective level
    level: String,
}

/// Execute rights commands
pub async fn execute(
    args: &RightsArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;
    let repos = db.repositories();
    let service = RightsAdminService::new(
        repos.rights.clone(),
        repos.users.clone(),
        super::build_resolver(&config, &repos),
    );

    match &args.command {
        RightsCommand::Show { resource } => {
            let entries = service.list(resource.resource()).await?;
            let rows: Vec<GrantRow> = entries.iter().map(GrantRow::from).collect();
            output::print_list(&rows, format);
        }
        RightsCommand::Grant {
            user,
            resource,
            level,
        } => {
            let entry = service.grant(*user, resource.resource(), *level).await?;
            output::print_item(&GrantRow::from(&entry), format);
        }
        RightsCommand::Revoke { user, resource } => {
            service.revoke(*user, resource.resource()).await?;
            output::print_success(&format!(
                "Revoked grant of {user} on {}",
                resource.resource()
            ));
        }
        RightsCommand::Resolve { user, resource } => {
            let resolved = service.resolve(*user, resource.resource()).await?;
            let row = ResolvedRow {
                user_id: resolved.user_id.to_string(),
                resource: resolved.resource.to_string(),
                level: resolved
                    .level
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "none".to_string()),
            };
            output::print_item(&row, format);
        }
    }

    db.close().await;
    Ok(())
}
