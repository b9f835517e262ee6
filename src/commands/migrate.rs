//! Database migration command.

use algohub_core::error::AppError;

use crate::output;

/// Apply every pending migration
pub async fn execute(config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;

    println!("Running database migrations...");
    algohub_database::migration::run_migrations(db.pool()).await?;
    output::print_success("All migrations applied successfully.");

    db.close().await;
    Ok(())
}
