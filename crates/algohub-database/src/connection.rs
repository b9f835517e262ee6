//! PostgreSQL connection pool management.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use algohub_core::config::DatabaseConfig;
use algohub_core::error::{AppError, ErrorKind};

use crate::repositories::{
    AlgorithmRepository, FolderRepository, RightsRepository, TreeRepository, UserRepository,
};

/// Wrapper around the sqlx PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

/// Every PostgreSQL repository, sharing one pool.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub users: Arc<UserRepository>,
    pub folders: Arc<FolderRepository>,
    pub algorithms: Arc<AlgorithmRepository>,
    pub rights: Arc<RightsRepository>,
    pub tree: Arc<TreeRepository>,
}

impl DatabasePool {
    /// Create a new database pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            url = %mask_password(&config.url),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Build every repository over this pool.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(UserRepository::new(self.pool.clone())),
            folders: Arc::new(FolderRepository::new(self.pool.clone())),
            algorithms: Arc::new(AlgorithmRepository::new(self.pool.clone())),
            rights: Arc::new(RightsRepository::new(self.pool.clone())),
            tree: Arc::new(TreeRepository::new(self.pool.clone())),
        }
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Mask the password portion of a database URL for safe logging.
fn mask_password(url: &str) -> String {
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    let Some(at_pos) = url.rfind('@') else {
        return url.to_string();
    };
    match url[scheme_end..at_pos].find(':') {
        Some(offset) => format!(
            "{}:****@{}",
            &url[..scheme_end + offset],
            &url[at_pos + 1..]
        ),
        None => url.to_string(),
    }
}
