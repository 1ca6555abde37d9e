//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! # Create the kv_store table
//! advisor-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CONTACT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! Migration files live in `crates/server/migrations/`.

use advisor_site_server::config::ServerConfig;
use advisor_site_server::db;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Neither database variable is set.
    #[error("Missing environment variable: CONTACT_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the key-value store migrations.
///
/// # Errors
///
/// Returns error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let url = ServerConfig::database_url_from_env().ok_or(MigrationError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to key-value store database...");
    let pool = db::create_pool(&url).await?;

    tracing::info!("Running key-value store migrations...");
    db::MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
