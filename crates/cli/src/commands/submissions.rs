//! Stored submission commands.
//!
//! # Usage
//!
//! ```bash
//! # Print a stored submission
//! advisor-cli show contact_2026-10-19T08:30:00.000Z_6f1c...
//! ```
//!
//! # Environment Variables
//!
//! - `CONTACT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use advisor_site_server::config::ServerConfig;
use advisor_site_server::db::{self, KeyValueStore, PgKeyValueStore, StoreError};
use thiserror::Error;

/// Errors that can occur while reading submissions.
#[derive(Debug, Error)]
pub enum SubmissionsError {
    #[error("Missing environment variable: CONTACT_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// No submission is stored under the key.
    #[error("No submission stored under {0}")]
    NotFound(String),
}

/// Print the stored record for a submission ID as pretty JSON.
///
/// # Errors
///
/// Returns error if the database is unreachable or the key is absent.
pub async fn show(id: &str) -> Result<(), SubmissionsError> {
    let url =
        ServerConfig::database_url_from_env().ok_or(SubmissionsError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to key-value store database...");
    let store = PgKeyValueStore::new(db::create_pool(&url).await?);

    let pretty = render(&store, id).await?;
    #[allow(clippy::print_stdout)]
    {
        println!("{pretty}");
    }
    Ok(())
}

async fn render(store: &dyn KeyValueStore, id: &str) -> Result<String, SubmissionsError> {
    let record = store
        .get(id)
        .await?
        .ok_or_else(|| SubmissionsError::NotFound(id.to_owned()))?;

    Ok(serde_json::to_string_pretty(&record).unwrap_or_else(|_| record.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use advisor_site_server::db::MemoryStore;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_render_stored_record() {
        let store = MemoryStore::new();
        store
            .set("contact_1", json!({"name": "Jane Tan", "location": "Singapore"}))
            .await
            .unwrap();

        let pretty = render(&store, "contact_1").await.unwrap();

        assert!(pretty.contains("\"name\": \"Jane Tan\""));
        assert!(pretty.contains('\n'));
    }

    #[tokio::test]
    async fn test_render_unknown_id() {
        let err = render(&MemoryStore::new(), "contact_missing").await.unwrap_err();
        assert!(matches!(err, SubmissionsError::NotFound(id) if id == "contact_missing"));
    }
}
