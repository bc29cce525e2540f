//! Embedded Diesel migrations, applied at startup.

use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failure applying the embedded schema migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Could not open a connection to run migrations on.
    #[error("migration connection failed: {message}")]
    Connection { message: String },
    /// A migration itself failed.
    #[error("migration failed: {message}")]
    Apply { message: String },
}

/// Run all pending migrations against the given database.
///
/// Uses a short-lived synchronous connection; the async pool is only opened
/// once the schema is known good.
pub fn run_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut conn =
        PgConnection::establish(database_url).map_err(|err| MigrationError::Connection {
            message: err.to_string(),
        })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    if applied.is_empty() {
        info!("database schema already up to date");
    } else {
        info!(count = applied.len(), "applied pending migrations");
    }
    Ok(())
}
