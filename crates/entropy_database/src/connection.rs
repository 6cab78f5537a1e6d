//! Database connection utilities.

use crate::DatabaseResult;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use entropy_error::{DatabaseError, DatabaseErrorKind};
use tracing::instrument;

/// Shared PostgreSQL connection pool.
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Establish a connection to the PostgreSQL database.
///
/// Reads the `DATABASE_URL` environment variable to determine the connection string.
///
/// # Errors
///
/// Returns an error if:
/// - `DATABASE_URL` environment variable is not set
/// - Connection to the database fails
#[instrument(name = "database.establish_connection")]
pub fn establish_connection() -> DatabaseResult<PgConnection> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        tracing::error!("DATABASE_URL environment variable not set");
        DatabaseError::new(DatabaseErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })?;

    tracing::debug!("Connecting to PostgreSQL database");
    PgConnection::establish(&database_url).map_err(|e| {
        tracing::error!(error = %e, "Failed to establish database connection");
        DatabaseError::new(DatabaseErrorKind::Connection(e.to_string()))
    })
}

/// Create a connection pool for PostgreSQL database.
///
/// Reads the `DATABASE_URL` environment variable to determine the connection string.
///
/// # Errors
///
/// Returns an error if:
/// - `DATABASE_URL` environment variable is not set
/// - Pool creation fails
#[instrument(name = "database.create_pool")]
pub fn create_pool() -> DatabaseResult<DbPool> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        tracing::error!("DATABASE_URL environment variable not set");
        DatabaseError::new(DatabaseErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })?;

    tracing::debug!("Creating PostgreSQL connection pool");
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    Pool::builder().max_size(10).build(manager).map_err(|e| {
        tracing::error!(error = %e, "Failed to create connection pool");
        DatabaseError::new(DatabaseErrorKind::Connection(e.to_string()))
    })
}

/// Run all pending migrations against the given connection.
#[instrument(name = "database.run_migrations", skip(conn))]
pub fn run_migrations(conn: &mut PgConnection) -> DatabaseResult<()> {
    let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
        tracing::error!(error = %e, "Failed to run migrations");
        DatabaseError::new(DatabaseErrorKind::Migration(e.to_string()))
    })?;

    tracing::info!(count = applied.len(), "Migrations applied");
    Ok(())
}
