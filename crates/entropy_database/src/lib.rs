//! Database layer for the Entropy Gaming bot.
//!
//! Provides the diesel schema, the PostgreSQL connection pool and the
//! `bot_constants` lookup that resolves platform ids (categories, roles,
//! channels) and cron specs with separate prod/test values.

#![warn(missing_docs)]

mod connection;
mod constants;
pub mod schema;

pub use connection::{create_pool, establish_connection, run_migrations, DbPool};
pub use constants::{select_value, BotConstantRow, ConstantStore};

/// Result type for database operations.
pub type DatabaseResult<T> = std::result::Result<T, entropy_error::DatabaseError>;
