//! Errors raised while bringing up shared infrastructure
//!
//! Query failures are not represented here: repositories return
//! `sqlx::Error` directly and each service maps it to its own error type.

use sqlx::{Error as SqlxError, migrate::MigrateError};
use thiserror::Error;

/// Failure while configuring, connecting to or migrating PostgreSQL
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The server could not be reached within the acquire timeout
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// `DATABASE_URL` does not parse as a PostgreSQL URL
    #[error("Invalid database URL: {0}")]
    InvalidUrl(#[source] SqlxError),

    /// An embedded migration failed or the applied history diverged
    #[error("Database migration error: {0}")]
    Migration(#[from] MigrateError),

    /// Pool settings that cannot be satisfied together
    #[error("Invalid pool settings: {0}")]
    PoolBounds(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
