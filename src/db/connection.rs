//! Database connection management.

use tracing::info;

use super::postgres::PostgresBackend;
use super::{DatabaseConfig, DbError};

/// Open a PostgreSQL connection described by `config`.
pub fn open_db(config: &DatabaseConfig) -> Result<PostgresBackend, DbError> {
    info!(target = %config.redacted(), "connecting to database");
    config.connect()
}
