//! Database backend trait for the migrator.
//!
//! The migrator only needs a handful of operations from a database: keep a
//! ledger of applied migrations, run statements transactionally, and describe
//! the live schema. `PostgresBackend` implements this against a real server;
//! tests use an in-memory recorder.

use super::migrations::{AppliedMigration, MigrationScript};
use super::schema::Snapshot;
use super::DbError;

/// Operations the migration tooling needs from a database.
pub trait DatabaseBackend {
    /// Get the backend name for logging/debugging.
    fn backend_name(&self) -> &'static str;

    /// Create the applied-migrations ledger if it does not exist.
    fn ensure_migrations_table(&mut self) -> Result<(), DbError>;

    /// Applied migrations, oldest first.
    fn applied_migrations(&mut self) -> Result<Vec<AppliedMigration>, DbError>;

    /// Run a migration's statements and record it in the ledger, atomically.
    ///
    /// On error nothing from this migration is left behind.
    fn apply_migration(&mut self, migration: &MigrationScript) -> Result<(), DbError>;

    /// Run statements in a single transaction without touching the ledger.
    fn execute_statements(&mut self, statements: &[String]) -> Result<(), DbError>;

    /// Describe the live schema as a snapshot.
    fn introspect(&mut self) -> Result<Snapshot, DbError>;
}
