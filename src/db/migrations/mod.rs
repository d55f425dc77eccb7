//! Migration artifacts and the migrator.
//!
//! A migration is a numbered SQL file plus the snapshot of the schema after it
//! and an entry in `meta/_journal.json`. The layout, journal and snapshot
//! format follow drizzle-kit's postgres output (snapshot version 7).
//!
//! ```text
//! migrations/
//!   0000_init.sql
//!   meta/
//!     _journal.json
//!     0000_snapshot.json
//! ```

mod artifacts;
mod journal;
mod runner;

pub use artifacts::{
    hash_sql, join_statements, split_statements, GeneratedMigration, MigrationDir,
    STATEMENT_BREAKPOINT,
};
pub use journal::{Journal, JournalEntry};
pub use runner::{MigrationReport, MigrationStatus, Migrator, PushOutcome, StatusEntry};

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use super::schema::SchemaError;
use super::DbError;

/// A row of the applied-migration ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigration {
    pub id: i32,
    pub hash: String,
    /// Journal `when` of the migration, epoch milliseconds
    pub created_at: i64,
}

/// A migration read from disk, ready to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationScript {
    pub idx: u32,
    pub tag: String,
    pub when: i64,
    /// SHA-256 of the SQL file, lowercase hex
    pub hash: String,
    pub statements: Vec<String>,
}

/// Errors reading, writing or applying migration artifacts.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Journal entry '{tag}' has no SQL file")]
    MissingSql { tag: String },

    #[error("Journal entry '{tag}' has no snapshot")]
    MissingSnapshot { tag: String },

    #[error("Snapshot chain broken at '{tag}': prevId {found} does not match {expected}")]
    BrokenChain {
        tag: String,
        expected: String,
        found: String,
    },

    #[error("Journal index {found} out of sequence, expected {expected}")]
    OutOfSequence { expected: u32, found: u32 },

    #[error("Unsupported dialect '{found}' in journal")]
    Dialect { found: String },

    #[error("Aborted: destructive changes were not confirmed")]
    NotConfirmed,

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Db(#[from] DbError),
}
