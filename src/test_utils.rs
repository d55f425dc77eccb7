//! Shared test utilities for migrator and command tests.

use tempfile::TempDir;

use crate::config::ConfigFile;
use crate::db::migrations::{AppliedMigration, MigrationDir, MigrationScript};
use crate::db::schema::Snapshot;
use crate::db::{DatabaseBackend, DbError};

/// Snapshot of the declared schema.
pub fn declared() -> Snapshot {
    Snapshot::declared().expect("declared schema should be valid")
}

/// A temp directory holding the initial migration, and a config pointing at it.
///
/// Keep the `TempDir` alive for as long as the config is used.
pub fn generated_dir() -> (TempDir, ConfigFile) {
    let out = TempDir::new().expect("Failed to create temp dir");
    MigrationDir::open(out.path())
        .and_then(|mut dir| dir.generate_for(None, &declared(), 1_700_000_000_000))
        .expect("Generate should succeed");
    let config = ConfigFile {
        out: out.path().to_path_buf(),
        ..Default::default()
    };
    (out, config)
}

/// In-memory backend recording what the migrator asks of it.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// What `introspect` returns
    pub live: Snapshot,
    pub ensured: bool,
    pub ledger: Vec<AppliedMigration>,
    pub applied_tags: Vec<String>,
    /// Statements run through `execute_statements` or `apply_migration`
    pub executed: Vec<String>,
    /// Tag whose application fails
    pub fail_on: Option<String>,
}

impl RecordingBackend {
    pub fn with_live(live: Snapshot) -> Self {
        Self {
            live,
            ..Default::default()
        }
    }

    /// Add a ledger row as if a migration with `created_at` had been applied.
    pub fn record(&mut self, hash: &str, created_at: i64) {
        self.ledger.push(AppliedMigration {
            id: self.ledger.len() as i32 + 1,
            hash: hash.to_string(),
            created_at,
        });
    }
}

impl DatabaseBackend for RecordingBackend {
    fn backend_name(&self) -> &'static str {
        "recording"
    }

    fn ensure_migrations_table(&mut self) -> Result<(), DbError> {
        self.ensured = true;
        Ok(())
    }

    fn applied_migrations(&mut self) -> Result<Vec<AppliedMigration>, DbError> {
        Ok(self.ledger.clone())
    }

    fn apply_migration(&mut self, migration: &MigrationScript) -> Result<(), DbError> {
        if self.fail_on.as_deref() == Some(migration.tag.as_str()) {
            return Err(DbError::MigrationFailed {
                tag: migration.tag.clone(),
                message: "simulated failure".to_string(),
            });
        }
        self.executed.extend(migration.statements.iter().cloned());
        self.applied_tags.push(migration.tag.clone());
        self.record(&migration.hash, migration.when);
        Ok(())
    }

    fn execute_statements(&mut self, statements: &[String]) -> Result<(), DbError> {
        self.executed.extend(statements.iter().cloned());
        Ok(())
    }

    fn introspect(&mut self) -> Result<Snapshot, DbError> {
        Ok(self.live.clone())
    }
}
