//! Applying migrations to a database.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::artifacts::MigrationDir;
use super::{AppliedMigration, MigrationError, MigrationScript};
use crate::db::backend::DatabaseBackend;
use crate::db::schema::{diff, SchemaChange, Snapshot};

/// One journal entry and whether the database has it.
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub tag: String,
    pub when: i64,
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub entries: Vec<StatusEntry>,
    pub applied: usize,
    pub pending: usize,
}

/// Result of `Migrator::run`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    /// Tags applied by this run, in order
    pub applied: Vec<String>,
    /// Entries that were already applied
    pub skipped: usize,
}

/// Result of `Migrator::push`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PushOutcome {
    pub changes: Vec<String>,
    pub statements: Vec<String>,
    pub destructive: bool,
    /// False for dry runs and when there was nothing to change
    pub executed: bool,
}

/// Applies migration artifacts and declared schemas to a backend.
pub struct Migrator<'a> {
    backend: &'a mut dyn DatabaseBackend,
    strict: bool,
}

/// Latest `created_at` in the ledger; migrations newer than this are pending.
fn high_water_mark(applied: &[AppliedMigration]) -> Option<i64> {
    applied.iter().map(|m| m.created_at).max()
}

fn is_pending(script: &MigrationScript, mark: Option<i64>) -> bool {
    mark.is_none_or(|mark| script.when > mark)
}

impl<'a> Migrator<'a> {
    pub fn new(backend: &'a mut dyn DatabaseBackend) -> Self {
        Self {
            backend,
            strict: false,
        }
    }

    /// Require confirmation before `push` runs destructive changes.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Applied and pending entries of `dir`.
    pub fn status(&mut self, dir: &MigrationDir) -> Result<MigrationStatus, MigrationError> {
        self.backend.ensure_migrations_table()?;
        let mark = high_water_mark(&self.backend.applied_migrations()?);

        let entries: Vec<StatusEntry> = dir
            .journal()
            .entries
            .iter()
            .map(|entry| StatusEntry {
                tag: entry.tag.clone(),
                when: entry.when,
                applied: mark.is_some_and(|mark| entry.when <= mark),
            })
            .collect();
        let applied = entries.iter().filter(|e| e.applied).count();

        Ok(MigrationStatus {
            pending: entries.len() - applied,
            applied,
            entries,
        })
    }

    /// Apply every pending migration of `dir` in journal order.
    ///
    /// Each migration runs in its own transaction. The first failure stops the
    /// run; migrations applied before it stay applied.
    pub fn run(&mut self, dir: &MigrationDir) -> Result<MigrationReport, MigrationError> {
        let scripts = dir.scripts()?;
        self.backend.ensure_migrations_table()?;
        let mark = high_water_mark(&self.backend.applied_migrations()?);
        debug!(backend = self.backend.backend_name(), ?mark, "checking pending migrations");

        let mut report = MigrationReport::default();
        for script in &scripts {
            if !is_pending(script, mark) {
                report.skipped += 1;
                continue;
            }
            info!(tag = %script.tag, "applying migration");
            self.backend.apply_migration(script)?;
            report.applied.push(script.tag.clone());
        }

        if report.applied.is_empty() {
            info!("database is up to date");
        }
        Ok(report)
    }

    /// Bring the live schema to `target` without writing artifacts.
    ///
    /// In strict mode destructive changes need `force` or a `confirm` callback
    /// returning true; otherwise nothing is executed.
    pub fn push(
        &mut self,
        target: &Snapshot,
        dry_run: bool,
        force: bool,
        confirm: &mut dyn FnMut(&[SchemaChange]) -> bool,
    ) -> Result<PushOutcome, MigrationError> {
        let live = self.backend.introspect()?;
        let changes = diff(&live, target)?;

        let mut outcome = PushOutcome {
            changes: changes.iter().map(|c| c.describe()).collect(),
            statements: changes.iter().map(|c| c.to_sql()).collect(),
            destructive: changes.iter().any(|c| c.is_destructive()),
            executed: false,
        };

        if changes.is_empty() {
            info!("no changes detected");
            return Ok(outcome);
        }
        if dry_run {
            return Ok(outcome);
        }

        if outcome.destructive {
            let destructive: Vec<SchemaChange> =
                changes.iter().filter(|c| c.is_destructive()).cloned().collect();
            for change in &destructive {
                warn!(change = %change.describe(), "data loss possible");
            }
            if self.strict && !force && !confirm(&destructive) {
                return Err(MigrationError::NotConfirmed);
            }
        }

        self.backend.execute_statements(&outcome.statements)?;
        outcome.executed = true;
        info!(statements = outcome.statements.len(), "pushed schema");
        Ok(outcome)
    }
}
