//! Reading and writing the migration output directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::journal::{Journal, JournalEntry};
use super::{MigrationError, MigrationScript};
use crate::db::schema::{diff, Snapshot};

/// Separator between statements in a migration SQL file.
pub const STATEMENT_BREAKPOINT: &str = "--> statement-breakpoint";

/// Lowercase hex SHA-256 of a migration file.
pub fn hash_sql(sql: &str) -> String {
    hex::encode(Sha256::digest(sql.as_bytes()))
}

/// Render statements as the contents of a SQL file.
pub fn join_statements(statements: &[String]) -> String {
    let mut sql = statements.join(&format!("\n{}\n", STATEMENT_BREAKPOINT));
    sql.push('\n');
    sql
}

/// Split a SQL file back into statements.
pub fn split_statements(sql: &str) -> Vec<String> {
    sql.split(STATEMENT_BREAKPOINT)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn write_err(path: &Path) -> impl FnOnce(std::io::Error) -> MigrationError + use<> {
    let path = path.to_path_buf();
    move |source| MigrationError::Write { path, source }
}

/// Turn a free-form migration name into a tag suffix.
fn slug(name: &str) -> String {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let slug = slug.trim_matches('_').to_string();
    if slug.is_empty() {
        "migration".to_string()
    } else {
        slug
    }
}

/// What `generate` wrote.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedMigration {
    pub idx: u32,
    pub tag: String,
    pub path: PathBuf,
    pub statements: Vec<String>,
    /// Human-readable description of each change
    pub changes: Vec<String>,
    pub destructive: bool,
}

/// A migration output directory (`out` in the configuration).
#[derive(Debug)]
pub struct MigrationDir {
    root: PathBuf,
    journal: Journal,
}

impl MigrationDir {
    /// Open a directory, reading its journal. A directory without a journal,
    /// or one that does not exist yet, has no migrations.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, MigrationError> {
        let root = root.into();
        let journal = Journal::load(&root.join("meta").join("_journal.json"))?;
        debug!(dir = %root.display(), entries = journal.entries.len(), "opened migration dir");
        Ok(Self { root, journal })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    fn journal_path(&self) -> PathBuf {
        self.root.join("meta").join("_journal.json")
    }

    fn sql_path(&self, entry: &JournalEntry) -> PathBuf {
        self.root.join(format!("{}.sql", entry.tag))
    }

    fn snapshot_path(&self, idx: u32) -> PathBuf {
        self.root.join("meta").join(format!("{:04}_snapshot.json", idx))
    }

    pub fn read_sql(&self, entry: &JournalEntry) -> Result<String, MigrationError> {
        let path = self.sql_path(entry);
        if !path.exists() {
            return Err(MigrationError::MissingSql {
                tag: entry.tag.clone(),
            });
        }
        fs::read_to_string(&path).map_err(|source| MigrationError::Read { path, source })
    }

    pub fn read_snapshot(&self, entry: &JournalEntry) -> Result<Snapshot, MigrationError> {
        let path = self.snapshot_path(entry.idx);
        if !path.exists() {
            return Err(MigrationError::MissingSnapshot {
                tag: entry.tag.clone(),
            });
        }
        let content = fs::read_to_string(&path).map_err(|source| MigrationError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| MigrationError::Parse { path, source })
    }

    /// Snapshot after the last migration, or the empty snapshot.
    pub fn latest_snapshot(&self) -> Result<Snapshot, MigrationError> {
        match self.journal.last() {
            Some(entry) => self.read_snapshot(entry),
            None => Ok(Snapshot::empty()),
        }
    }

    /// Every migration in journal order, with its statements and hash.
    pub fn scripts(&self) -> Result<Vec<MigrationScript>, MigrationError> {
        self.journal
            .entries
            .iter()
            .map(|entry| {
                let sql = self.read_sql(entry)?;
                Ok(MigrationScript {
                    idx: entry.idx,
                    tag: entry.tag.clone(),
                    when: entry.when,
                    hash: hash_sql(&sql),
                    statements: split_statements(&sql),
                })
            })
            .collect()
    }

    /// Write the next migration bringing the directory up to the declared
    /// schema. Returns `None` when there is nothing to do.
    pub fn generate(&mut self, name: Option<&str>) -> Result<Option<GeneratedMigration>, MigrationError> {
        let target = Snapshot::declared()?;
        let now = chrono::Utc::now().timestamp_millis();
        self.generate_for(name, &target, now)
    }

    /// Write the next migration bringing the directory up to `target`.
    pub fn generate_for(
        &mut self,
        name: Option<&str>,
        target: &Snapshot,
        when: i64,
    ) -> Result<Option<GeneratedMigration>, MigrationError> {
        let prev = self.latest_snapshot()?;
        let changes = diff(&prev, target)?;
        if changes.is_empty() {
            info!("no schema changes, nothing to generate");
            return Ok(None);
        }

        let statements: Vec<String> = changes.iter().map(|c| c.to_sql()).collect();
        let name = match name {
            Some(name) => slug(name),
            None if self.journal.entries.is_empty() => "init".to_string(),
            None => "migration".to_string(),
        };

        // `when` must increase strictly: pending detection compares against it
        let when = match self.journal.last() {
            Some(last) if when <= last.when => last.when + 1,
            _ => when,
        };

        let mut journal = self.journal.clone();
        let entry = journal.push(&name, when).clone();

        let sql_path = self.sql_path(&entry);
        let snapshot_path = self.snapshot_path(entry.idx);
        let snapshot = target.clone().chained_after(&prev);

        fs::create_dir_all(self.root.join("meta")).map_err(write_err(&self.root))?;
        fs::write(&sql_path, join_statements(&statements)).map_err(write_err(&sql_path))?;
        let json = serde_json::to_string_pretty(&snapshot).map_err(|source| MigrationError::Parse {
            path: snapshot_path.clone(),
            source,
        })?;
        fs::write(&snapshot_path, json).map_err(write_err(&snapshot_path))?;
        journal.save(&self.journal_path())?;
        self.journal = journal;

        info!(tag = %entry.tag, statements = statements.len(), "generated migration");
        Ok(Some(GeneratedMigration {
            idx: entry.idx,
            tag: entry.tag,
            path: sql_path,
            destructive: changes.iter().any(|c| c.is_destructive()),
            changes: changes.iter().map(|c| c.describe()).collect(),
            statements,
        }))
    }

    /// Validate the directory: contiguous indices, a SQL file and snapshot for
    /// every entry, and snapshots chained through `prevId`.
    ///
    /// Returns the number of entries checked.
    pub fn check(&self) -> Result<usize, MigrationError> {
        let mut prev_id = uuid::Uuid::nil();
        for (expected, entry) in self.journal.entries.iter().enumerate() {
            let expected = expected as u32;
            if entry.idx != expected {
                return Err(MigrationError::OutOfSequence {
                    expected,
                    found: entry.idx,
                });
            }
            self.read_sql(entry)?;
            let snapshot = self.read_snapshot(entry)?;
            if snapshot.prev_id != prev_id {
                return Err(MigrationError::BrokenChain {
                    tag: entry.tag.clone(),
                    expected: prev_id.to_string(),
                    found: snapshot.prev_id.to_string(),
                });
            }
            prev_id = snapshot.id;
        }
        Ok(self.journal.entries.len())
    }
}
