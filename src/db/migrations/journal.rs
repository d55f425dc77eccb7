//! `meta/_journal.json`, the ordered list of migrations.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::MigrationError;
use crate::db::schema::snapshot::{DIALECT, SNAPSHOT_VERSION};

/// Journal format version.
pub const JOURNAL_VERSION: &str = "7";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub idx: u32,
    pub version: String,
    /// Creation time, epoch milliseconds
    pub when: i64,
    pub tag: String,
    pub breakpoints: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub version: String,
    pub dialect: String,
    pub entries: Vec<JournalEntry>,
}

impl Default for Journal {
    fn default() -> Self {
        Self {
            version: JOURNAL_VERSION.to_string(),
            dialect: DIALECT.to_string(),
            entries: Vec::new(),
        }
    }
}

impl Journal {
    /// Read a journal; a missing file is an empty journal.
    pub fn load(path: &Path) -> Result<Self, MigrationError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| MigrationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let journal: Journal =
            serde_json::from_str(&content).map_err(|source| MigrationError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if journal.dialect != DIALECT {
            return Err(MigrationError::Dialect {
                found: journal.dialect,
            });
        }
        Ok(journal)
    }

    pub fn save(&self, path: &Path) -> Result<(), MigrationError> {
        let write_err = |source| MigrationError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| MigrationError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(write_err)
    }

    /// Index the next entry will get.
    pub fn next_idx(&self) -> u32 {
        self.entries.last().map(|e| e.idx + 1).unwrap_or(0)
    }

    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.last()
    }

    /// Append an entry for `name` created at `when`; returns it.
    pub fn push(&mut self, name: &str, when: i64) -> &JournalEntry {
        let idx = self.next_idx();
        self.entries.push(JournalEntry {
            idx,
            version: SNAPSHOT_VERSION.to_string(),
            when,
            tag: format!("{:04}_{}", idx, name),
            breakpoints: true,
        });
        &self.entries[self.entries.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    fn test_missing_journal_is_empty() {
        let dir = TempDir::new().unwrap();
        let journal = Journal::load(&dir.path().join("meta/_journal.json")).unwrap();
        assert!(journal.entries.is_empty());
        assert_eq!(journal.dialect, "postgresql");
        assert_eq!(journal.next_idx(), 0);
    }

    #[rstest]
    fn test_push_numbers_tags() {
        let mut journal = Journal::default();
        assert_eq!(journal.push("init", 1).tag, "0000_init");
        assert_eq!(journal.push("add_isbn", 2).tag, "0001_add_isbn");
        assert_eq!(journal.next_idx(), 2);
    }

    #[rstest]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meta/_journal.json");
        let mut journal = Journal::default();
        journal.push("init", 1_700_000_000_000);
        journal.save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"breakpoints\": true"));
        assert_eq!(Journal::load(&path).unwrap(), journal);
    }

    #[rstest]
    fn test_load_rejects_other_dialect() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_journal.json");
        fs::write(&path, r#"{"version":"7","dialect":"sqlite","entries":[]}"#).unwrap();
        let err = Journal::load(&path).unwrap_err();
        assert!(matches!(err, MigrationError::Dialect { .. }));
    }

    #[rstest]
    fn test_load_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_journal.json");
        fs::write(&path, "{").unwrap();
        assert!(matches!(
            Journal::load(&path).unwrap_err(),
            MigrationError::Parse { .. }
        ));
    }
}
