use std::error::Error;

use serde::Serialize;

use super::CheckCmd;
use crate::commands::Execute;
use crate::config::ConfigFile;
use crate::db::migrations::MigrationDir;
use crate::db::schema::relations::validate_relations;
use crate::db::schema::Snapshot;

/// Result of the check command execution
#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub out: String,
    pub tables: usize,
    pub enums: usize,
    pub relations: usize,
    pub migrations: usize,
    /// False when the declared schema has changes not yet generated
    pub up_to_date: bool,
}

impl Execute for CheckCmd {
    type Output = CheckResult;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>> {
        let declared = Snapshot::declared()?;
        let relations = validate_relations()?;

        let dir = MigrationDir::open(&config.out)?;
        let migrations = dir.check()?;
        let up_to_date = dir.latest_snapshot()?.same_structure(&declared);

        Ok(CheckResult {
            out: config.out.display().to_string(),
            tables: declared.tables.len(),
            enums: declared.enums.len(),
            relations: relations.len(),
            migrations,
            up_to_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::generated_dir;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    fn test_check_empty_dir_is_behind() {
        let out = TempDir::new().unwrap();
        let config = ConfigFile {
            out: out.path().to_path_buf(),
            ..Default::default()
        };

        let result = CheckCmd {}.execute(&config).unwrap();

        assert_eq!(result.tables, 7);
        assert_eq!(result.enums, 1);
        assert_eq!(result.relations, 10);
        assert_eq!(result.migrations, 0);
        assert!(!result.up_to_date);
    }

    #[rstest]
    fn test_check_after_generate() {
        let (_out, config) = generated_dir();
        let result = CheckCmd {}.execute(&config).unwrap();
        assert_eq!(result.migrations, 1);
        assert!(result.up_to_date);
    }

    #[rstest]
    fn test_check_fails_on_missing_sql() {
        let (out, config) = generated_dir();
        std::fs::remove_file(out.path().join("0000_init.sql")).unwrap();

        let err = CheckCmd {}.execute(&config).unwrap_err();
        assert!(err.to_string().contains("0000_init"));
    }
}
