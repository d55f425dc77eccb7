use std::error::Error;

use serde::Serialize;

use super::StatusCmd;
use crate::commands::Execute;
use crate::config::ConfigFile;
use crate::db::migrations::{MigrationDir, MigrationStatus, Migrator};
use crate::db::{open_db, DatabaseBackend};

/// Result of the status command execution
#[derive(Debug, Serialize)]
pub struct StatusResult {
    pub out: String,
    pub backend: String,
    pub status: MigrationStatus,
}

impl StatusCmd {
    pub fn execute_with(
        self,
        backend: &mut dyn DatabaseBackend,
        config: &ConfigFile,
    ) -> Result<StatusResult, Box<dyn Error>> {
        let dir = MigrationDir::open(&config.out)?;
        let backend_name = backend.backend_name().to_string();
        let status = Migrator::new(backend).status(&dir)?;

        Ok(StatusResult {
            out: config.out.display().to_string(),
            backend: backend_name,
            status,
        })
    }
}

impl Execute for StatusCmd {
    type Output = StatusResult;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>> {
        let database = config.database()?;
        let mut backend = open_db(&database)?;
        self.execute_with(&mut backend, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{generated_dir, RecordingBackend};
    use rstest::rstest;

    #[rstest]
    fn test_status_pending_before_migrate() {
        let (_out, config) = generated_dir();
        let mut backend = RecordingBackend::default();

        let result = StatusCmd {}.execute_with(&mut backend, &config).unwrap();

        assert_eq!(result.status.pending, 1);
        assert_eq!(result.status.applied, 0);
        assert_eq!(result.status.entries[0].tag, "0000_init");
        assert_eq!(result.backend, "recording");
    }

    #[rstest]
    fn test_status_applied_after_migrate() {
        let (_out, config) = generated_dir();
        let mut backend = RecordingBackend::default();
        crate::commands::MigrateCmd {}
            .execute_with(&mut backend, &config)
            .unwrap();

        let result = StatusCmd {}.execute_with(&mut backend, &config).unwrap();
        assert_eq!(result.status.pending, 0);
        assert_eq!(result.status.applied, 1);
    }
}
