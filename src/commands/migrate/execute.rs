use std::error::Error;

use serde::Serialize;

use super::MigrateCmd;
use crate::commands::Execute;
use crate::config::ConfigFile;
use crate::db::migrations::{MigrationDir, Migrator};
use crate::db::{open_db, DatabaseBackend};

/// Result of the migrate command execution
#[derive(Debug, Serialize)]
pub struct MigrateResult {
    pub out: String,
    pub applied: Vec<String>,
    pub skipped: usize,
}

impl MigrateCmd {
    /// Apply pending migrations from `config.out` using `backend`.
    pub fn execute_with(
        self,
        backend: &mut dyn DatabaseBackend,
        config: &ConfigFile,
    ) -> Result<MigrateResult, Box<dyn Error>> {
        let dir = MigrationDir::open(&config.out)?;
        let report = Migrator::new(backend).run(&dir)?;

        Ok(MigrateResult {
            out: config.out.display().to_string(),
            applied: report.applied,
            skipped: report.skipped,
        })
    }
}

impl Execute for MigrateCmd {
    type Output = MigrateResult;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>> {
        let database = config.database()?;
        let mut backend = open_db(&database)?;
        self.execute_with(&mut backend, config)
    }
}
