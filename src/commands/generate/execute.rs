use std::error::Error;

use serde::Serialize;

use super::GenerateCmd;
use crate::commands::Execute;
use crate::config::ConfigFile;
use crate::db::migrations::{GeneratedMigration, MigrationDir};

/// Result of the generate command execution
#[derive(Debug, Serialize)]
pub struct GenerateResult {
    pub out: String,
    /// `None` when the declared schema matches the last snapshot
    pub migration: Option<GeneratedMigration>,
}

impl Execute for GenerateCmd {
    type Output = GenerateResult;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>> {
        let mut dir = MigrationDir::open(&config.out)?;
        let migration = dir.generate(self.name.as_deref())?;

        Ok(GenerateResult {
            out: config.out.display().to_string(),
            migration,
        })
    }
}
