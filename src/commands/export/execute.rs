use std::error::Error;

use serde::Serialize;

use super::ExportCmd;
use crate::commands::Execute;
use crate::config::ConfigFile;
use crate::db::schema::compilers::PostgresCompiler;
use crate::db::schema::Snapshot;

/// Result of the export command execution
#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub breakpoints: bool,
    pub statements: Vec<String>,
}

impl Execute for ExportCmd {
    type Output = ExportResult;

    fn execute(self, _config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>> {
        let snapshot = Snapshot::declared()?;
        let statements = PostgresCompiler::compile_snapshot(&snapshot)?;

        Ok(ExportResult {
            breakpoints: self.breakpoints,
            statements,
        })
    }
}
