use std::error::Error;
use std::io::{self, BufRead, Write};

use serde::Serialize;

use super::PushCmd;
use crate::commands::Execute;
use crate::config::ConfigFile;
use crate::db::migrations::Migrator;
use crate::db::schema::{SchemaChange, Snapshot};
use crate::db::{open_db, DatabaseBackend};

/// Result of the push command execution
#[derive(Debug, Serialize)]
pub struct PushResult {
    pub dry_run: bool,
    pub changes: Vec<String>,
    pub statements: Vec<String>,
    pub destructive: bool,
    pub executed: bool,
}

/// Ask on stderr whether to run `changes`; anything but y/yes declines.
pub fn prompt_confirm(changes: &[SchemaChange]) -> bool {
    let stdin = io::stdin();
    confirm_from(changes, &mut stdin.lock(), &mut io::stderr())
}

fn confirm_from(changes: &[SchemaChange], input: &mut dyn BufRead, prompt: &mut dyn Write) -> bool {
    let _ = writeln!(prompt, "The following changes may lose data:");
    for change in changes {
        let _ = writeln!(prompt, "  - {}", change.describe());
    }
    let _ = write!(prompt, "Apply them? [y/N] ");
    let _ = prompt.flush();

    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

impl PushCmd {
    /// Push the declared schema through `backend`, asking `confirm` about
    /// destructive changes in strict mode.
    pub fn execute_with(
        self,
        backend: &mut dyn DatabaseBackend,
        config: &ConfigFile,
        confirm: &mut dyn FnMut(&[SchemaChange]) -> bool,
    ) -> Result<PushResult, Box<dyn Error>> {
        let target = Snapshot::declared()?;
        let outcome = Migrator::new(backend)
            .strict(config.strict)
            .push(&target, self.dry_run, self.force, confirm)?;

        Ok(PushResult {
            dry_run: self.dry_run,
            changes: outcome.changes,
            statements: outcome.statements,
            destructive: outcome.destructive,
            executed: outcome.executed,
        })
    }
}

impl Execute for PushCmd {
    type Output = PushResult;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>> {
        let database = config.database()?;
        let mut backend = open_db(&database)?;
        self.execute_with(&mut backend, config, &mut prompt_confirm)
    }
}
