//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - `execute.rs` producing a serializable result
//! - `output.rs` rendering that result as a table
//!
//! Commands that talk to the database open the connection in `execute` and
//! do their work in `execute_with`, which takes any `DatabaseBackend`.

mod check;
mod export;
mod generate;
mod migrate;
mod push;
mod status;

pub use check::CheckCmd;
pub use export::ExportCmd;
pub use generate::GenerateCmd;
pub use migrate::MigrateCmd;
pub use push::PushCmd;
pub use status::StatusCmd;

use clap::Subcommand;
use std::error::Error;

use crate::config::ConfigFile;
use crate::output::{OutputFormat, Outputable};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the next migration from the declared schema
    Generate(GenerateCmd),

    /// Apply pending migrations to the database
    Migrate(MigrateCmd),

    /// Apply the declared schema directly, without migration files
    Push(PushCmd),

    /// Validate the migration directory
    Check(CheckCmd),

    /// Show applied and pending migrations
    Status(StatusCmd),

    /// Print the DDL for the declared schema
    Export(ExportCmd),

    /// Catch-all for unknown commands
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, config: &ConfigFile, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Generate(cmd) => Ok(cmd.execute(config)?.format(format)),
            Command::Migrate(cmd) => Ok(cmd.execute(config)?.format(format)),
            Command::Push(cmd) => Ok(cmd.execute(config)?.format(format)),
            Command::Check(cmd) => Ok(cmd.execute(config)?.format(format)),
            Command::Status(cmd) => Ok(cmd.execute(config)?.format(format)),
            Command::Export(cmd) => Ok(cmd.execute(config)?.format(format)),
            Command::Unknown(args) => {
                Err(format!("Unknown command: {}", args.first().unwrap_or(&String::new())).into())
            }
        }
    }

    /// True for commands that need `DATABASE_URL` (or the configured variable).
    pub fn needs_database(&self) -> bool {
        matches!(self, Command::Migrate(_) | Command::Push(_) | Command::Status(_))
    }
}
