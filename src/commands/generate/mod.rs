mod cli_tests;
mod execute;
mod output;

use clap::Args;

/// Write the next migration from the declared schema
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  bookstore_schema generate                  # Diff against the last snapshot
  bookstore_schema generate -n add_isbn      # Name the migration file 0001_add_isbn.sql
  bookstore_schema generate --out ./sql      # Write to another directory")]
pub struct GenerateCmd {
    /// Migration name appended to the index (default: init, then migration)
    #[arg(short, long)]
    pub name: Option<String>,
}
