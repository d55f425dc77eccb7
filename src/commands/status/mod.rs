mod execute;
mod output;

use clap::Args;

/// Show applied and pending migrations
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  bookstore_schema status                    # Compare the journal with the database ledger
  bookstore_schema status --format json      # Machine-readable status")]
pub struct StatusCmd {}
