mod execute;
mod output;

use clap::Args;

/// Validate the declared schema and the migration directory
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  bookstore_schema check                     # Validate ./migrations
  bookstore_schema check --out ./sql         # Validate another directory")]
pub struct CheckCmd {}
