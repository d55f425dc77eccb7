mod execute;
mod output;

use clap::Args;

/// Apply pending migrations to the database
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  bookstore_schema migrate                   # Apply everything newer than the ledger
  bookstore_schema migrate --out ./sql       # Use another migration directory
  DATABASE_URL=postgres://localhost/shop bookstore_schema migrate")]
pub struct MigrateCmd {}
