mod execute;
mod output;

use clap::Args;

/// Apply the declared schema directly, without migration files
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  bookstore_schema push                      # Diff the live database and apply
  bookstore_schema push --dry-run            # Print the statements only
  bookstore_schema push --strict             # Ask before dropping anything
  bookstore_schema push --strict --force     # Drop without asking")]
pub struct PushCmd {
    /// Run destructive changes without asking, even in strict mode
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Show what would be executed without doing it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
