mod execute;
mod output;

use clap::Args;

/// Print the DDL for the declared schema
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  bookstore_schema export                    # SQL for an empty database
  bookstore_schema export --breakpoints      # Same, in migration file format
  bookstore_schema export --format json      # Statements as a JSON array")]
pub struct ExportCmd {
    /// Separate statements with `--> statement-breakpoint`
    #[arg(long, default_value_t = false)]
    pub breakpoints: bool,
}
