use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

use bookstore_schema::cli::Args;
use bookstore_schema::logging;

fn main() -> ExitCode {
    // Existing environment variables take precedence over .env
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();
    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            logging::init(args.verbose);
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(config.verbose);

    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "loaded environment file");
    }

    // Fail on a missing connection URL before doing anything else
    if args.command.needs_database() {
        if let Err(e) = config.database() {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    match args.command.run(&config, args.format) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
