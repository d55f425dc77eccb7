//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;
use std::path::PathBuf;

use crate::commands::Command;
use crate::config::{ConfigError, ConfigFile, ConfigOverrides};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (default: .bookstore.json if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Migration output directory, overrides `out`
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, default_value_t = false, global = true)]
    pub verbose: bool,

    /// Ask before running destructive changes
    #[arg(long, default_value_t = false, global = true)]
    pub strict: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            out: self.out.clone(),
            verbose: self.verbose,
            strict: self.strict,
        }
    }

    /// The configuration file merged with command-line overrides.
    pub fn load_config(&self) -> Result<ConfigFile, ConfigError> {
        let file = match &self.config {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };
        Ok(file.with_overrides(&self.overrides()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_global_defaults() {
        let args = Args::try_parse_from(["bookstore_schema", "export"]).unwrap();
        assert_eq!(args.config, None);
        assert_eq!(args.out, None);
        assert!(!args.verbose);
        assert!(!args.strict);
        assert_eq!(args.format, OutputFormat::Table);
    }

    #[rstest]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "bookstore_schema",
            "status",
            "--out",
            "./sql",
            "--strict",
            "-v",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(args.out, Some(PathBuf::from("./sql")));
        assert!(args.strict);
        assert!(args.verbose);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[rstest]
    fn test_overrides_apply_to_config() {
        let args =
            Args::try_parse_from(["bookstore_schema", "--out", "./sql", "--strict", "check"])
                .unwrap();
        let config = ConfigFile::default().with_overrides(&args.overrides());
        assert_eq!(config.out, PathBuf::from("./sql"));
        assert!(config.strict);
    }

    #[rstest]
    fn test_explicit_missing_config_fails() {
        let args = Args::try_parse_from([
            "bookstore_schema",
            "--config",
            "/nonexistent/.bookstore.json",
            "export",
        ])
        .unwrap();
        assert!(matches!(
            args.load_config().unwrap_err(),
            ConfigError::Read { .. }
        ));
    }
}
