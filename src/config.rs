//! Tool configuration.
//!
//! Settings come from an optional `.bookstore.json` in the current directory
//! (or the file passed with `--config`), then CLI flags override them. Every
//! field has a default, so an empty object or a missing file is valid.
//!
//! ```json
//! {
//!   "dialect": "postgresql",
//!   "schema": "./src/db/schema/tables.rs",
//!   "out": "./migrations",
//!   "db_credentials": { "url_env": "DATABASE_URL" },
//!   "verbose": true,
//!   "strict": true
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{DatabaseConfig, DEFAULT_URL_ENV};

/// Configuration file looked up in the current directory.
pub const CONFIG_FILE: &str = ".bookstore.json";

const DIALECT: &str = "postgresql";

/// Configuration errors. All of them are fatal and raised before any
/// database work starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Environment variable {name} is not set; it must hold the database connection URL \
         (older setups use Database_URL: point db_credentials.url_env at it in .bookstore.json)"
    )]
    MissingEnv { name: String },

    #[error("Invalid database URL: {message}")]
    InvalidUrl { message: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unsupported dialect '{dialect}', only 'postgresql' is supported")]
    UnsupportedDialect { dialect: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbCredentials {
    /// Name of the environment variable holding the connection URL
    pub url_env: String,
}

impl Default for DbCredentials {
    fn default() -> Self {
        Self {
            url_env: DEFAULT_URL_ENV.to_string(),
        }
    }
}

/// Top-level configuration file structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub dialect: String,
    /// Where the schema definition lives; informational
    pub schema: PathBuf,
    /// Migration output directory
    pub out: PathBuf,
    pub db_credentials: DbCredentials,
    pub verbose: bool,
    /// Ask before running destructive changes
    pub strict: bool,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            dialect: DIALECT.to_string(),
            schema: PathBuf::from("./src/db/schema/tables.rs"),
            out: PathBuf::from("./migrations"),
            db_credentials: DbCredentials::default(),
            verbose: false,
            strict: false,
        }
    }
}

/// Values given on the command line; `None`/`false` leaves the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub out: Option<PathBuf>,
    pub verbose: bool,
    pub strict: bool,
}

impl ConfigFile {
    /// Load `.bookstore.json` from the current directory, or defaults if
    /// there is none.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    /// Load a specific file; it must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: ConfigFile =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dialect != DIALECT {
            return Err(ConfigError::UnsupportedDialect {
                dialect: self.dialect.clone(),
            });
        }
        Ok(())
    }

    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(out) = &overrides.out {
            self.out = out.clone();
        }
        self.verbose |= overrides.verbose;
        self.strict |= overrides.strict;
        self
    }

    /// Read and validate the connection URL from the configured variable.
    pub fn database(&self) -> Result<DatabaseConfig, ConfigError> {
        DatabaseConfig::from_env(&self.db_credentials.url_env)
    }
}
