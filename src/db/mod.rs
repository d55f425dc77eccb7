//! Database layer: schema definitions, migration tooling and the PostgreSQL
//! backend.
//!
//! - `schema` declares tables, enums and relationship metadata, and turns them
//!   into snapshots, diffs and DDL
//! - `migrations` reads and writes migration artifacts and applies them
//! - `postgres` talks to a live server through the synchronous `postgres` client
//!
//! # Type Decisions
//!
//! **Why `&mut dyn DatabaseBackend` instead of a connection pool?**
//! Migrations run once per invocation, serially. A single blocking client is
//! all the tool ever needs, and `&mut` lets the borrow checker enforce that.
//!
//! **Why keep constraint errors as the database reports them?**
//! The schema declares constraints; PostgreSQL enforces them. The crate only
//! classifies the SQLSTATE (`ConstraintViolation`) so callers and tests can
//! match on the kind without parsing messages.

mod backend;
mod config;
mod connection;
pub mod escape;
pub mod migrations;
pub mod postgres;
pub mod schema;

pub use backend::DatabaseBackend;
pub use config::{DatabaseConfig, DEFAULT_URL_ENV};
pub use connection::open_db;
pub use escape::{escape_literal, quote_ident};
pub use postgres::PostgresBackend;

use thiserror::Error;

use schema::SchemaError;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to connect to '{target}': {message}")]
    ConnectFailed { target: String, message: String },

    #[error("Query failed: {message}")]
    QueryFailed { message: String },

    #[error("Migration '{tag}' failed: {message}")]
    MigrationFailed { tag: String, message: String },

    #[error("Introspection failed: {message}")]
    IntrospectFailed { message: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Kind of integrity error reported by PostgreSQL on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// 23505
    Unique,
    /// 23502
    NotNull,
    /// 22001, value too long for varchar(n)
    Length,
    /// 22P02, includes values outside an enum type
    Enum,
    /// 23503
    ForeignKey,
    /// 23514
    Check,
}

impl ConstraintViolation {
    /// Classify a SQLSTATE code.
    pub fn from_sqlstate(code: &str) -> Option<Self> {
        match code {
            "23505" => Some(Self::Unique),
            "23502" => Some(Self::NotNull),
            "22001" => Some(Self::Length),
            "22P02" => Some(Self::Enum),
            "23503" => Some(Self::ForeignKey),
            "23514" => Some(Self::Check),
            _ => None,
        }
    }

    /// Classify an error returned by the `postgres` client.
    pub fn of(err: &::postgres::Error) -> Option<Self> {
        err.code().and_then(|state| Self::from_sqlstate(state.code()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Unique => "uniqueness-violation",
            Self::NotNull => "null-violation",
            Self::Length => "length-violation",
            Self::Enum => "enum-violation",
            Self::ForeignKey => "foreign-key-violation",
            Self::Check => "check-violation",
        }
    }
}
