//! Database schema compilers.
//!
//! Generates backend-specific DDL from schema snapshots and definitions.

pub mod postgres;

pub use postgres::PostgresCompiler;
