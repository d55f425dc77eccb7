//! bookstore_schema library - Bookstore relational schema and migration tool
//!
//! Declares the bookstore tables, the `userRole` enum and their relationship
//! metadata, and provides the tooling to turn that declaration into
//! PostgreSQL migrations and apply them.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod output;

#[macro_use]
pub mod test_macros;

#[cfg(test)]
pub mod test_utils;
