//! Relational schema definitions and the tooling that reads them.
//!
//! This module provides structured definitions for the database schema,
//! allowing DDL, snapshots and migrations to be generated from a single
//! source of truth.
//!
//! # Overview
//!
//! 1. **Core Types** (`definition.rs`):
//!    - `DataType`, `SchemaColumn`, `ForeignKey`, `TableDefinition`, `EnumDefinition`
//!
//! 2. **Table Definitions** (`tables.rs`):
//!    - `AUTHOR`, `CUSTOMER`, `ADMIN`, `PUBLISHER`, `LANGUAGE`, `BOOK`, `ORDER`
//!    - `USER_ROLE` enum, `ALL_TABLES`, `ALL_ENUMS`
//!
//! 3. **Relationship Metadata** (`relations.rs`):
//!    - advisory "one" relations, resolved to join columns on demand
//!
//! 4. **Snapshots and Diffs** (`snapshot.rs`, `diff.rs`):
//!    - serializable schema images and ordered structural changes between them
//!
//! 5. **Compilers** (`compilers/`):
//!    - PostgreSQL DDL rendering
//!
//! # Type Mapping
//!
//! | Rust Type | PostgreSQL Type |
//! |-----------|-----------------|
//! | Uuid | uuid |
//! | Varchar { length } | varchar(length) |
//! | Text | text |
//! | Integer | integer |
//! | Real | real |
//! | Timestamp | timestamp |
//! | Enum(def) | "def.name" |

pub mod compilers;
mod definition;
pub mod diff;
pub mod relations;
pub mod snapshot;
mod tables;
mod validate;

use thiserror::Error;

pub use definition::{
    ColumnDefault, DataType, EnumDefinition, ForeignKey, ReferentialAction, SchemaColumn,
    TableDefinition,
};
pub use diff::{diff, SchemaChange};
pub use relations::{ALL_RELATIONS, JoinColumns, Relation, RelationKind};
pub use snapshot::Snapshot;
pub use tables::{
    ADMIN, ALL_ENUMS, ALL_TABLES, AUTHOR, BOOK, CUSTOMER, LANGUAGE, ORDER, PUBLISHER, USER_ROLE,
    table,
};
pub use validate::{loose_order, ordered_tables, topo_order, validate};

/// Schema definition and diff errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Unknown table '{name}'")]
    UnknownTable { name: String },

    #[error("Unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("Unknown enum type '{name}'")]
    UnknownEnum { name: String },

    #[error("Duplicate {kind} '{name}'")]
    Duplicate { kind: &'static str, name: String },

    #[error("Table '{table}' must have exactly one primary key column, found {count}")]
    PrimaryKey { table: String, count: usize },

    #[error("Default '{value}' for {table}.{column} is not a member of its enum")]
    InvalidDefault {
        table: String,
        column: String,
        value: String,
    },

    #[error("Foreign key '{constraint}' joins {local} to {remote}")]
    ForeignKeyType {
        constraint: String,
        local: String,
        remote: String,
    },

    #[error("Foreign keys form a cycle between: {}", tables.join(", "))]
    DependencyCycle { tables: Vec<String> },

    #[error("Relation '{relation}' on '{table}': {message}")]
    InvalidRelation {
        table: String,
        relation: String,
        message: String,
    },

    #[error("Unsupported schema change: {message}")]
    UnsupportedChange { message: String },
}
