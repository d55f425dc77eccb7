//! PostgreSQL backend implementation.
//!
//! Wraps a synchronous `postgres::Client`. Migrations are applied one per
//! transaction and recorded in the `"drizzle"."__drizzle_migrations"` ledger
//! so existing databases managed by drizzle-kit keep working.

pub mod introspect;

use postgres::{Client, NoTls};
use tracing::{debug, info};

use super::backend::DatabaseBackend;
use super::migrations::{AppliedMigration, MigrationScript};
use super::schema::snapshot::DEFAULT_SCHEMA;
use super::schema::Snapshot;
use super::{DatabaseConfig, DbError};

use introspect::{CatalogRows, ColumnRow, ForeignKeyRow, KeyRow};

/// Schema holding the applied-migration ledger.
pub const MIGRATIONS_SCHEMA: &str = "drizzle";

/// Ledger table name.
pub const MIGRATIONS_TABLE: &str = "__drizzle_migrations";

/// PostgreSQL backend over a single blocking connection.
pub struct PostgresBackend {
    client: Client,
}

impl PostgresBackend {
    /// Connect to the database described by `config`.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        let client = Client::connect(config.url(), NoTls).map_err(|e| DbError::ConnectFailed {
            target: config.redacted(),
            message: describe(&e),
        })?;
        debug!(target = %config.redacted(), "connected");
        Ok(Self { client })
    }

    /// Wrap an already open client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Access the underlying client, e.g. to run application queries.
    pub fn client(&mut self) -> &mut Client {
        &mut self.client
    }

    fn ledger() -> String {
        format!("\"{}\".\"{}\"", MIGRATIONS_SCHEMA, MIGRATIONS_TABLE)
    }

    fn read_catalogs(&mut self, schema: &str) -> Result<CatalogRows, postgres::Error> {
        let mut rows = CatalogRows::default();

        for row in self.client.query(introspect::ENUMS_QUERY, &[&schema])? {
            rows.enums.push((row.get(0), row.get(1), row.get(2)));
        }

        for row in self.client.query(introspect::TABLES_QUERY, &[&schema])? {
            rows.tables.push(row.get(0));
        }

        for row in self.client.query(introspect::COLUMNS_QUERY, &[&schema])? {
            let is_nullable: String = row.get(6);
            rows.columns.push(ColumnRow {
                table: row.get(0),
                column: row.get(1),
                data_type: row.get(2),
                max_length: row.get(3),
                udt_schema: row.get(4),
                udt_name: row.get(5),
                nullable: is_nullable == "YES",
                default: row.get(7),
            });
        }

        for row in self.client.query(introspect::KEYS_QUERY, &[&schema])? {
            let kind: String = row.get(2);
            rows.keys.push(KeyRow {
                table: row.get(0),
                constraint: row.get(1),
                primary_key: kind == "PRIMARY KEY",
                column: row.get(3),
            });
        }

        for row in self.client.query(introspect::FOREIGN_KEYS_QUERY, &[&schema])? {
            rows.foreign_keys.push(ForeignKeyRow {
                table: row.get(0),
                constraint: row.get(1),
                column: row.get(2),
                target_schema: row.get(3),
                target_table: row.get(4),
                target_column: row.get(5),
                delete_rule: row.get(6),
                update_rule: row.get(7),
            });
        }

        Ok(rows)
    }
}

/// Error text without the client's "db error:" wrapping.
pub fn describe(err: &postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => match db.detail() {
            Some(detail) => format!("{} ({})", db.message(), detail),
            None => db.message().to_string(),
        },
        None => err.to_string(),
    }
}

impl DatabaseBackend for PostgresBackend {
    fn backend_name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn ensure_migrations_table(&mut self) -> Result<(), DbError> {
        let ddl = format!(
            "CREATE SCHEMA IF NOT EXISTS \"{schema}\";\n\
             CREATE TABLE IF NOT EXISTS {table} (\n\
             \tid SERIAL PRIMARY KEY,\n\
             \thash text NOT NULL,\n\
             \tcreated_at bigint\n\
             );",
            schema = MIGRATIONS_SCHEMA,
            table = Self::ledger(),
        );
        self.client
            .batch_execute(&ddl)
            .map_err(|e| DbError::QueryFailed { message: describe(&e) })
    }

    fn applied_migrations(&mut self) -> Result<Vec<AppliedMigration>, DbError> {
        let sql = format!(
            "SELECT id, hash, created_at FROM {} ORDER BY created_at ASC, id ASC",
            Self::ledger()
        );
        let rows = self
            .client
            .query(sql.as_str(), &[])
            .map_err(|e| DbError::QueryFailed { message: describe(&e) })?;

        Ok(rows
            .iter()
            .map(|row| AppliedMigration {
                id: row.get(0),
                hash: row.get(1),
                created_at: row.get::<_, Option<i64>>(2).unwrap_or_default(),
            })
            .collect())
    }

    fn apply_migration(&mut self, migration: &MigrationScript) -> Result<(), DbError> {
        let failed = |e: postgres::Error| DbError::MigrationFailed {
            tag: migration.tag.clone(),
            message: describe(&e),
        };

        let insert = format!(
            "INSERT INTO {} (hash, created_at) VALUES ($1, $2)",
            Self::ledger()
        );

        let mut tx = self.client.transaction().map_err(failed)?;
        for statement in &migration.statements {
            debug!(tag = %migration.tag, "{}", statement);
            tx.batch_execute(statement).map_err(failed)?;
        }
        tx.execute(insert.as_str(), &[&migration.hash, &migration.when])
            .map_err(failed)?;
        tx.commit().map_err(failed)?;

        info!(tag = %migration.tag, statements = migration.statements.len(), "applied migration");
        Ok(())
    }

    fn execute_statements(&mut self, statements: &[String]) -> Result<(), DbError> {
        let failed = |e: postgres::Error| DbError::QueryFailed { message: describe(&e) };

        let mut tx = self.client.transaction().map_err(failed)?;
        for statement in statements {
            debug!("{}", statement);
            tx.batch_execute(statement).map_err(failed)?;
        }
        tx.commit().map_err(failed)
    }

    fn introspect(&mut self) -> Result<Snapshot, DbError> {
        let rows = self
            .read_catalogs(DEFAULT_SCHEMA)
            .map_err(|e| DbError::IntrospectFailed { message: describe(&e) })?;
        debug!(
            tables = rows.tables.len(),
            enums = rows.enums.len(),
            "read catalogs"
        );
        Ok(introspect::build_snapshot(rows))
    }
}
