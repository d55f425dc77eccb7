//! PostgreSQL DDL compiler.
//!
//! Generates PostgreSQL DDL from schema snapshots. Definitions are compiled by
//! converting them to snapshots first, so the declared schema and the diff
//! share one rendering path. Output is deterministic.

use crate::db::escape::{escape_literal, quote_ident, quote_qualified};
use crate::db::schema::definition::TableDefinition;
use crate::db::schema::snapshot::{
    ColumnSnapshot, EnumSnapshot, ForeignKeySnapshot, Snapshot, TableSnapshot, UniqueSnapshot,
};
use crate::db::schema::SchemaError;

/// Compiler for generating PostgreSQL DDL.
pub struct PostgresCompiler;

impl PostgresCompiler {
    /// Generate `CREATE TYPE` for an enum.
    ///
    /// ```sql
    /// CREATE TYPE "public"."userRole" AS ENUM('AUTHOR', 'CUSTOMER', 'ADMIN', 'NO_ROLE');
    /// ```
    pub fn compile_enum(def: &EnumSnapshot) -> String {
        let values = def
            .values
            .iter()
            .map(|v| format!("'{}'", escape_literal(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE TYPE {} AS ENUM({});",
            quote_qualified(&def.schema, &def.name),
            values
        )
    }

    /// Type as it appears in a column definition; enum types are quoted.
    pub fn column_type(column: &ColumnSnapshot) -> String {
        match column.type_schema {
            Some(_) => quote_ident(&column.data_type),
            None => column.data_type.clone(),
        }
    }

    /// Generate one column definition line (without trailing comma).
    ///
    /// ```sql
    /// "id" uuid PRIMARY KEY DEFAULT gen_random_uuid() NOT NULL
    /// ```
    pub fn compile_column(column: &ColumnSnapshot) -> String {
        let mut parts = vec![quote_ident(&column.name), Self::column_type(column)];
        if column.primary_key {
            parts.push("PRIMARY KEY".to_string());
        }
        if let Some(default) = &column.default {
            parts.push(format!("DEFAULT {}", default));
        }
        if column.not_null {
            parts.push("NOT NULL".to_string());
        }
        parts.join(" ")
    }

    /// Generate an inline `CONSTRAINT ... UNIQUE(...)` clause.
    pub fn compile_unique_clause(unique: &UniqueSnapshot) -> String {
        let columns = unique
            .columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(",");
        format!("CONSTRAINT {} UNIQUE({})", quote_ident(&unique.name), columns)
    }

    /// Generate `CREATE TABLE` with columns and unique constraints inline.
    ///
    /// Foreign keys are emitted separately by [`compile_foreign_key`] so
    /// tables can be created in any order.
    ///
    /// [`compile_foreign_key`]: PostgresCompiler::compile_foreign_key
    pub fn compile_table(table: &TableSnapshot) -> String {
        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("\t{}", Self::compile_column(c)))
            .collect();
        lines.extend(
            table
                .unique_constraints
                .values()
                .map(|u| format!("\t{}", Self::compile_unique_clause(u))),
        );

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            quote_ident(&table.name),
            lines.join(",\n")
        )
    }

    /// Generate `ALTER TABLE ... ADD CONSTRAINT ... FOREIGN KEY`.
    ///
    /// ```sql
    /// ALTER TABLE "book" ADD CONSTRAINT "book_author_id_author_id_fk" FOREIGN KEY ("author_id")
    ///   REFERENCES "public"."author"("id") ON DELETE cascade ON UPDATE no action;
    /// ```
    pub fn compile_foreign_key(fk: &ForeignKeySnapshot) -> String {
        let from = fk
            .columns_from
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(",");
        let to = fk
            .columns_to
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({}) ON DELETE {} ON UPDATE {};",
            quote_ident(&fk.table_from),
            quote_ident(&fk.name),
            from,
            quote_qualified(&fk.schema_to, &fk.table_to),
            to,
            fk.on_delete,
            fk.on_update
        )
    }

    pub fn compile_add_unique(table: &str, unique: &UniqueSnapshot) -> String {
        format!(
            "ALTER TABLE {} ADD {};",
            quote_ident(table),
            Self::compile_unique_clause(unique)
        )
    }

    pub fn compile_drop_constraint(table: &str, name: &str) -> String {
        format!(
            "ALTER TABLE {} DROP CONSTRAINT {};",
            quote_ident(table),
            quote_ident(name)
        )
    }

    pub fn compile_add_column(table: &str, column: &ColumnSnapshot) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {};",
            quote_ident(table),
            Self::compile_column(column)
        )
    }

    pub fn compile_drop_column(table: &str, column: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {};",
            quote_ident(table),
            quote_ident(column)
        )
    }

    /// Change a column's type. Enum targets need an explicit cast.
    pub fn compile_alter_type(table: &str, column: &ColumnSnapshot) -> String {
        let ty = Self::column_type(column);
        format!(
            "ALTER TABLE {} ALTER COLUMN {} SET DATA TYPE {} USING {}::{};",
            quote_ident(table),
            quote_ident(&column.name),
            ty,
            quote_ident(&column.name),
            ty
        )
    }

    pub fn compile_set_not_null(table: &str, column: &str, not_null: bool) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} {} NOT NULL;",
            quote_ident(table),
            quote_ident(column),
            if not_null { "SET" } else { "DROP" }
        )
    }

    pub fn compile_set_default(table: &str, column: &str, default: Option<&str>) -> String {
        match default {
            Some(expr) => format!(
                "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {};",
                quote_ident(table),
                quote_ident(column),
                expr
            ),
            None => format!(
                "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT;",
                quote_ident(table),
                quote_ident(column)
            ),
        }
    }

    pub fn compile_drop_table(table: &str) -> String {
        format!("DROP TABLE {} CASCADE;", quote_ident(table))
    }

    pub fn compile_add_enum_value(def_schema: &str, name: &str, value: &str) -> String {
        format!(
            "ALTER TYPE {} ADD VALUE '{}';",
            quote_qualified(def_schema, name),
            escape_literal(value)
        )
    }

    pub fn compile_drop_enum(schema: &str, name: &str) -> String {
        format!("DROP TYPE {};", quote_qualified(schema, name))
    }

    /// Generate every statement needed to build `snapshot` on an empty database:
    /// enums, then tables in dependency order, then foreign keys.
    pub fn compile_snapshot(snapshot: &Snapshot) -> Result<Vec<String>, SchemaError> {
        let mut statements: Vec<String> = snapshot.enums.values().map(Self::compile_enum).collect();

        let order = snapshot.table_order()?;
        for name in &order {
            statements.push(Self::compile_table(&snapshot.tables[*name]));
        }
        for name in &order {
            statements.extend(
                snapshot.tables[*name]
                    .foreign_keys
                    .values()
                    .map(Self::compile_foreign_key),
            );
        }
        Ok(statements)
    }

    /// Compile a single table definition (columns and unique constraints).
    pub fn compile_definition(table: &TableDefinition) -> String {
        Self::compile_table(&TableSnapshot::from(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{AUTHOR, BOOK, ORDER};
    use rstest::rstest;

    #[rstest]
    fn test_compile_user_role_enum() {
        let snapshot = Snapshot::declared().unwrap();
        assert_eq!(
            PostgresCompiler::compile_enum(&snapshot.enums["userRole"]),
            "CREATE TYPE \"public\".\"userRole\" AS ENUM('AUTHOR', 'CUSTOMER', 'ADMIN', 'NO_ROLE');"
        );
    }

    #[rstest]
    fn test_compile_author_table() {
        let expected = "CREATE TABLE IF NOT EXISTS \"author\" (
\t\"id\" uuid PRIMARY KEY DEFAULT gen_random_uuid() NOT NULL,
\t\"name\" varchar(255) NOT NULL,
\t\"age\" integer NOT NULL,
\t\"email\" varchar(255) NOT NULL,
\t\"bio\" varchar(255) NOT NULL,
\t\"password\" text NOT NULL,
\t\"userRole\" \"userRole\" DEFAULT 'AUTHOR' NOT NULL,
\tCONSTRAINT \"author_email_unique\" UNIQUE(\"email\")
);";
        assert_eq!(PostgresCompiler::compile_definition(&AUTHOR), expected);
    }

    #[rstest]
    fn test_compile_book_table() {
        let expected = "CREATE TABLE IF NOT EXISTS \"book\" (
\t\"id\" uuid PRIMARY KEY DEFAULT gen_random_uuid() NOT NULL,
\t\"title\" varchar(255) NOT NULL,
\t\"description\" text NOT NULL,
\t\"price\" real NOT NULL,
\t\"published_date\" timestamp NOT NULL,
\t\"author_id\" uuid NOT NULL,
\t\"publisher_id\" uuid NOT NULL,
\t\"language_id\" uuid NOT NULL
);";
        assert_eq!(PostgresCompiler::compile_definition(&BOOK), expected);
    }

    #[rstest]
    fn test_compile_order_table_quotes_reserved_word() {
        let ddl = PostgresCompiler::compile_definition(&ORDER);
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS \"order\" ("));
        assert!(ddl.contains("\"total_price\" real NOT NULL"));
    }

    #[rstest]
    fn test_compile_foreign_key() {
        let snapshot = Snapshot::declared().unwrap();
        let fk = &snapshot.tables["order"].foreign_keys["order_customer_id_customer_id_fk"];
        assert_eq!(
            PostgresCompiler::compile_foreign_key(fk),
            "ALTER TABLE \"order\" ADD CONSTRAINT \"order_customer_id_customer_id_fk\" \
             FOREIGN KEY (\"customer_id\") REFERENCES \"public\".\"customer\"(\"id\") \
             ON DELETE cascade ON UPDATE no action;"
        );
    }

    #[rstest]
    fn test_compile_snapshot_order() {
        let snapshot = Snapshot::declared().unwrap();
        let statements = PostgresCompiler::compile_snapshot(&snapshot).unwrap();

        // 1 enum + 7 tables + 5 foreign keys
        assert_eq!(statements.len(), 13);
        assert!(statements[0].starts_with("CREATE TYPE"));
        assert!(statements[1..8].iter().all(|s| s.starts_with("CREATE TABLE")));
        assert!(statements[8..].iter().all(|s| s.contains("FOREIGN KEY")));

        let pos = |needle: &str| statements.iter().position(|s| s.contains(needle)).unwrap();
        assert!(pos("EXISTS \"author\"") < pos("EXISTS \"book\""));
        assert!(pos("EXISTS \"book\"") < pos("EXISTS \"order\""));
    }

    #[rstest]
    fn test_compile_alter_statements() {
        let column = ColumnSnapshot {
            name: "userRole".to_string(),
            data_type: "userRole".to_string(),
            type_schema: Some("public".to_string()),
            primary_key: false,
            not_null: true,
            default: None,
        };
        assert_eq!(
            PostgresCompiler::compile_alter_type("admin", &column),
            "ALTER TABLE \"admin\" ALTER COLUMN \"userRole\" SET DATA TYPE \"userRole\" USING \"userRole\"::\"userRole\";"
        );
        assert_eq!(
            PostgresCompiler::compile_set_not_null("admin", "name", false),
            "ALTER TABLE \"admin\" ALTER COLUMN \"name\" DROP NOT NULL;"
        );
        assert_eq!(
            PostgresCompiler::compile_set_default("admin", "userRole", Some("'ADMIN'")),
            "ALTER TABLE \"admin\" ALTER COLUMN \"userRole\" SET DEFAULT 'ADMIN';"
        );
        assert_eq!(
            PostgresCompiler::compile_drop_table("order"),
            "DROP TABLE \"order\" CASCADE;"
        );
        assert_eq!(
            PostgresCompiler::compile_add_enum_value("public", "userRole", "GUEST"),
            "ALTER TYPE \"public\".\"userRole\" ADD VALUE 'GUEST';"
        );
    }
}
