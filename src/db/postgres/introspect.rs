//! Reading the live schema back from PostgreSQL catalogs.
//!
//! The queries return flat rows; the functions here fold them into a
//! `Snapshot` with the same spelling the definitions produce, so that a
//! database created from the declared schema diffs empty against it.

use std::collections::BTreeMap;

use crate::db::schema::snapshot::{
    ColumnSnapshot, EnumSnapshot, ForeignKeySnapshot, Snapshot, TableSnapshot, UniqueSnapshot,
};
use crate::db::schema::ReferentialAction;

pub(crate) const ENUMS_QUERY: &str = "\
SELECT n.nspname::text, t.typname::text, e.enumlabel::text
FROM pg_type t
JOIN pg_enum e ON e.enumtypid = t.oid
JOIN pg_namespace n ON n.oid = t.typnamespace
WHERE n.nspname = $1
ORDER BY t.typname, e.enumsortorder";

pub(crate) const TABLES_QUERY: &str = "\
SELECT table_name::text
FROM information_schema.tables
WHERE table_schema = $1 AND table_type = 'BASE TABLE'
ORDER BY table_name";

pub(crate) const COLUMNS_QUERY: &str = "\
SELECT table_name::text, column_name::text, data_type::text,
       character_maximum_length::int4, udt_schema::text, udt_name::text,
       is_nullable::text, column_default::text
FROM information_schema.columns
WHERE table_schema = $1
ORDER BY table_name, ordinal_position";

pub(crate) const KEYS_QUERY: &str = "\
SELECT tc.table_name::text, tc.constraint_name::text, tc.constraint_type::text,
       kcu.column_name::text
FROM information_schema.table_constraints tc
JOIN information_schema.key_column_usage kcu
  ON kcu.constraint_name = tc.constraint_name
 AND kcu.table_schema = tc.table_schema
 AND kcu.table_name = tc.table_name
WHERE tc.table_schema = $1 AND tc.constraint_type IN ('PRIMARY KEY', 'UNIQUE')
ORDER BY tc.table_name, tc.constraint_name, kcu.ordinal_position";

pub(crate) const FOREIGN_KEYS_QUERY: &str = "\
SELECT tc.table_name::text, tc.constraint_name::text, kcu.column_name::text,
       ccu.table_schema::text, ccu.table_name::text, ccu.column_name::text,
       rc.delete_rule::text, rc.update_rule::text
FROM information_schema.table_constraints tc
JOIN information_schema.key_column_usage kcu
  ON kcu.constraint_name = tc.constraint_name
 AND kcu.table_schema = tc.table_schema
JOIN information_schema.referential_constraints rc
  ON rc.constraint_name = tc.constraint_name
 AND rc.constraint_schema = tc.table_schema
JOIN information_schema.constraint_column_usage ccu
  ON ccu.constraint_name = tc.constraint_name
 AND ccu.constraint_schema = tc.table_schema
WHERE tc.table_schema = $1 AND tc.constraint_type = 'FOREIGN KEY'
ORDER BY tc.table_name, tc.constraint_name, kcu.ordinal_position";

/// One row of `information_schema.columns`.
#[derive(Debug, Clone, Default)]
pub struct ColumnRow {
    pub table: String,
    pub column: String,
    pub data_type: String,
    pub max_length: Option<i32>,
    pub udt_schema: String,
    pub udt_name: String,
    pub nullable: bool,
    pub default: Option<String>,
}

/// A primary key or unique constraint column.
#[derive(Debug, Clone)]
pub struct KeyRow {
    pub table: String,
    pub constraint: String,
    pub primary_key: bool,
    pub column: String,
}

#[derive(Debug, Clone)]
pub struct ForeignKeyRow {
    pub table: String,
    pub constraint: String,
    pub column: String,
    pub target_schema: String,
    pub target_table: String,
    pub target_column: String,
    pub delete_rule: String,
    pub update_rule: String,
}

/// Everything read from the catalogs for one schema.
#[derive(Debug, Clone, Default)]
pub struct CatalogRows {
    /// (schema, type name, label) in sort order
    pub enums: Vec<(String, String, String)>,
    pub tables: Vec<String>,
    pub columns: Vec<ColumnRow>,
    pub keys: Vec<KeyRow>,
    pub foreign_keys: Vec<ForeignKeyRow>,
}

/// Canonical type name and, for user-defined types, the type's schema.
pub fn normalize_type(row: &ColumnRow) -> (String, Option<String>) {
    match row.data_type.as_str() {
        "character varying" => match row.max_length {
            Some(n) => (format!("varchar({})", n), None),
            None => ("varchar".to_string(), None),
        },
        "timestamp without time zone" => ("timestamp".to_string(), None),
        "timestamp with time zone" => ("timestamp with time zone".to_string(), None),
        "USER-DEFINED" => (row.udt_name.clone(), Some(row.udt_schema.clone())),
        other => (other.to_string(), None),
    }
}

/// Strip the cast PostgreSQL appends to literal defaults.
///
/// `'AUTHOR'::"userRole"` becomes `'AUTHOR'`; function calls are kept as is.
pub fn normalize_default(default: Option<&str>) -> Option<String> {
    let default = default?.trim();
    if default.starts_with('\'') {
        if let Some(end) = default.rfind("'::") {
            return Some(default[..=end].to_string());
        }
    }
    Some(default.to_string())
}

/// Lowercase referential action text matching the definitions.
pub fn normalize_action(rule: &str) -> String {
    ReferentialAction::parse(rule)
        .map(|a| a.sql().to_string())
        .unwrap_or_else(|| rule.to_ascii_lowercase())
}

/// Fold catalog rows into a snapshot.
///
/// The result has nil ids; it describes structure only.
pub fn build_snapshot(rows: CatalogRows) -> Snapshot {
    let mut snapshot = Snapshot::empty();

    for (schema, name, label) in rows.enums {
        snapshot
            .enums
            .entry(name.clone())
            .or_insert_with(|| EnumSnapshot {
                name,
                schema,
                values: Vec::new(),
            })
            .values
            .push(label);
    }

    for name in &rows.tables {
        snapshot.tables.insert(
            name.clone(),
            TableSnapshot {
                name: name.clone(),
                schema: crate::db::schema::snapshot::DEFAULT_SCHEMA.to_string(),
                columns: Vec::new(),
                foreign_keys: BTreeMap::new(),
                unique_constraints: BTreeMap::new(),
            },
        );
    }

    for row in &rows.columns {
        let Some(table) = snapshot.tables.get_mut(&row.table) else {
            continue;
        };
        let (data_type, type_schema) = normalize_type(row);
        table.columns.push(ColumnSnapshot {
            name: row.column.clone(),
            data_type,
            type_schema,
            primary_key: false,
            not_null: !row.nullable,
            default: normalize_default(row.default.as_deref()),
        });
    }

    for key in rows.keys {
        let Some(table) = snapshot.tables.get_mut(&key.table) else {
            continue;
        };
        if key.primary_key {
            if let Some(column) = table.columns.iter_mut().find(|c| c.name == key.column) {
                column.primary_key = true;
            }
        } else {
            table
                .unique_constraints
                .entry(key.constraint.clone())
                .or_insert_with(|| UniqueSnapshot {
                    name: key.constraint,
                    columns: Vec::new(),
                })
                .columns
                .push(key.column);
        }
    }

    for fk in rows.foreign_keys {
        let Some(table) = snapshot.tables.get_mut(&fk.table) else {
            continue;
        };
        let entry = table
            .foreign_keys
            .entry(fk.constraint.clone())
            .or_insert_with(|| ForeignKeySnapshot {
                name: fk.constraint.clone(),
                table_from: fk.table.clone(),
                columns_from: Vec::new(),
                table_to: fk.target_table.clone(),
                schema_to: fk.target_schema.clone(),
                columns_to: Vec::new(),
                on_delete: normalize_action(&fk.delete_rule),
                on_update: normalize_action(&fk.update_rule),
            });
        if !entry.columns_from.contains(&fk.column) {
            entry.columns_from.push(fk.column);
        }
        if !entry.columns_to.contains(&fk.target_column) {
            entry.columns_to.push(fk.target_column);
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn column(table: &str, name: &str, data_type: &str) -> ColumnRow {
        ColumnRow {
            table: table.to_string(),
            column: name.to_string(),
            data_type: data_type.to_string(),
            udt_schema: "pg_catalog".to_string(),
            ..Default::default()
        }
    }

    #[rstest]
    #[case("character varying", Some(255), "", "", "varchar(255)", None)]
    #[case("timestamp without time zone", None, "", "", "timestamp", None)]
    #[case("real", None, "", "", "real", None)]
    #[case("uuid", None, "", "", "uuid", None)]
    #[case("USER-DEFINED", None, "public", "userRole", "userRole", Some("public"))]
    fn test_normalize_type(
        #[case] data_type: &str,
        #[case] max_length: Option<i32>,
        #[case] udt_schema: &str,
        #[case] udt_name: &str,
        #[case] expected: &str,
        #[case] expected_schema: Option<&str>,
    ) {
        let row = ColumnRow {
            data_type: data_type.to_string(),
            max_length,
            udt_schema: udt_schema.to_string(),
            udt_name: udt_name.to_string(),
            ..Default::default()
        };
        let (ty, schema) = normalize_type(&row);
        assert_eq!(ty, expected);
        assert_eq!(schema.as_deref(), expected_schema);
    }

    #[rstest]
    #[case(Some("'AUTHOR'::\"userRole\""), Some("'AUTHOR'"))]
    #[case(Some("'it''s'::text"), Some("'it''s'"))]
    #[case(Some("gen_random_uuid()"), Some("gen_random_uuid()"))]
    #[case(None, None)]
    fn test_normalize_default(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(normalize_default(raw).as_deref(), expected);
    }

    #[rstest]
    #[case("CASCADE", "cascade")]
    #[case("NO ACTION", "no action")]
    #[case("SET NULL", "set null")]
    fn test_normalize_action(#[case] rule: &str, #[case] expected: &str) {
        assert_eq!(normalize_action(rule), expected);
    }

    #[rstest]
    fn test_build_snapshot_folds_rows() {
        let mut id = column("book", "id", "uuid");
        id.default = Some("gen_random_uuid()".to_string());
        let mut title = column("book", "title", "character varying");
        title.max_length = Some(255);
        let mut author_id = column("book", "author_id", "uuid");
        author_id.nullable = false;
        let author = column("author", "id", "uuid");

        let rows = CatalogRows {
            enums: vec![
                ("public".into(), "userRole".into(), "AUTHOR".into()),
                ("public".into(), "userRole".into(), "CUSTOMER".into()),
            ],
            tables: vec!["author".into(), "book".into()],
            columns: vec![author, id, title, author_id],
            keys: vec![
                KeyRow {
                    table: "book".into(),
                    constraint: "book_pkey".into(),
                    primary_key: true,
                    column: "id".into(),
                },
                KeyRow {
                    table: "book".into(),
                    constraint: "book_title_unique".into(),
                    primary_key: false,
                    column: "title".into(),
                },
            ],
            foreign_keys: vec![ForeignKeyRow {
                table: "book".into(),
                constraint: "book_author_id_author_id_fk".into(),
                column: "author_id".into(),
                target_schema: "public".into(),
                target_table: "author".into(),
                target_column: "id".into(),
                delete_rule: "CASCADE".into(),
                update_rule: "NO ACTION".into(),
            }],
        };

        let snapshot = build_snapshot(rows);

        assert_eq!(snapshot.enums["userRole"].values, vec!["AUTHOR", "CUSTOMER"]);
        let book = &snapshot.tables["book"];
        assert_eq!(book.columns.len(), 3);
        assert!(book.column("id").unwrap().primary_key);
        assert_eq!(book.column("title").unwrap().data_type, "varchar(255)");
        assert!(book.column("author_id").unwrap().not_null);
        assert_eq!(
            book.unique_constraints["book_title_unique"].columns,
            vec!["title"]
        );
        let fk = &book.foreign_keys["book_author_id_author_id_fk"];
        assert_eq!(fk.on_delete, "cascade");
        assert_eq!(fk.on_update, "no action");
        assert_eq!(fk.table_to, "author");
    }

    #[rstest]
    fn test_build_snapshot_skips_unknown_tables() {
        let rows = CatalogRows {
            columns: vec![column("ghost", "id", "uuid")],
            ..Default::default()
        };
        assert!(build_snapshot(rows).tables.is_empty());
    }
}
