//! Serializable schema snapshots.
//!
//! A snapshot is the image of a schema at one point in the migration history.
//! The declared schema, every migration artifact and a live database can all
//! be turned into a snapshot, and any two snapshots can be diffed.
//!
//! Snapshots chain through `prevId`: the first one points at the nil UUID.
//!
//! On disk a snapshot uses drizzle-kit's version 7 layout: tables and enums
//! keyed by `"<schema>.<name>"`, columns as a map in ordinal order, and the
//! sections this crate does not model (indexes, composite keys, sequences,
//! policies, `_meta`, ...) written empty and ignored on read.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::definition::{EnumDefinition, SchemaColumn, TableDefinition};
use super::tables::{ALL_ENUMS, ALL_TABLES};
use super::validate::{loose_order, ordered_tables, topo_order, validate};
use super::SchemaError;

/// Snapshot format version written to disk.
pub const SNAPSHOT_VERSION: &str = "7";

/// The only supported dialect.
pub const DIALECT: &str = "postgresql";

/// Namespace every table and enum lives in.
pub const DEFAULT_SCHEMA: &str = "public";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumSnapshot {
    pub name: String,
    pub schema: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSnapshot {
    pub name: String,

    /// Canonical type name (`uuid`, `varchar(255)`, enum name, ...)
    #[serde(rename = "type")]
    pub data_type: String,

    /// Set for user-defined types (enums)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_schema: Option<String>,

    pub primary_key: bool,
    pub not_null: bool,

    /// Default expression without casts (`gen_random_uuid()`, `'AUTHOR'`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeySnapshot {
    pub name: String,
    pub table_from: String,
    pub columns_from: Vec<String>,
    pub table_to: String,
    #[serde(default = "default_schema")]
    pub schema_to: String,
    pub columns_to: Vec<String>,
    pub on_delete: String,
    pub on_update: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueSnapshot {
    pub name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub name: String,
    pub schema: String,

    /// Columns in ordinal order
    pub columns: Vec<ColumnSnapshot>,

    #[serde(default)]
    pub foreign_keys: BTreeMap<String, ForeignKeySnapshot>,

    #[serde(default)]
    pub unique_constraints: BTreeMap<String, UniqueSnapshot>,
}

impl TableSnapshot {
    pub fn column(&self, name: &str) -> Option<&ColumnSnapshot> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Tables this one references, excluding itself.
    pub fn depends_on(&self) -> impl Iterator<Item = &str> {
        self.foreign_keys
            .values()
            .map(|fk| fk.table_to.as_str())
            .filter(move |t| *t != self.name)
    }
}

/// A schema image. `enums` and `tables` are keyed by bare name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SnapshotFile", into = "SnapshotFile")]
pub struct Snapshot {
    pub id: Uuid,
    pub prev_id: Uuid,
    pub version: String,
    pub dialect: String,
    pub enums: BTreeMap<String, EnumSnapshot>,
    pub tables: BTreeMap<String, TableSnapshot>,
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

/// Sections of the file format that are not modelled.
type Unmodelled = BTreeMap<String, Value>;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    id: Uuid,
    prev_id: Uuid,
    version: String,
    dialect: String,
    #[serde(default)]
    tables: BTreeMap<String, TableFile>,
    #[serde(default)]
    enums: BTreeMap<String, EnumSnapshot>,
    #[serde(default)]
    schemas: BTreeMap<String, String>,
    #[serde(default)]
    sequences: Unmodelled,
    #[serde(default)]
    roles: Unmodelled,
    #[serde(default)]
    policies: Unmodelled,
    #[serde(default)]
    views: Unmodelled,
    #[serde(rename = "_meta", default)]
    meta: SnapshotMeta,
}

#[derive(Default, Serialize, Deserialize)]
struct SnapshotMeta {
    #[serde(default)]
    columns: Unmodelled,
    #[serde(default)]
    schemas: Unmodelled,
    #[serde(default)]
    tables: Unmodelled,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableFile {
    name: String,
    /// Empty for the default schema
    #[serde(default)]
    schema: String,
    columns: IndexMap<String, ColumnSnapshot>,
    #[serde(default)]
    indexes: Unmodelled,
    #[serde(default)]
    foreign_keys: BTreeMap<String, ForeignKeySnapshot>,
    #[serde(default)]
    composite_primary_keys: Unmodelled,
    #[serde(default)]
    unique_constraints: BTreeMap<String, UniqueFile>,
    #[serde(default)]
    policies: Unmodelled,
    #[serde(default)]
    check_constraints: Unmodelled,
    #[serde(rename = "isRLSEnabled", default)]
    is_rls_enabled: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UniqueFile {
    name: String,
    #[serde(default)]
    nulls_not_distinct: bool,
    columns: Vec<String>,
}

fn qualified(schema: &str, name: &str) -> String {
    format!("{}.{}", schema, name)
}

impl From<Snapshot> for SnapshotFile {
    fn from(snapshot: Snapshot) -> Self {
        let tables = snapshot
            .tables
            .into_values()
            .map(|table| {
                let key = qualified(&table.schema, &table.name);
                let file = TableFile {
                    schema: if table.schema == DEFAULT_SCHEMA {
                        String::new()
                    } else {
                        table.schema
                    },
                    columns: table.columns.into_iter().map(|c| (c.name.clone(), c)).collect(),
                    foreign_keys: table.foreign_keys,
                    unique_constraints: table
                        .unique_constraints
                        .into_iter()
                        .map(|(key, u)| {
                            let file = UniqueFile {
                                name: u.name,
                                nulls_not_distinct: false,
                                columns: u.columns,
                            };
                            (key, file)
                        })
                        .collect(),
                    name: table.name,
                    indexes: Unmodelled::new(),
                    composite_primary_keys: Unmodelled::new(),
                    policies: Unmodelled::new(),
                    check_constraints: Unmodelled::new(),
                    is_rls_enabled: false,
                };
                (key, file)
            })
            .collect();

        let enums = snapshot
            .enums
            .into_values()
            .map(|e| (qualified(&e.schema, &e.name), e))
            .collect();

        Self {
            id: snapshot.id,
            prev_id: snapshot.prev_id,
            version: snapshot.version,
            dialect: snapshot.dialect,
            tables,
            enums,
            schemas: BTreeMap::new(),
            sequences: Unmodelled::new(),
            roles: Unmodelled::new(),
            policies: Unmodelled::new(),
            views: Unmodelled::new(),
            meta: SnapshotMeta::default(),
        }
    }
}

impl From<SnapshotFile> for Snapshot {
    fn from(file: SnapshotFile) -> Self {
        let tables = file
            .tables
            .into_values()
            .map(|table| {
                let snapshot = TableSnapshot {
                    schema: if table.schema.is_empty() {
                        default_schema()
                    } else {
                        table.schema
                    },
                    columns: table.columns.into_values().collect(),
                    foreign_keys: table.foreign_keys,
                    unique_constraints: table
                        .unique_constraints
                        .into_iter()
                        .map(|(key, u)| {
                            let snapshot = UniqueSnapshot {
                                name: u.name,
                                columns: u.columns,
                            };
                            (key, snapshot)
                        })
                        .collect(),
                    name: table.name,
                };
                (snapshot.name.clone(), snapshot)
            })
            .collect();

        let enums = file
            .enums
            .into_values()
            .map(|e| (e.name.clone(), e))
            .collect();

        Self {
            id: file.id,
            prev_id: file.prev_id,
            version: file.version,
            dialect: file.dialect,
            enums,
            tables,
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&EnumDefinition> for EnumSnapshot {
    fn from(def: &EnumDefinition) -> Self {
        Self {
            name: def.name.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            values: def.values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl From<&SchemaColumn> for ColumnSnapshot {
    fn from(column: &SchemaColumn) -> Self {
        Self {
            name: column.name.to_string(),
            data_type: column.data_type.sql_type(),
            type_schema: column
                .data_type
                .enum_definition()
                .map(|_| DEFAULT_SCHEMA.to_string()),
            primary_key: column.primary_key,
            not_null: column.not_null,
            default: column.default.map(|d| d.sql()),
        }
    }
}

impl From<&TableDefinition> for TableSnapshot {
    fn from(table: &TableDefinition) -> Self {
        let foreign_keys = table
            .foreign_keys
            .iter()
            .map(|fk| {
                let name = fk.constraint_name(table.name);
                let snapshot = ForeignKeySnapshot {
                    name: name.clone(),
                    table_from: table.name.to_string(),
                    columns_from: vec![fk.column.to_string()],
                    table_to: fk.references_table.to_string(),
                    schema_to: DEFAULT_SCHEMA.to_string(),
                    columns_to: vec![fk.references_column.to_string()],
                    on_delete: fk.on_delete.sql().to_string(),
                    on_update: fk.on_update.sql().to_string(),
                };
                (name, snapshot)
            })
            .collect();

        let unique_constraints = table
            .unique_columns()
            .map(|c| {
                let name = table.unique_constraint_name(c.name);
                let snapshot = UniqueSnapshot {
                    name: name.clone(),
                    columns: vec![c.name.to_string()],
                };
                (name, snapshot)
            })
            .collect();

        Self {
            name: table.name.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            columns: table.columns.iter().map(ColumnSnapshot::from).collect(),
            foreign_keys,
            unique_constraints,
        }
    }
}

impl Snapshot {
    /// A snapshot with no tables or enums, the starting point of history.
    pub fn empty() -> Self {
        Self {
            id: Uuid::nil(),
            prev_id: Uuid::nil(),
            version: SNAPSHOT_VERSION.to_string(),
            dialect: DIALECT.to_string(),
            enums: BTreeMap::new(),
            tables: BTreeMap::new(),
        }
    }

    /// Build a snapshot from definitions after validating them.
    pub fn from_definitions(
        tables: &[TableDefinition],
        enums: &[EnumDefinition],
    ) -> Result<Self, SchemaError> {
        validate(tables, enums)?;

        let mut snapshot = Self::empty();
        snapshot.id = Uuid::new_v4();
        for def in enums {
            snapshot.enums.insert(def.name.to_string(), EnumSnapshot::from(def));
        }
        for table in ordered_tables(tables)? {
            snapshot
                .tables
                .insert(table.name.to_string(), TableSnapshot::from(table));
        }
        Ok(snapshot)
    }

    /// Snapshot of the schema declared in this crate.
    pub fn declared() -> Result<Self, SchemaError> {
        Self::from_definitions(ALL_TABLES, ALL_ENUMS)
    }

    /// Give this snapshot a fresh id and link it after `prev`.
    pub fn chained_after(mut self, prev: &Snapshot) -> Self {
        self.id = Uuid::new_v4();
        self.prev_id = prev.id;
        self
    }

    /// Table names with every table after the tables it references.
    pub fn table_order(&self) -> Result<Vec<&str>, SchemaError> {
        topo_order(&self.dependency_nodes())
    }

    /// Like [`table_order`](Snapshot::table_order) for snapshots that may be
    /// cyclic or reference tables they do not contain, as live databases can.
    pub fn loose_table_order(&self) -> Vec<&str> {
        loose_order(&self.dependency_nodes())
    }

    fn dependency_nodes(&self) -> Vec<(&str, Vec<&str>)> {
        self.tables
            .values()
            .map(|t| (t.name.as_str(), t.depends_on().collect()))
            .collect()
    }

    /// True when both snapshots describe the same structure, ignoring ids.
    pub fn same_structure(&self, other: &Snapshot) -> bool {
        self.enums == other.enums && self.tables == other.tables
    }
}
