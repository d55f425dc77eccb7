//! Structural diff between two schema snapshots.
//!
//! `diff(from, to)` lists the changes that turn `from` into `to`, ordered so
//! they can be executed one after another:
//!
//! 1. create enums, add enum values
//! 2. drop foreign keys and unique constraints that change or disappear
//! 3. create tables (dependency order), add and alter columns
//! 4. drop columns, add unique constraints, add foreign keys
//! 5. drop tables (reverse dependency order), drop enums
//!
//! Dependency order tolerates live snapshots: references to tables outside the
//! snapshot are ignored and tables in a cycle fall back to name order.
//!
//! Renames are not detected: a renamed column shows up as drop + add.

use serde::Serialize;

use super::compilers::PostgresCompiler;
use super::snapshot::{
    ColumnSnapshot, EnumSnapshot, ForeignKeySnapshot, Snapshot, TableSnapshot, UniqueSnapshot,
};
use super::SchemaError;

/// One structural change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaChange {
    CreateEnum { definition: EnumSnapshot },
    AddEnumValue { schema: String, name: String, value: String },
    DropEnum { schema: String, name: String },
    CreateTable { table: TableSnapshot },
    DropTable { name: String },
    AddColumn { table: String, column: ColumnSnapshot },
    DropColumn { table: String, column: String },
    AlterColumnType { table: String, column: ColumnSnapshot },
    SetNotNull { table: String, column: String, not_null: bool },
    SetDefault { table: String, column: String, default: Option<String> },
    AddUnique { table: String, constraint: UniqueSnapshot },
    DropUnique { table: String, name: String },
    AddForeignKey { constraint: ForeignKeySnapshot },
    DropForeignKey { table: String, name: String },
}

impl SchemaChange {
    /// True for changes that can lose data or reject existing rows.
    pub fn is_destructive(&self) -> bool {
        match self {
            SchemaChange::DropEnum { .. }
            | SchemaChange::DropTable { .. }
            | SchemaChange::DropColumn { .. }
            | SchemaChange::AlterColumnType { .. }
            | SchemaChange::DropUnique { .. }
            | SchemaChange::DropForeignKey { .. } => true,
            SchemaChange::SetNotNull { not_null, .. } => *not_null,
            _ => false,
        }
    }

    /// Render the change as a single PostgreSQL statement.
    pub fn to_sql(&self) -> String {
        match self {
            SchemaChange::CreateEnum { definition } => PostgresCompiler::compile_enum(definition),
            SchemaChange::AddEnumValue { schema, name, value } => {
                PostgresCompiler::compile_add_enum_value(schema, name, value)
            }
            SchemaChange::DropEnum { schema, name } => PostgresCompiler::compile_drop_enum(schema, name),
            SchemaChange::CreateTable { table } => PostgresCompiler::compile_table(table),
            SchemaChange::DropTable { name } => PostgresCompiler::compile_drop_table(name),
            SchemaChange::AddColumn { table, column } => {
                PostgresCompiler::compile_add_column(table, column)
            }
            SchemaChange::DropColumn { table, column } => {
                PostgresCompiler::compile_drop_column(table, column)
            }
            SchemaChange::AlterColumnType { table, column } => {
                PostgresCompiler::compile_alter_type(table, column)
            }
            SchemaChange::SetNotNull { table, column, not_null } => {
                PostgresCompiler::compile_set_not_null(table, column, *not_null)
            }
            SchemaChange::SetDefault { table, column, default } => {
                PostgresCompiler::compile_set_default(table, column, default.as_deref())
            }
            SchemaChange::AddUnique { table, constraint } => {
                PostgresCompiler::compile_add_unique(table, constraint)
            }
            SchemaChange::DropUnique { table, name } | SchemaChange::DropForeignKey { table, name } => {
                PostgresCompiler::compile_drop_constraint(table, name)
            }
            SchemaChange::AddForeignKey { constraint } => {
                PostgresCompiler::compile_foreign_key(constraint)
            }
        }
    }

    /// One-line human description, used in command output.
    pub fn describe(&self) -> String {
        match self {
            SchemaChange::CreateEnum { definition } => format!("create enum {}", definition.name),
            SchemaChange::AddEnumValue { name, value, .. } => {
                format!("add value {} to enum {}", value, name)
            }
            SchemaChange::DropEnum { name, .. } => format!("drop enum {}", name),
            SchemaChange::CreateTable { table } => format!("create table {}", table.name),
            SchemaChange::DropTable { name } => format!("drop table {}", name),
            SchemaChange::AddColumn { table, column } => {
                format!("add column {}.{}", table, column.name)
            }
            SchemaChange::DropColumn { table, column } => format!("drop column {}.{}", table, column),
            SchemaChange::AlterColumnType { table, column } => format!(
                "change type of {}.{} to {}",
                table, column.name, column.data_type
            ),
            SchemaChange::SetNotNull { table, column, not_null } => format!(
                "{} not null on {}.{}",
                if *not_null { "set" } else { "drop" },
                table,
                column
            ),
            SchemaChange::SetDefault { table, column, default } => match default {
                Some(expr) => format!("set default {} on {}.{}", expr, table, column),
                None => format!("drop default on {}.{}", table, column),
            },
            SchemaChange::AddUnique { table, constraint } => {
                format!("add unique {} on {}", constraint.name, table)
            }
            SchemaChange::DropUnique { table, name } => format!("drop unique {} on {}", name, table),
            SchemaChange::AddForeignKey { constraint } => format!(
                "add foreign key {} on {}",
                constraint.name, constraint.table_from
            ),
            SchemaChange::DropForeignKey { table, name } => {
                format!("drop foreign key {} on {}", name, table)
            }
        }
    }
}

fn diff_enums(from: &Snapshot, to: &Snapshot, changes: &mut Vec<SchemaChange>) -> Result<(), SchemaError> {
    for (name, next) in &to.enums {
        match from.enums.get(name) {
            None => changes.push(SchemaChange::CreateEnum {
                definition: next.clone(),
            }),
            Some(prev) => {
                if let Some(removed) = prev.values.iter().find(|v| !next.values.contains(v)) {
                    return Err(SchemaError::UnsupportedChange {
                        message: format!(
                            "value '{}' removed from enum '{}'; PostgreSQL cannot drop enum values",
                            removed, name
                        ),
                    });
                }
                for value in next.values.iter().filter(|v| !prev.values.contains(v)) {
                    changes.push(SchemaChange::AddEnumValue {
                        schema: next.schema.clone(),
                        name: name.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn diff_columns(
    prev: &TableSnapshot,
    next: &TableSnapshot,
    changes: &mut Vec<SchemaChange>,
    drops: &mut Vec<SchemaChange>,
) -> Result<(), SchemaError> {
    let table = &next.name;

    for column in &next.columns {
        let Some(old) = prev.column(&column.name) else {
            changes.push(SchemaChange::AddColumn {
                table: table.clone(),
                column: column.clone(),
            });
            continue;
        };

        if old.primary_key != column.primary_key {
            return Err(SchemaError::UnsupportedChange {
                message: format!("primary key change on {}.{}", table, column.name),
            });
        }
        if old.data_type != column.data_type || old.type_schema != column.type_schema {
            changes.push(SchemaChange::AlterColumnType {
                table: table.clone(),
                column: column.clone(),
            });
        }
        if old.default != column.default {
            changes.push(SchemaChange::SetDefault {
                table: table.clone(),
                column: column.name.clone(),
                default: column.default.clone(),
            });
        }
        if old.not_null != column.not_null && !column.primary_key {
            changes.push(SchemaChange::SetNotNull {
                table: table.clone(),
                column: column.name.clone(),
                not_null: column.not_null,
            });
        }
    }

    for old in prev.columns.iter().filter(|c| next.column(&c.name).is_none()) {
        drops.push(SchemaChange::DropColumn {
            table: table.clone(),
            column: old.name.clone(),
        });
    }
    Ok(())
}

/// Compute the ordered changes that turn `from` into `to`.
pub fn diff(from: &Snapshot, to: &Snapshot) -> Result<Vec<SchemaChange>, SchemaError> {
    let mut enum_changes = Vec::new();
    diff_enums(from, to, &mut enum_changes)?;

    let mut constraint_drops = Vec::new();
    let mut creates = Vec::new();
    let mut column_changes = Vec::new();
    let mut column_drops = Vec::new();
    let mut unique_adds = Vec::new();
    let mut fk_adds = Vec::new();

    for name in to.loose_table_order() {
        let next = &to.tables[name];
        match from.tables.get(name) {
            None => {
                creates.push(SchemaChange::CreateTable { table: next.clone() });
                fk_adds.extend(next.foreign_keys.values().map(|fk| SchemaChange::AddForeignKey {
                    constraint: fk.clone(),
                }));
            }
            Some(prev) => {
                for (fk_name, fk) in &prev.foreign_keys {
                    if next.foreign_keys.get(fk_name) != Some(fk) {
                        constraint_drops.push(SchemaChange::DropForeignKey {
                            table: name.to_string(),
                            name: fk_name.clone(),
                        });
                    }
                }
                for (u_name, unique) in &prev.unique_constraints {
                    if next.unique_constraints.get(u_name) != Some(unique) {
                        constraint_drops.push(SchemaChange::DropUnique {
                            table: name.to_string(),
                            name: u_name.clone(),
                        });
                    }
                }

                diff_columns(prev, next, &mut column_changes, &mut column_drops)?;

                for (u_name, unique) in &next.unique_constraints {
                    if prev.unique_constraints.get(u_name) != Some(unique) {
                        unique_adds.push(SchemaChange::AddUnique {
                            table: name.to_string(),
                            constraint: unique.clone(),
                        });
                    }
                }
                for (fk_name, fk) in &next.foreign_keys {
                    if prev.foreign_keys.get(fk_name) != Some(fk) {
                        fk_adds.push(SchemaChange::AddForeignKey {
                            constraint: fk.clone(),
                        });
                    }
                }
            }
        }
    }

    let mut table_drops: Vec<SchemaChange> = from
        .loose_table_order()
        .into_iter()
        .rev()
        .filter(|name| !to.tables.contains_key(*name))
        .map(|name| SchemaChange::DropTable {
            name: name.to_string(),
        })
        .collect();

    let enum_drops = from
        .enums
        .values()
        .filter(|e| !to.enums.contains_key(&e.name))
        .map(|e| SchemaChange::DropEnum {
            schema: e.schema.clone(),
            name: e.name.clone(),
        });

    let mut changes = enum_changes;
    changes.append(&mut constraint_drops);
    changes.append(&mut creates);
    changes.append(&mut column_changes);
    changes.append(&mut column_drops);
    changes.append(&mut unique_adds);
    changes.append(&mut fk_adds);
    changes.append(&mut table_drops);
    changes.extend(enum_drops);
    Ok(changes)
}
