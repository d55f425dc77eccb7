//! Structural checks and dependency ordering for table definitions.

use std::collections::{BTreeSet, HashMap};

use super::definition::{ColumnDefault, EnumDefinition, TableDefinition};
use super::SchemaError;

/// Order named nodes so every node comes after the nodes it depends on.
///
/// Ties keep input order. Self-dependencies are ignored. A dependency on a
/// name outside `nodes` or a dependency cycle is an error.
pub fn topo_order<'a>(nodes: &[(&'a str, Vec<&'a str>)]) -> Result<Vec<&'a str>, SchemaError> {
    let index: HashMap<&str, usize> = nodes.iter().enumerate().map(|(i, (n, _))| (*n, i)).collect();

    let mut pending: Vec<BTreeSet<usize>> = Vec::with_capacity(nodes.len());
    for (name, deps) in nodes {
        let mut resolved = BTreeSet::new();
        for dep in deps.iter().filter(|d| *d != name) {
            let i = index.get(dep).ok_or_else(|| SchemaError::UnknownTable {
                name: dep.to_string(),
            })?;
            resolved.insert(*i);
        }
        pending.push(resolved);
    }

    let mut placed = vec![false; nodes.len()];
    let mut ordered = Vec::with_capacity(nodes.len());

    while ordered.len() < nodes.len() {
        let next = (0..nodes.len()).find(|&i| !placed[i] && pending[i].iter().all(|d| placed[*d]));

        match next {
            Some(i) => {
                placed[i] = true;
                ordered.push(nodes[i].0);
            }
            None => {
                let stuck = (0..nodes.len())
                    .filter(|&i| !placed[i])
                    .map(|i| nodes[i].0.to_string())
                    .collect();
                return Err(SchemaError::DependencyCycle { tables: stuck });
            }
        }
    }

    Ok(ordered)
}

/// Like [`topo_order`] but never fails.
///
/// Dependencies on names outside `nodes` are ignored, and nodes caught in a
/// cycle are appended in input order once nothing else can be placed.
pub fn loose_order<'a>(nodes: &[(&'a str, Vec<&'a str>)]) -> Vec<&'a str> {
    let known: BTreeSet<&str> = nodes.iter().map(|(n, _)| *n).collect();
    let mut placed: BTreeSet<&str> = BTreeSet::new();
    let mut ordered = Vec::with_capacity(nodes.len());

    while ordered.len() < nodes.len() {
        let ready = nodes.iter().find(|(name, deps)| {
            !placed.contains(name)
                && deps
                    .iter()
                    .all(|d| d == name || !known.contains(d) || placed.contains(d))
        });
        let (name, _) = match ready {
            Some(node) => node,
            None => match nodes.iter().find(|(name, _)| !placed.contains(name)) {
                Some(node) => node,
                None => break,
            },
        };
        placed.insert(*name);
        ordered.push(*name);
    }

    ordered
}

/// Order tables so every table comes after the tables it references.
pub fn ordered_tables(tables: &[TableDefinition]) -> Result<Vec<&TableDefinition>, SchemaError> {
    let nodes: Vec<(&str, Vec<&str>)> = tables
        .iter()
        .map(|t| (t.name, t.depends_on().collect()))
        .collect();

    let order = topo_order(&nodes)?;
    Ok(order
        .into_iter()
        .filter_map(|name| tables.iter().find(|t| t.name == name))
        .collect())
}

/// Check a set of definitions for internal consistency.
///
/// - table names are unique, column names are unique per table
/// - every table has exactly one primary key column
/// - every foreign key points at an existing column of the same type
/// - every enum column uses a declared enum and its default is a member
pub fn validate(tables: &[TableDefinition], enums: &[EnumDefinition]) -> Result<(), SchemaError> {
    let mut seen_tables = BTreeSet::new();
    for table in tables {
        if !seen_tables.insert(table.name) {
            return Err(SchemaError::Duplicate {
                kind: "table",
                name: table.name.to_string(),
            });
        }

        let mut seen_columns = BTreeSet::new();
        for column in table.columns {
            if !seen_columns.insert(column.name) {
                return Err(SchemaError::Duplicate {
                    kind: "column",
                    name: format!("{}.{}", table.name, column.name),
                });
            }
        }

        let pk_count = table.primary_key().count();
        if pk_count != 1 {
            return Err(SchemaError::PrimaryKey {
                table: table.name.to_string(),
                count: pk_count,
            });
        }

        for column in table.columns {
            let Some(def) = column.data_type.enum_definition() else {
                continue;
            };
            if !enums.iter().any(|e| e.name == def.name) {
                return Err(SchemaError::UnknownEnum {
                    name: def.name.to_string(),
                });
            }
            if let Some(ColumnDefault::EnumValue(value)) = column.default {
                if !def.contains(value) {
                    return Err(SchemaError::InvalidDefault {
                        table: table.name.to_string(),
                        column: column.name.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }

        for fk in table.foreign_keys {
            let local = table.column(fk.column).ok_or_else(|| SchemaError::UnknownColumn {
                table: table.name.to_string(),
                column: fk.column.to_string(),
            })?;
            let target = tables
                .iter()
                .find(|t| t.name == fk.references_table)
                .ok_or_else(|| SchemaError::UnknownTable {
                    name: fk.references_table.to_string(),
                })?;
            let remote = target
                .column(fk.references_column)
                .ok_or_else(|| SchemaError::UnknownColumn {
                    table: target.name.to_string(),
                    column: fk.references_column.to_string(),
                })?;
            if local.data_type != remote.data_type {
                return Err(SchemaError::ForeignKeyType {
                    constraint: fk.constraint_name(table.name),
                    local: local.data_type.sql_type(),
                    remote: remote.data_type.sql_type(),
                });
            }
        }
    }

    ordered_tables(tables)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::definition::{DataType, ForeignKey, SchemaColumn};
    use crate::db::schema::tables::{ALL_ENUMS, ALL_TABLES, USER_ROLE};
    use rstest::rstest;

    fn names(tables: Vec<&TableDefinition>) -> Vec<&'static str> {
        tables.into_iter().map(|t| t.name).collect()
    }

    #[rstest]
    fn test_declared_schema_is_valid() {
        validate(ALL_TABLES, ALL_ENUMS).unwrap();
    }

    #[rstest]
    fn test_ordered_tables_parents_first() {
        let reversed: Vec<TableDefinition> = ALL_TABLES.iter().rev().copied().collect();
        let ordered = names(ordered_tables(&reversed).unwrap());

        let pos = |name: &str| ordered.iter().position(|n| *n == name).unwrap();
        assert!(pos("author") < pos("book"));
        assert!(pos("publisher") < pos("book"));
        assert!(pos("language") < pos("book"));
        assert!(pos("book") < pos("order"));
        assert!(pos("customer") < pos("order"));
        assert_eq!(ordered.len(), 7);
    }

    #[rstest]
    fn test_ordered_tables_keeps_declaration_order_for_leaves() {
        let ordered = names(ordered_tables(ALL_TABLES).unwrap());
        assert_eq!(
            ordered,
            vec!["author", "customer", "admin", "publisher", "language", "book", "order"]
        );
    }

    const ID: SchemaColumn = SchemaColumn::uuid_primary_key("id");

    #[rstest]
    fn test_ordered_tables_rejects_cycle() {
        const A: TableDefinition = TableDefinition {
            name: "a",
            columns: &[ID, SchemaColumn::required("b_id", "b", DataType::Uuid)],
            foreign_keys: &[ForeignKey::cascade_to("b_id", "b")],
        };
        const B: TableDefinition = TableDefinition {
            name: "b",
            columns: &[ID, SchemaColumn::required("a_id", "a", DataType::Uuid)],
            foreign_keys: &[ForeignKey::cascade_to("a_id", "a")],
        };
        let err = ordered_tables(&[A, B]).unwrap_err();
        match err {
            SchemaError::DependencyCycle { tables } => assert_eq!(tables, vec!["a", "b"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    fn test_loose_order_tolerates_cycles_and_outside_references() {
        let nodes = vec![
            ("a", vec!["b"]),
            ("b", vec!["a"]),
            ("c", vec!["elsewhere"]),
            ("d", vec!["c", "d"]),
        ];
        assert_eq!(loose_order(&nodes), vec!["c", "d", "a", "b"]);
    }

    #[rstest]
    fn test_loose_order_matches_topo_order_when_acyclic() {
        let nodes = vec![("order", vec!["book"]), ("book", vec!["author"]), ("author", vec![])];
        assert_eq!(loose_order(&nodes), topo_order(&nodes).unwrap());
    }

    #[rstest]
    fn test_validate_rejects_missing_reference() {
        const ORPHAN: TableDefinition = TableDefinition {
            name: "orphan",
            columns: &[ID, SchemaColumn::required("ghost_id", "ghost", DataType::Uuid)],
            foreign_keys: &[ForeignKey::cascade_to("ghost_id", "ghost")],
        };
        assert!(matches!(
            validate(&[ORPHAN], &[]),
            Err(SchemaError::UnknownTable { .. })
        ));
    }

    #[rstest]
    fn test_validate_rejects_fk_type_mismatch() {
        const PARENT: TableDefinition = TableDefinition {
            name: "parent",
            columns: &[ID],
            foreign_keys: &[],
        };
        const CHILD: TableDefinition = TableDefinition {
            name: "child",
            columns: &[ID, SchemaColumn::required("parent_id", "parent", DataType::Integer)],
            foreign_keys: &[ForeignKey::cascade_to("parent_id", "parent")],
        };
        assert!(matches!(
            validate(&[PARENT, CHILD], &[]),
            Err(SchemaError::ForeignKeyType { .. })
        ));
    }

    #[rstest]
    fn test_validate_rejects_bad_enum_default() {
        const TABLE: TableDefinition = TableDefinition {
            name: "member",
            columns: &[
                ID,
                SchemaColumn::required("role", "role", DataType::Enum(&USER_ROLE))
                    .with_default(ColumnDefault::EnumValue("OWNER")),
            ],
            foreign_keys: &[],
        };
        assert!(matches!(
            validate(&[TABLE], &[USER_ROLE]),
            Err(SchemaError::InvalidDefault { .. })
        ));
    }

    #[rstest]
    fn test_validate_rejects_undeclared_enum() {
        const TABLE: TableDefinition = TableDefinition {
            name: "member",
            columns: &[ID, SchemaColumn::required("role", "role", DataType::Enum(&USER_ROLE))],
            foreign_keys: &[],
        };
        assert!(matches!(
            validate(&[TABLE], &[]),
            Err(SchemaError::UnknownEnum { .. })
        ));
    }

    #[rstest]
    fn test_validate_rejects_missing_primary_key() {
        const TABLE: TableDefinition = TableDefinition {
            name: "loose",
            columns: &[SchemaColumn::required("name", "name", DataType::Text)],
            foreign_keys: &[],
        };
        assert!(matches!(
            validate(&[TABLE], &[]),
            Err(SchemaError::PrimaryKey { count: 0, .. })
        ));
    }

    #[rstest]
    fn test_validate_rejects_duplicate_table() {
        const T: TableDefinition = TableDefinition {
            name: "twin",
            columns: &[ID],
            foreign_keys: &[],
        };
        assert!(matches!(
            validate(&[T, T], &[]),
            Err(SchemaError::Duplicate { kind: "table", .. })
        ));
    }
}
