//! Relationship metadata.
//!
//! Declares how tables associate for query-building tooling. None of this is
//! enforced by the database: a "one" relation whose foreign key lives on the
//! other table is many-to-one in practice (an author can have many books).
//! The metadata is kept as plain data, separate from the table definitions.

use super::definition::TableDefinition;
use super::tables;
use super::SchemaError;

/// Cardinality declared by a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    One,
}

/// A named association from one table to another.
///
/// When `fields` is empty the relation is the inverse side: the foreign key
/// lives on `target` and is found by [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Table the relation is declared on
    pub source: &'static str,

    /// Relation name (e.g., "book", "author")
    pub name: &'static str,

    pub kind: RelationKind,

    /// Related table
    pub target: &'static str,

    /// Field names on `source` holding the reference
    pub fields: &'static [&'static str],

    /// Field names on `target` being referenced
    pub references: &'static [&'static str],
}

/// Concrete join columns for a relation, as database column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinColumns {
    pub source_table: &'static str,
    pub source_columns: Vec<&'static str>,
    pub target_table: &'static str,
    pub target_columns: Vec<&'static str>,
}

const fn inverse(source: &'static str, name: &'static str, target: &'static str) -> Relation {
    Relation {
        source,
        name,
        kind: RelationKind::One,
        target,
        fields: &[],
        references: &[],
    }
}

const fn owning(
    source: &'static str,
    name: &'static str,
    target: &'static str,
    fields: &'static [&'static str],
    references: &'static [&'static str],
) -> Relation {
    Relation {
        source,
        name,
        kind: RelationKind::One,
        target,
        fields,
        references,
    }
}

/// Every declared relation. The admin table declares none.
pub const ALL_RELATIONS: &[Relation] = &[
    inverse("author", "book", "book"),
    inverse("customer", "order", "order"),
    inverse("publisher", "book", "book"),
    inverse("language", "book", "book"),
    owning("book", "author", "author", &["author"], &["author_id"]),
    owning("book", "publisher", "publisher", &["publisher"], &["publisher_id"]),
    owning("book", "language", "language", &["language"], &["language_id"]),
    inverse("book", "order", "order"),
    owning("order", "book", "book", &["book"], &["book_id"]),
    owning("order", "customer", "customer", &["customer"], &["customer_id"]),
];

/// Relations declared on `table`.
pub fn relations_for(table: &str) -> impl Iterator<Item = &'static Relation> + '_ {
    ALL_RELATIONS.iter().filter(move |r| r.source == table)
}

fn lookup(name: &str) -> Result<&'static TableDefinition, SchemaError> {
    tables::table(name).ok_or_else(|| SchemaError::UnknownTable {
        name: name.to_string(),
    })
}

fn field_to_column(
    table: &'static TableDefinition,
    field: &str,
) -> Result<&'static str, SchemaError> {
    table
        .field(field)
        .map(|c| c.name)
        .ok_or_else(|| SchemaError::UnknownColumn {
            table: table.name.to_string(),
            column: field.to_string(),
        })
}

/// Resolve a relation to the columns that join the two tables.
///
/// Owning relations map their declared fields to column names. Inverse
/// relations look for the single foreign key on the target that points back
/// at the source; none or several is an error.
pub fn resolve(relation: &Relation) -> Result<JoinColumns, SchemaError> {
    let source = lookup(relation.source)?;
    let target = lookup(relation.target)?;

    if !relation.fields.is_empty() {
        if relation.fields.len() != relation.references.len() {
            return Err(SchemaError::InvalidRelation {
                table: relation.source.to_string(),
                relation: relation.name.to_string(),
                message: "fields and references differ in length".to_string(),
            });
        }

        let source_columns = relation
            .fields
            .iter()
            .map(|f| field_to_column(source, f))
            .collect::<Result<Vec<_>, _>>()?;
        let target_columns = relation
            .references
            .iter()
            .map(|f| field_to_column(target, f))
            .collect::<Result<Vec<_>, _>>()?;

        return Ok(JoinColumns {
            source_table: source.name,
            source_columns,
            target_table: target.name,
            target_columns,
        });
    }

    let back_refs: Vec<_> = target
        .foreign_keys
        .iter()
        .filter(|fk| fk.references_table == source.name)
        .collect();

    match back_refs.as_slice() {
        [fk] => Ok(JoinColumns {
            source_table: source.name,
            source_columns: vec![fk.references_column],
            target_table: target.name,
            target_columns: vec![fk.column],
        }),
        [] => Err(SchemaError::InvalidRelation {
            table: relation.source.to_string(),
            relation: relation.name.to_string(),
            message: format!("no foreign key on {} references {}", target.name, source.name),
        }),
        _ => Err(SchemaError::InvalidRelation {
            table: relation.source.to_string(),
            relation: relation.name.to_string(),
            message: format!(
                "{} has several foreign keys to {}; declare fields explicitly",
                target.name, source.name
            ),
        }),
    }
}

/// Resolve every declared relation, failing on the first bad one.
pub fn validate_relations() -> Result<Vec<JoinColumns>, SchemaError> {
    ALL_RELATIONS.iter().map(resolve).collect()
}
