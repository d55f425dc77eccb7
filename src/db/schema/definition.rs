//! Core schema definition types.
//!
//! Provides a declarative type system for describing the relational schema.
//! These types are plain data: the compiler, the snapshot builder and the
//! validator all read them, none of them carry behaviour of their own beyond
//! small lookups.

/// A named PostgreSQL enumerated type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumDefinition {
    /// Type name as created in the database (e.g., "userRole")
    pub name: &'static str,

    /// Allowed values, in declaration order
    pub values: &'static [&'static str],
}

impl EnumDefinition {
    /// Returns true if `value` is one of the declared members.
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(&value)
    }
}

/// Represents a column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 128-bit identifier
    Uuid,
    /// Bounded text, enforced by the database
    Varchar { length: u32 },
    /// Unbounded text
    Text,
    /// 32-bit integer
    Integer,
    /// Single-precision float (`real`). Prices use this, not `numeric`.
    Real,
    /// Date and time without time zone
    Timestamp,
    /// Column restricted to the values of a declared enum
    Enum(&'static EnumDefinition),
}

impl DataType {
    /// Returns the PostgreSQL type name, unquoted.
    ///
    /// This is the canonical form stored in snapshots and compared by the diff.
    pub fn sql_type(&self) -> String {
        match self {
            DataType::Uuid => "uuid".to_string(),
            DataType::Varchar { length } => format!("varchar({})", length),
            DataType::Text => "text".to_string(),
            DataType::Integer => "integer".to_string(),
            DataType::Real => "real".to_string(),
            DataType::Timestamp => "timestamp".to_string(),
            DataType::Enum(def) => def.name.to_string(),
        }
    }

    /// Returns the enum definition backing this type, if any.
    pub fn enum_definition(&self) -> Option<&'static EnumDefinition> {
        match self {
            DataType::Enum(def) => Some(*def),
            _ => None,
        }
    }
}

/// Default value expression for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    /// `gen_random_uuid()`
    RandomUuid,
    /// A member of the column's enum type
    EnumValue(&'static str),
}

impl ColumnDefault {
    /// Render the default as a SQL expression.
    pub fn sql(&self) -> String {
        match self {
            ColumnDefault::RandomUuid => "gen_random_uuid()".to_string(),
            ColumnDefault::EnumValue(value) => {
                format!("'{}'", crate::db::escape::escape_literal(value))
            }
        }
    }
}

/// Represents a column in a table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaColumn {
    /// Column name in the database (e.g., "id", "userRole")
    pub name: &'static str,

    /// Field name on the row record (e.g., "author_id", "role")
    pub field: &'static str,

    /// Column data type
    pub data_type: DataType,

    /// NOT NULL constraint
    pub not_null: bool,

    /// Single-column UNIQUE constraint
    pub unique: bool,

    /// Part of the primary key
    pub primary_key: bool,

    /// Default value (if any). None means no default.
    pub default: Option<ColumnDefault>,
}

impl SchemaColumn {
    /// A non-null column with no default and no constraints.
    pub const fn required(name: &'static str, field: &'static str, data_type: DataType) -> Self {
        Self {
            name,
            field,
            data_type,
            not_null: true,
            unique: false,
            primary_key: false,
            default: None,
        }
    }

    /// A uuid primary key generated by the database when omitted.
    pub const fn uuid_primary_key(field: &'static str) -> Self {
        Self {
            name: "id",
            field,
            data_type: DataType::Uuid,
            not_null: true,
            unique: false,
            primary_key: true,
            default: Some(ColumnDefault::RandomUuid),
        }
    }

    pub const fn with_unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn with_default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }
}

/// Action taken on dependent rows when the referenced row changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    Cascade,
    Restrict,
    #[default]
    NoAction,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    /// SQL spelling, lowercase as emitted in migration files.
    pub fn sql(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "cascade",
            ReferentialAction::Restrict => "restrict",
            ReferentialAction::NoAction => "no action",
            ReferentialAction::SetNull => "set null",
            ReferentialAction::SetDefault => "set default",
        }
    }

    /// Parse the spelling used by `information_schema` ("CASCADE", "NO ACTION", ...).
    pub fn parse(rule: &str) -> Option<Self> {
        match rule.to_ascii_lowercase().as_str() {
            "cascade" => Some(ReferentialAction::Cascade),
            "restrict" => Some(ReferentialAction::Restrict),
            "no action" => Some(ReferentialAction::NoAction),
            "set null" => Some(ReferentialAction::SetNull),
            "set default" => Some(ReferentialAction::SetDefault),
            _ => None,
        }
    }
}

/// A single-column foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Local column name
    pub column: &'static str,

    /// Referenced table name
    pub references_table: &'static str,

    /// Referenced column name
    pub references_column: &'static str,

    pub on_delete: ReferentialAction,

    pub on_update: ReferentialAction,
}

impl ForeignKey {
    /// A foreign key to `table.id` that cascades on delete.
    pub const fn cascade_to(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: "id",
            on_delete: ReferentialAction::Cascade,
            on_update: ReferentialAction::NoAction,
        }
    }

    /// Constraint name: `<table>_<column>_<ref table>_<ref column>_fk`.
    pub fn constraint_name(&self, table: &str) -> String {
        format!(
            "{}_{}_{}_{}_fk",
            table, self.column, self.references_table, self.references_column
        )
    }
}

/// Represents a complete database table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDefinition {
    /// Table name (e.g., "author", "order")
    pub name: &'static str,

    /// Columns in declaration order
    pub columns: &'static [SchemaColumn],

    /// Outgoing foreign keys
    pub foreign_keys: &'static [ForeignKey],
}

impl TableDefinition {
    /// Look up a column by its database name.
    pub fn column(&self, name: &str) -> Option<&SchemaColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column by its row-record field name.
    pub fn field(&self, field: &str) -> Option<&SchemaColumn> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Returns the primary key columns.
    pub fn primary_key(&self) -> impl Iterator<Item = &SchemaColumn> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    /// Returns the columns carrying a single-column UNIQUE constraint.
    pub fn unique_columns(&self) -> impl Iterator<Item = &SchemaColumn> {
        self.columns.iter().filter(|c| c.unique)
    }

    /// Constraint name for a unique column: `<table>_<column>_unique`.
    pub fn unique_constraint_name(&self, column: &str) -> String {
        format!("{}_{}_unique", self.name, column)
    }

    /// Names of the other tables this table references.
    pub fn depends_on(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .filter(move |t| *t != self.name)
    }

    /// Returns the foreign key declared on `column`, if any.
    pub fn foreign_key_for(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }

    /// Enum types used by this table's columns.
    pub fn enums(&self) -> impl Iterator<Item = &'static EnumDefinition> + '_ {
        self.columns.iter().filter_map(|c| c.data_type.enum_definition())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const COLORS: EnumDefinition = EnumDefinition {
        name: "color",
        values: &["RED", "GREEN"],
    };

    const WIDGET: TableDefinition = TableDefinition {
        name: "widget",
        columns: &[
            SchemaColumn::uuid_primary_key("widget_id"),
            SchemaColumn::required("label", "label", DataType::Varchar { length: 40 }).with_unique(),
            SchemaColumn::required("color", "color", DataType::Enum(&COLORS))
                .with_default(ColumnDefault::EnumValue("RED")),
            SchemaColumn::required("parent_id", "parent", DataType::Uuid),
            SchemaColumn::required("owner_id", "owner", DataType::Uuid),
        ],
        foreign_keys: &[
            ForeignKey::cascade_to("parent_id", "widget"),
            ForeignKey::cascade_to("owner_id", "owner"),
        ],
    };

    #[rstest]
    #[case(DataType::Uuid, "uuid")]
    #[case(DataType::Varchar { length: 255 }, "varchar(255)")]
    #[case(DataType::Text, "text")]
    #[case(DataType::Integer, "integer")]
    #[case(DataType::Real, "real")]
    #[case(DataType::Timestamp, "timestamp")]
    #[case(DataType::Enum(&COLORS), "color")]
    fn test_sql_type(#[case] data_type: DataType, #[case] expected: &str) {
        assert_eq!(data_type.sql_type(), expected);
    }

    #[rstest]
    fn test_default_sql() {
        assert_eq!(ColumnDefault::RandomUuid.sql(), "gen_random_uuid()");
        assert_eq!(ColumnDefault::EnumValue("RED").sql(), "'RED'");
        assert_eq!(ColumnDefault::EnumValue("it's").sql(), "'it''s'");
    }

    #[rstest]
    fn test_enum_contains() {
        assert!(COLORS.contains("RED"));
        assert!(!COLORS.contains("red"));
        assert!(!COLORS.contains("BLUE"));
    }

    #[rstest]
    #[case("CASCADE", ReferentialAction::Cascade)]
    #[case("NO ACTION", ReferentialAction::NoAction)]
    #[case("set null", ReferentialAction::SetNull)]
    #[case("SET DEFAULT", ReferentialAction::SetDefault)]
    #[case("RESTRICT", ReferentialAction::Restrict)]
    fn test_referential_action_parse(#[case] rule: &str, #[case] expected: ReferentialAction) {
        assert_eq!(ReferentialAction::parse(rule), Some(expected));
        assert_eq!(ReferentialAction::parse(expected.sql()), Some(expected));
    }

    #[rstest]
    fn test_referential_action_unknown() {
        assert_eq!(ReferentialAction::parse("explode"), None);
    }

    #[rstest]
    fn test_table_lookups() {
        assert_eq!(WIDGET.column("color").map(|c| c.field), Some("color"));
        assert_eq!(WIDGET.field("widget_id").map(|c| c.name), Some("id"));
        assert!(WIDGET.column("missing").is_none());

        let pk: Vec<_> = WIDGET.primary_key().map(|c| c.name).collect();
        assert_eq!(pk, vec!["id"]);

        let unique: Vec<_> = WIDGET.unique_columns().map(|c| c.name).collect();
        assert_eq!(unique, vec!["label"]);
        assert_eq!(WIDGET.unique_constraint_name("label"), "widget_label_unique");
    }

    #[rstest]
    fn test_depends_on_skips_self_reference() {
        let deps: Vec<_> = WIDGET.depends_on().collect();
        assert_eq!(deps, vec!["owner"]);
    }

    #[rstest]
    fn test_foreign_key_constraint_name() {
        let fk = WIDGET.foreign_key_for("owner_id").unwrap();
        assert_eq!(fk.constraint_name("widget"), "widget_owner_id_owner_id_fk");
        assert_eq!(fk.on_delete, ReferentialAction::Cascade);
        assert_eq!(fk.on_update, ReferentialAction::NoAction);
    }

    #[rstest]
    fn test_table_enums() {
        let enums: Vec<_> = WIDGET.enums().map(|e| e.name).collect();
        assert_eq!(enums, vec!["color"]);
    }
}
