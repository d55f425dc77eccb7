//! All table definitions.
//!
//! This module defines the enum type and the 7 tables that form the complete
//! bookstore schema. Database column names are kept exactly as they exist in
//! deployed databases, including the ones whose names do not match their
//! field (`customer.bio`, `publisher.string`, `language.language`).

use super::definition::{
    ColumnDefault, DataType, EnumDefinition, ForeignKey, SchemaColumn, TableDefinition,
};

const NAME: DataType = DataType::Varchar { length: 255 };

/// Role attached to author, customer and admin rows.
pub const USER_ROLE: EnumDefinition = EnumDefinition {
    name: "userRole",
    values: &["AUTHOR", "CUSTOMER", "ADMIN", "NO_ROLE"],
};

/// Author table
///
/// Referenced by: book.author_id
pub const AUTHOR: TableDefinition = TableDefinition {
    name: "author",
    columns: &[
        SchemaColumn::uuid_primary_key("author_id"),
        SchemaColumn::required("name", "name", NAME),
        SchemaColumn::required("age", "age", DataType::Integer),
        SchemaColumn::required("email", "email", NAME).with_unique(),
        SchemaColumn::required("bio", "bio", NAME),
        SchemaColumn::required("password", "password", DataType::Text),
        SchemaColumn::required("userRole", "role", DataType::Enum(&USER_ROLE))
            .with_default(ColumnDefault::EnumValue("AUTHOR")),
    ],
    foreign_keys: &[],
};

/// Customer table
///
/// Referenced by: order.customer_id
pub const CUSTOMER: TableDefinition = TableDefinition {
    name: "customer",
    columns: &[
        SchemaColumn::uuid_primary_key("customer_id"),
        SchemaColumn::required("name", "name", NAME),
        SchemaColumn::required("age", "age", DataType::Integer),
        SchemaColumn::required("email", "email", NAME).with_unique(),
        SchemaColumn::required("bio", "shipping_address", NAME),
        SchemaColumn::required("password", "password", NAME),
        SchemaColumn::required("userRole", "role", DataType::Enum(&USER_ROLE))
            .with_default(ColumnDefault::EnumValue("CUSTOMER")),
    ],
    foreign_keys: &[],
};

/// Admin table
pub const ADMIN: TableDefinition = TableDefinition {
    name: "admin",
    columns: &[
        SchemaColumn::uuid_primary_key("admin_id"),
        SchemaColumn::required("name", "name", NAME),
        SchemaColumn::required("email", "email", NAME).with_unique(),
        SchemaColumn::required("password", "password", NAME),
        SchemaColumn::required("userRole", "role", DataType::Enum(&USER_ROLE))
            .with_default(ColumnDefault::EnumValue("ADMIN")),
    ],
    foreign_keys: &[],
};

/// Publisher table
///
/// Referenced by: book.publisher_id
pub const PUBLISHER: TableDefinition = TableDefinition {
    name: "publisher",
    columns: &[
        SchemaColumn::uuid_primary_key("publisher_id"),
        SchemaColumn::required("name", "name", NAME),
        SchemaColumn::required("string", "website_url", NAME),
    ],
    foreign_keys: &[],
};

/// Language table
///
/// Referenced by: book.language_id
pub const LANGUAGE: TableDefinition = TableDefinition {
    name: "language",
    columns: &[
        SchemaColumn::uuid_primary_key("language_id"),
        SchemaColumn::required("language", "name", NAME),
        SchemaColumn::required("code", "code", NAME),
    ],
    foreign_keys: &[],
};

/// Book table
///
/// References: author, publisher, language (all on delete cascade)
pub const BOOK: TableDefinition = TableDefinition {
    name: "book",
    columns: &[
        SchemaColumn::uuid_primary_key("book_id"),
        SchemaColumn::required("title", "title", NAME),
        SchemaColumn::required("description", "description", DataType::Text),
        SchemaColumn::required("price", "price", DataType::Real),
        SchemaColumn::required("published_date", "published_date", DataType::Timestamp),
        SchemaColumn::required("author_id", "author", DataType::Uuid),
        SchemaColumn::required("publisher_id", "publisher", DataType::Uuid),
        SchemaColumn::required("language_id", "language", DataType::Uuid),
    ],
    foreign_keys: &[
        ForeignKey::cascade_to("author_id", "author"),
        ForeignKey::cascade_to("publisher_id", "publisher"),
        ForeignKey::cascade_to("language_id", "language"),
    ],
};

/// Order table
///
/// References: book, customer (all on delete cascade)
pub const ORDER: TableDefinition = TableDefinition {
    name: "order",
    columns: &[
        SchemaColumn::uuid_primary_key("order_id"),
        SchemaColumn::required("order_date", "order_date", DataType::Timestamp),
        SchemaColumn::required("total_price", "total_price", DataType::Real),
        SchemaColumn::required("book_id", "book", DataType::Uuid),
        SchemaColumn::required("customer_id", "customer", DataType::Uuid),
    ],
    foreign_keys: &[
        ForeignKey::cascade_to("book_id", "book"),
        ForeignKey::cascade_to("customer_id", "customer"),
    ],
};

/// All tables, parents before children.
pub const ALL_TABLES: &[TableDefinition] =
    &[AUTHOR, CUSTOMER, ADMIN, PUBLISHER, LANGUAGE, BOOK, ORDER];

/// All enum types.
pub const ALL_ENUMS: &[EnumDefinition] = &[USER_ROLE];

/// Look up a declared table by name.
pub fn table(name: &str) -> Option<&'static TableDefinition> {
    ALL_TABLES.iter().find(|t| t.name == name)
}
