//! Typed row records for the bookstore tables.
//!
//! One plain struct per table with fields named after the logical field, not
//! the database column (`Customer::shipping_address` reads column `bio`).
//! Relationships are not navigable from here; see `db::schema::relations`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use postgres::Row;
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::escape::quote_ident;
use crate::db::schema::{TableDefinition, ADMIN, AUTHOR, BOOK, CUSTOMER, LANGUAGE, ORDER, PUBLISHER};

/// The `"userRole"` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSql, FromSql)]
#[postgres(name = "userRole")]
pub enum UserRole {
    #[postgres(name = "AUTHOR")]
    #[serde(rename = "AUTHOR")]
    Author,
    #[postgres(name = "CUSTOMER")]
    #[serde(rename = "CUSTOMER")]
    Customer,
    #[postgres(name = "ADMIN")]
    #[serde(rename = "ADMIN")]
    Admin,
    #[postgres(name = "NO_ROLE")]
    #[serde(rename = "NO_ROLE")]
    NoRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a userRole value")]
pub struct UnknownRole(pub String);

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::Author,
        UserRole::Customer,
        UserRole::Admin,
        UserRole::NoRole,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Author => "AUTHOR",
            UserRole::Customer => "CUSTOMER",
            UserRole::Admin => "ADMIN",
            UserRole::NoRole => "NO_ROLE",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// A record stored in one of the declared tables.
pub trait Entity: Sized {
    const TABLE: &'static TableDefinition;

    /// Decode a row selected with `select_sql()`.
    fn from_row(row: &Row) -> Result<Self, postgres::Error>;

    /// `SELECT` of every column, in definition order.
    fn select_sql() -> String {
        let columns = Self::TABLE
            .columns
            .iter()
            .map(|c| quote_ident(c.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("SELECT {} FROM {}", columns, quote_ident(Self::TABLE.name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub email: String,
    pub bio: String,
    pub password: String,
    pub role: UserRole,
}

impl Entity for Author {
    const TABLE: &'static TableDefinition = &AUTHOR;

    fn from_row(row: &Row) -> Result<Self, postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            age: row.try_get("age")?,
            email: row.try_get("email")?,
            bio: row.try_get("bio")?,
            password: row.try_get("password")?,
            role: row.try_get("userRole")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub email: String,
    pub shipping_address: String,
    pub password: String,
    pub role: UserRole,
}

impl Entity for Customer {
    const TABLE: &'static TableDefinition = &CUSTOMER;

    fn from_row(row: &Row) -> Result<Self, postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            age: row.try_get("age")?,
            email: row.try_get("email")?,
            shipping_address: row.try_get("bio")?,
            password: row.try_get("password")?,
            role: row.try_get("userRole")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl Entity for Admin {
    const TABLE: &'static TableDefinition = &ADMIN;

    fn from_row(row: &Row) -> Result<Self, postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            role: row.try_get("userRole")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: Uuid,
    pub name: String,
    pub website_url: String,
}

impl Entity for Publisher {
    const TABLE: &'static TableDefinition = &PUBLISHER;

    fn from_row(row: &Row) -> Result<Self, postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            website_url: row.try_get("string")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}

impl Entity for Language {
    const TABLE: &'static TableDefinition = &LANGUAGE;

    fn from_row(row: &Row) -> Result<Self, postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("language")?,
            code: row.try_get("code")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Single precision, as stored
    pub price: f32,
    pub published_date: NaiveDateTime,
    pub author_id: Uuid,
    pub publisher_id: Uuid,
    pub language_id: Uuid,
}

impl Entity for Book {
    const TABLE: &'static TableDefinition = &BOOK;

    fn from_row(row: &Row) -> Result<Self, postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            published_date: row.try_get("published_date")?,
            author_id: row.try_get("author_id")?,
            publisher_id: row.try_get("publisher_id")?,
            language_id: row.try_get("language_id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_date: NaiveDateTime,
    pub total_price: f32,
    pub book_id: Uuid,
    pub customer_id: Uuid,
}

impl Entity for Order {
    const TABLE: &'static TableDefinition = &ORDER;

    fn from_row(row: &Row) -> Result<Self, postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            order_date: row.try_get("order_date")?,
            total_price: row.try_get("total_price")?,
            book_id: row.try_get("book_id")?,
            customer_id: row.try_get("customer_id")?,
        })
    }
}
