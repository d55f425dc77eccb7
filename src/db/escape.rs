//! Identifier and literal quoting for generated PostgreSQL statements.

/// Escape a string for use inside a single-quoted SQL literal.
///
/// Doubles every single quote; PostgreSQL standard-conforming strings need
/// nothing else.
pub fn escape_literal(s: &str) -> String {
    s.replace('\'', "''")
}

/// Quote an identifier with double quotes, doubling embedded quotes.
///
/// Every identifier is quoted unconditionally so mixed-case names such as
/// `userRole` and reserved words such as `order` keep their exact spelling.
pub fn quote_ident(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        if c == '"' {
            result.push('"');
        }
        result.push(c);
    }
    result.push('"');
    result
}

/// Quote a schema-qualified name: `"schema"."name"`.
pub fn quote_qualified(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}
