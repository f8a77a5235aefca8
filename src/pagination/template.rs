//! Query templates and their placeholders.
//!
//! A template is plain SQL with these placeholders, expanded in one
//! left-to-right pass:
//!
//! | Placeholder | Expands to                                              |
//! |-------------|---------------------------------------------------------|
//! | `%w`        | the cursor predicate and WHERE suffix, joined by `AND`  |
//! | `%W`        | ` WHERE ` followed by `%w`, only when that is non-empty |
//! | `%O`        | `` ORDER BY `col` `` when a batch column is selected   |
//! | `%o`        | `` , `col` `` when a batch column is selected           |
//! | `%%`        | a literal `%`                                           |
//!
//! Any other `%x` is copied unchanged.

use crate::columns::ColumnSet;
use crate::error_handling::ConfigError;

/// Cache bypass hint placed after `SELECT`.
pub const NO_CACHE_HINT: &str = "/*!40001 SQL_NO_CACHE */";

/// Backtick-quotes an identifier, doubling embedded backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Single-quotes a string literal, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Writes a cursor value as an SQL literal.
///
/// Bytes that are not UTF-8 cannot appear in the statement text, so they
/// become a hex blob cast back to text, which compares byte for byte.
pub fn cursor_literal(value: &[u8], quote: bool) -> String {
    match std::str::from_utf8(value) {
        Ok(text) if quote => quote_literal(text),
        Ok(text) => text.to_string(),
        Err(_) => {
            let hex: String = value.iter().map(|b| format!("{:02X}", b)).collect();
            format!("CAST(X'{}' AS TEXT)", hex)
        }
    }
}

/// Position of the keyset cursor for the next batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCursor<'a> {
    /// Batch column source name.
    pub column: &'a str,
    /// Value of the batch column on the last row written, `None` before the
    /// first batch.
    pub last_value: Option<&'a [u8]>,
    /// Whether `last_value` is written as a quoted literal.
    pub quote_value: bool,
}

/// Builds the template for a table-name export:
/// ``SELECT [hint ]`a`,`b` FROM `table`%W%O``.
///
/// Selects every source column that is the batch column or not skipped.
///
/// # Errors
///
/// Returns [`ConfigError::NoColumns`] if no column qualifies.
pub fn build_table_template(
    table: &str,
    columns: &ColumnSet,
    no_cache_hint: bool,
) -> Result<String, ConfigError> {
    let selected: Vec<String> = columns
        .iter()
        .filter(|c| c.is_from_source() && (c.is_batch() || !c.is_skipped()))
        .map(|c| quote_identifier(&c.name))
        .collect();
    if selected.is_empty() {
        return Err(ConfigError::NoColumns(table.to_string()));
    }

    let mut sql = String::from("SELECT ");
    if no_cache_hint {
        sql.push_str(NO_CACHE_HINT);
        sql.push(' ');
    }
    sql.push_str(&selected.join(","));
    sql.push_str(" FROM ");
    sql.push_str(&quote_identifier(table));
    sql.push_str("%W%O");
    Ok(sql)
}

fn predicate(cursor: Option<&BatchCursor<'_>>, where_suffix: Option<&str>) -> String {
    let mut conditions = Vec::with_capacity(2);
    if let Some(BatchCursor {
        column,
        last_value: Some(value),
        quote_value,
    }) = cursor
    {
        conditions.push(format!(
            "{} > {}",
            quote_identifier(column),
            cursor_literal(value, *quote_value)
        ));
    }
    if let Some(suffix) = where_suffix.filter(|s| !s.trim().is_empty()) {
        conditions.push(suffix.to_string());
    }
    conditions.join(" AND ")
}

/// Expands the placeholders of `template` and appends ` LIMIT n` when `limit`
/// is positive.
pub fn materialize(
    template: &str,
    cursor: Option<&BatchCursor<'_>>,
    where_suffix: Option<&str>,
    limit: u64,
) -> String {
    let mut sql = String::with_capacity(template.len() + 64);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            sql.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('w') => {
                chars.next();
                sql.push_str(&predicate(cursor, where_suffix));
            }
            Some('W') => {
                chars.next();
                let p = predicate(cursor, where_suffix);
                if !p.is_empty() {
                    sql.push_str(" WHERE ");
                    sql.push_str(&p);
                }
            }
            Some('O') => {
                chars.next();
                if let Some(cursor) = cursor {
                    sql.push_str(" ORDER BY ");
                    sql.push_str(&quote_identifier(cursor.column));
                }
            }
            Some('o') => {
                chars.next();
                if let Some(cursor) = cursor {
                    sql.push_str(", ");
                    sql.push_str(&quote_identifier(cursor.column));
                }
            }
            Some('%') => {
                chars.next();
                sql.push('%');
            }
            _ => sql.push('%'),
        }
    }

    if limit > 0 {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{ColumnFlags, ColumnSet};

    fn cursor<'a>(last: Option<&'a str>, quote: bool) -> BatchCursor<'a> {
        BatchCursor {
            column: "id",
            last_value: last.map(str::as_bytes),
            quote_value: quote,
        }
    }

    #[test]
    fn test_quote_identifier_doubles_backticks() {
        assert_eq!(quote_identifier("order"), "`order`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_quote_literal_doubles_quotes() {
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn test_cursor_literal_for_invalid_utf8() {
        assert_eq!(cursor_literal(b"it's", true), "'it''s'");
        assert_eq!(cursor_literal(b"42", false), "42");
        assert_eq!(cursor_literal(&[0x61, 0xFF, 0x62], true), "CAST(X'61FF62' AS TEXT)");
    }

    #[test]
    fn test_first_batch_has_no_where() {
        let c = cursor(None, false);
        let sql = materialize("SELECT * FROM `orders`%W%O", Some(&c), None, 2);
        assert_eq!(sql, "SELECT * FROM `orders` ORDER BY `id` LIMIT 2");
    }

    #[test]
    fn test_later_batch_has_cursor_predicate() {
        let c = cursor(Some("2"), false);
        let sql = materialize("SELECT * FROM `orders`%W%O", Some(&c), None, 2);
        assert_eq!(
            sql,
            "SELECT * FROM `orders` WHERE `id` > 2 ORDER BY `id` LIMIT 2"
        );
    }

    #[test]
    fn test_string_cursor_is_quoted_and_joined_with_suffix() {
        let c = cursor(Some("it's"), true);
        let sql = materialize("SELECT * FROM t%W%O", Some(&c), Some("status = 'open'"), 0);
        assert_eq!(
            sql,
            "SELECT * FROM t WHERE `id` > 'it''s' AND status = 'open' ORDER BY `id`"
        );
    }

    #[test]
    fn test_suffix_alone_and_no_batch_column() {
        let sql = materialize("SELECT * FROM t%W%O", None, Some("x = 1"), 0);
        assert_eq!(sql, "SELECT * FROM t WHERE x = 1");
        let sql = materialize("SELECT * FROM t%W%O", None, None, 0);
        assert_eq!(sql, "SELECT * FROM t");
    }

    #[test]
    fn test_lowercase_placeholders_and_escapes() {
        let c = cursor(Some("5"), false);
        let sql = materialize(
            "SELECT * FROM t WHERE name LIKE 'a%%' AND %w ORDER BY x%o",
            Some(&c),
            None,
            10,
        );
        assert_eq!(
            sql,
            "SELECT * FROM t WHERE name LIKE 'a%' AND `id` > 5 ORDER BY x, `id` LIMIT 10"
        );
    }

    #[test]
    fn test_unknown_placeholder_copied() {
        let sql = materialize("SELECT '%d', 100%", None, None, 0);
        assert_eq!(sql, "SELECT '%d', 100%");
    }

    #[test]
    fn test_table_template_selection() {
        let mut columns = ColumnSet::new();
        columns.annotate("id", ColumnFlags::FROM_SOURCE | ColumnFlags::BATCH | ColumnFlags::SKIP);
        columns.annotate("cust", ColumnFlags::FROM_SOURCE);
        columns.annotate("secret", ColumnFlags::FROM_SOURCE | ColumnFlags::SKIP);
        columns.annotate("fixed_only", ColumnFlags::FIXED);

        let sql = build_table_template("orders", &columns, true).expect("columns selected");
        assert_eq!(
            sql,
            "SELECT /*!40001 SQL_NO_CACHE */ `id`,`cust` FROM `orders`%W%O"
        );
        let sql = build_table_template("orders", &columns, false).expect("columns selected");
        assert_eq!(sql, "SELECT `id`,`cust` FROM `orders`%W%O");
    }

    #[test]
    fn test_table_template_without_columns() {
        let mut columns = ColumnSet::new();
        columns.annotate("secret", ColumnFlags::FROM_SOURCE | ColumnFlags::SKIP);
        assert_eq!(
            build_table_template("t", &columns, false),
            Err(ConfigError::NoColumns("t".into()))
        );
    }
}
