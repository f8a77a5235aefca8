use crate::columns::{ColumnDescriptor, ColumnFlags, ColumnSet, FixedValue};
use crate::error_handling::ExportError;

use super::escape::escape_json_into;

/// Row-level output policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Leave NULL source values out of the object.
    pub skip_null: bool,
}

/// A fetched row: one nullable value per result field, as the database
/// stored it.
pub type SourceRow = Vec<Option<Vec<u8>>>;

/// Loads `row` into the source columns and appends its JSON object to `out`.
///
/// Keys follow column order. Skipped columns, NULLs (with `skip_null`) and
/// empty strings of `EMPTY_IGNORED` columns are left out. Integer fixed
/// columns advance by their increment after being written.
///
/// # Errors
///
/// [`ExportError::IncrementOverflow`] when an incrementing column already
/// wrote its last representable value. `out` is incomplete in that case.
pub fn serialize_row(
    columns: &mut ColumnSet,
    row: &[Option<Vec<u8>>],
    opts: &SerializeOptions,
    out: &mut String,
) -> Result<(), ExportError> {
    out.push('{');
    let mut first = true;
    for column in columns.iter_mut() {
        if column.is_skipped() {
            continue;
        }
        if column.is_from_source() && !column.is_fixed() {
            let value = column
                .source_ordinal
                .and_then(|ordinal| row.get(ordinal))
                .cloned()
                .flatten();
            column.set_value(value);

            if opts.skip_null && column.flags.contains(ColumnFlags::CURRENTLY_NULL) {
                continue;
            }
            if column.flags.contains(ColumnFlags::EMPTY_IGNORED)
                && column.value.as_ref().is_some_and(|v| v.is_empty())
            {
                continue;
            }
        } else if !column.is_fixed() {
            // rule placeholder the table does not have
            continue;
        }

        if !first {
            out.push(',');
        }
        first = false;
        out.push('"');
        out.push_str(&column.json_name);
        out.push_str("\":");
        render_value(column, out)?;
    }
    out.push('}');
    Ok(())
}

fn push_raw(bytes: &[u8], out: &mut String) {
    out.push_str(&String::from_utf8_lossy(bytes));
}

fn push_string(bytes: &[u8], unquoted: bool, out: &mut String) {
    if unquoted {
        push_raw(bytes, out);
    } else {
        out.push('"');
        escape_json_into(bytes, out);
        out.push('"');
    }
}

fn render_value(column: &mut ColumnDescriptor, out: &mut String) -> Result<(), ExportError> {
    let flags = column.flags;
    let quoted = flags.contains(ColumnFlags::QUOTED);
    let unquoted = flags.contains(ColumnFlags::UNQUOTED);
    let increment = column.increment;

    if let Some(fixed) = column.fixed.as_mut() {
        match fixed {
            FixedValue::Integer(v) => {
                if column.increment_exhausted {
                    return Err(ExportError::IncrementOverflow {
                        column: column.name.clone(),
                        last: *v,
                    });
                }
                if quoted {
                    out.push_str(&format!("\"{}\"", v));
                } else {
                    out.push_str(&v.to_string());
                }
                match v.checked_add(increment) {
                    Some(next) => *v = next,
                    None => column.increment_exhausted = true,
                }
            }
            FixedValue::Decimal(text) => push_string(text.as_bytes(), !quoted, out),
            FixedValue::Text(text) => push_string(text.as_bytes(), unquoted, out),
        }
        return Ok(());
    }

    let bytes = match column.value.as_deref() {
        None => {
            out.push_str("null");
            return Ok(());
        }
        Some(bytes) => bytes,
    };

    if flags.contains(ColumnFlags::BOOLEAN) {
        out.push_str(if bytes == b"0" { "false" } else { "true" });
    } else if quoted || !flags.contains(ColumnFlags::NUMERIC) {
        push_string(bytes, unquoted && !quoted, out);
    } else {
        push_raw(bytes, out);
    }
    Ok(())
}
