use log::debug;

use super::types::{FieldMeta, FieldType};
use crate::columns::{ColumnFlags, ColumnSet};

/// Options affecting how result fields map to column flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Treat width-1 tiny integers as booleans.
    pub tiny1_as_bool: bool,
    /// Mark string columns so empty values are left out of the output.
    pub skip_empty: bool,
}

/// Merges result-field metadata into `columns`.
///
/// Unknown fields are appended in result order. Every matching column gets
/// `FROM_SOURCE`, its ordinal and type flags. Running it again with the same
/// fields leaves `columns` unchanged.
pub fn resolve_result_columns(columns: &mut ColumnSet, fields: &[FieldMeta], opts: &ResolveOptions) {
    for (ordinal, field) in fields.iter().enumerate() {
        let index = columns.find_or_append(&field.name);
        let column = &mut columns[index];
        column.flags.insert(ColumnFlags::FROM_SOURCE);
        column.source_ordinal = Some(ordinal);

        if field.primary_key {
            column.flags.insert(ColumnFlags::PRIMARY_KEY);
        }
        if column.is_fixed() {
            continue;
        }

        let is_bool = opts.tiny1_as_bool
            && field.field_type == FieldType::Tiny
            && field.display_width == Some(1);
        if is_bool {
            column.flags.insert(ColumnFlags::BOOLEAN);
        } else if field.field_type.is_integer() {
            column.flags.insert(ColumnFlags::INTEGER);
        } else if field.field_type.is_decimal() {
            column.flags.insert(ColumnFlags::NUMERIC);
        } else if opts.skip_empty {
            column.flags.insert(ColumnFlags::EMPTY_IGNORED);
        }
    }
    debug!(
        "Resolved {} result field(s) into {} column(s)",
        fields.len(),
        columns.len()
    );
}

/// Registers a table's declared columns before its first query.
///
/// Appends unseen columns and marks `FROM_SOURCE` and `PRIMARY_KEY` only; type
/// flags and ordinals are left to [`resolve_result_columns`].
pub fn register_table_columns(columns: &mut ColumnSet, fields: &[FieldMeta]) {
    for field in fields {
        let index = columns.find_or_append(&field.name);
        let column = &mut columns[index];
        column.flags.insert(ColumnFlags::FROM_SOURCE);
        if field.primary_key {
            column.flags.insert(ColumnFlags::PRIMARY_KEY);
        }
    }
}
