use log::{debug, info};

use crate::columns::{ColumnFlags, ColumnSet};
use crate::error_handling::ConfigError;

/// Chooses the keyset pagination column of a table.
///
/// A named batch column that resolved to a source column wins. Otherwise, with
/// `auto_batch`, a single primary key column is chosen and anything else
/// disables pagination (`Ok(None)`). Without `auto_batch`, failing to find a
/// column is an error.
///
/// On return at most one column carries [`ColumnFlags::BATCH`].
///
/// # Errors
///
/// - [`ConfigError::BatchColumnNotFound`] when `named` is not a source column
/// - [`ConfigError::NoPrimaryKey`] / [`ConfigError::MultiplePrimaryKeys`] when
///   no column was named and the primary key does not identify one
pub fn select_batch_column(
    columns: &mut ColumnSet,
    table: &str,
    named: Option<&str>,
    auto_batch: bool,
) -> Result<Option<usize>, ConfigError> {
    if let Some(index) = columns.batch_index() {
        clear_batch_flags(columns, Some(index));
        return Ok(Some(index));
    }

    if let Some(name) = named {
        if !auto_batch {
            return Err(ConfigError::BatchColumnNotFound {
                column: name.to_string(),
                table: table.to_string(),
            });
        }
        info!("Batch column {} not found in {}, trying the primary key", name, table);
    }

    let keys: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.flags.contains(ColumnFlags::PRIMARY_KEY))
        .map(|(i, _)| i)
        .collect();

    match keys.as_slice() {
        [index] => {
            let index = *index;
            clear_batch_flags(columns, Some(index));
            columns[index].flags.insert(ColumnFlags::BATCH);
            debug!("Using primary key {} as batch column of {}", columns[index].name, table);
            Ok(Some(index))
        }
        [] if !auto_batch => Err(ConfigError::NoPrimaryKey(table.to_string())),
        [] => {
            clear_batch_flags(columns, None);
            info!("No primary key in {}, exporting without batches", table);
            Ok(None)
        }
        _ if !auto_batch => Err(ConfigError::MultiplePrimaryKeys(table.to_string())),
        _ => {
            clear_batch_flags(columns, None);
            info!("Composite primary key in {}, exporting without batches", table);
            Ok(None)
        }
    }
}

fn clear_batch_flags(columns: &mut ColumnSet, keep: Option<usize>) {
    for (i, column) in columns.iter_mut().enumerate() {
        if Some(i) != keep {
            column.flags.remove(ColumnFlags::BATCH);
        }
    }
}
