use log::debug;

use super::descriptor::{ColumnFlags, FixedValue};
use super::literal::is_integer;
use super::set::ColumnSet;
use crate::error_handling::ConfigError;
use crate::serialize::escape_json;

/// User-declared column rules, as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnRules {
    /// `--col-value name=value`
    pub fixed_values: Vec<(String, String)>,
    /// `--col-incr name=step`
    pub increments: Vec<(String, String)>,
    /// `--col-json-name name=key`
    pub json_names: Vec<(String, String)>,
    /// `--skip-col name`
    pub skip: Vec<String>,
    /// `--col-quoted name`
    pub quoted: Vec<String>,
    /// `--col-unquoted name`
    pub unquoted: Vec<String>,
    /// `--batch-col name`
    pub batch_column: Option<String>,
}

/// Builds the column list shared (by copy) across all tables of a run.
///
/// Fixed values come first, then increments are validated and attached, then
/// renames, skips, forced quoting and the batch column annotate existing
/// entries or append placeholders.
///
/// # Errors
///
/// Returns [`ConfigError::IncrementWithoutFixedValue`] when an increment names
/// a column without a fixed value, and [`ConfigError::IncrementNotInteger`]
/// when either the step or the fixed value is not an integer.
pub fn build_columns(rules: &ColumnRules) -> Result<ColumnSet, ConfigError> {
    let mut columns = ColumnSet::new();

    for (name, value) in &rules.fixed_values {
        let index = columns.find_or_append(name);
        columns[index].set_fixed(value);
    }

    for (name, step) in &rules.increments {
        let index = columns
            .position(name)
            .filter(|&i| columns[i].is_fixed())
            .ok_or_else(|| ConfigError::IncrementWithoutFixedValue(name.clone()))?;
        let step = match (is_integer(step), &columns[index].fixed) {
            (true, Some(FixedValue::Integer(_))) => step
                .parse::<i64>()
                .map_err(|_| ConfigError::IncrementNotInteger(name.clone()))?,
            _ => return Err(ConfigError::IncrementNotInteger(name.clone())),
        };
        columns[index].increment = step;
    }

    for (name, json_name) in &rules.json_names {
        let index = columns.find_or_append(name);
        columns[index].json_name = escape_json(json_name.as_bytes());
    }

    for name in &rules.skip {
        columns.annotate(name, ColumnFlags::SKIP);
    }
    for name in &rules.quoted {
        columns.annotate(name, ColumnFlags::QUOTED);
    }
    for name in &rules.unquoted {
        columns.annotate(name, ColumnFlags::UNQUOTED);
    }
    if let Some(name) = &rules.batch_column {
        columns.annotate(name, ColumnFlags::BATCH);
    }

    debug!("Configured {} column rule(s)", columns.len());
    Ok(columns)
}
