//! Schema resolution.
//!
//! Maps result-field metadata onto the column model: which columns come from
//! the database, where they sit in a row, and how their values are typed.

mod resolve;
mod types;

pub use resolve::{register_table_columns, resolve_result_columns, ResolveOptions};
pub use types::{FieldMeta, FieldType};
