//! Column model.
//!
//! A [`ColumnSet`] is the ordered list of output columns of one table. It
//! starts from the user's column rules ([`build_columns`]) and is completed by
//! the schema resolver once the table's fields are known.

mod descriptor;
mod literal;
mod rules;
mod set;

pub use descriptor::{ColumnDescriptor, ColumnFlags, FixedValue};
pub use literal::{is_integer, is_numeric};
pub use rules::{build_columns, ColumnRules};
pub use set::ColumnSet;
