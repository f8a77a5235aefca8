//! Row to JSON serialization.
//!
//! Rows are rendered into a `String` by [`serialize_row`] and handed to a
//! [`JsonWriter`], which owns the framing of the output file. Values are
//! escaped byte by byte, so text in any encoding and binary data survive.

mod escape;
mod row;
mod writer;

pub use escape::{escape_json, escape_json_into};
pub use row::{serialize_row, SerializeOptions, SourceRow};
pub use writer::{JsonWriter, OutputFormat};
