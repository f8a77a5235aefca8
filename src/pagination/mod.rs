//! Keyset pagination planning.
//!
//! Large tables are read in batches ordered by a batching column: each batch
//! selects rows whose batching value is greater than the last one written, up
//! to the effective row limit.

mod limit;
mod planner;
mod template;

pub use limit::{effective_limit, BatchLimit, RowBudget};
pub use planner::select_batch_column;
pub use template::{
    build_table_template, cursor_literal, materialize, quote_identifier, quote_literal, BatchCursor,
    NO_CACHE_HINT,
};
