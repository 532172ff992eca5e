//! Diagnostic table storage
//!
//! Rows are samples and never change after the table is created. Columns are
//! keyed by a typed `(kind, iteration)` pair and are written exactly once.

mod column;
mod table;

pub(crate) use column::labels_from_values;
pub use column::{Column, ColumnKey, ColumnKind};
pub use table::IterationStore;
